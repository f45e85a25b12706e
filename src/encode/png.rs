use std::io::Cursor;

use anyhow::Context as _;

use crate::{
    foundation::error::{StatwheelError, StatwheelResult},
    profile::CharacterProfile,
    render::surface::Surface,
};

pub const FILENAME_SUFFIX: &str = "_mr_characterchart.png";
/// Used when the profile name has nothing left after stripping.
pub const DEFAULT_FILENAME: &str = "character_mr_characterchart.png";

/// Encoded export plus the name it should be saved under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Encode a surface as a straight-alpha RGBA8 PNG.
#[tracing::instrument(skip(surface), fields(width = surface.width(), height = surface.height()))]
pub fn encode_png(surface: &Surface) -> StatwheelResult<Vec<u8>> {
    let (w, h) = (surface.width(), surface.height());
    let img = image::RgbaImage::from_raw(w, h, surface.to_rgba8_straight())
        .ok_or_else(|| StatwheelError::encode("surface buffer does not match its dimensions"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")
        .map_err(|e| StatwheelError::encode(format!("{e:#}")))?;
    tracing::debug!(bytes = buf.len(), "png encoded");
    Ok(buf)
}

/// `{Name}_mr_characterchart.png` with whitespace and path-hostile characters removed.
pub fn suggest_filename(profile: &CharacterProfile) -> String {
    let compact: String = profile
        .name
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    if compact.is_empty() || compact.chars().all(|c| c == '.') {
        DEFAULT_FILENAME.to_string()
    } else {
        format!("{compact}{FILENAME_SUFFIX}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{foundation::core::Rgba8, profile::Stats};

    fn named(name: &str) -> CharacterProfile {
        CharacterProfile::new(name, 5.0, Stats::default())
    }

    #[test]
    fn filename_strips_whitespace() {
        assert_eq!(
            suggest_filename(&named("  Mira  the\tBold ")),
            "MiratheBold_mr_characterchart.png"
        );
        assert_eq!(
            suggest_filename(&named("a/b:c")),
            "abc_mr_characterchart.png"
        );
    }

    #[test]
    fn filename_falls_back_when_name_is_empty() {
        assert_eq!(suggest_filename(&named("")), DEFAULT_FILENAME);
        assert_eq!(suggest_filename(&named(" \t ")), DEFAULT_FILENAME);
        assert_eq!(suggest_filename(&named("..")), DEFAULT_FILENAME);
    }

    #[test]
    fn png_round_trips_dimensions_and_pixels() {
        let mut s = Surface::with_size(3, 2).unwrap();
        s.fill(Rgba8::rgb(12, 34, 56));
        let bytes = encode_png(&s).unwrap();
        assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [12, 34, 56, 255]);
    }
}
