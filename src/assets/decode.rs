use std::path::Path;

use anyhow::Context;

use crate::{StatwheelResult, assets::portrait::Portrait};

/// Decode an encoded image (PNG, JPEG, ...) into a premultiplied portrait.
pub fn decode_portrait(bytes: &[u8]) -> StatwheelResult<Portrait> {
    let dyn_img = image::load_from_memory(bytes).context("decode portrait from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Portrait::from_premul_rgba8(width, height, rgba8_premul)
}

pub fn load_portrait(path: &Path) -> StatwheelResult<Portrait> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read portrait '{}'", path.display()))?;
    decode_portrait(&bytes)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Inverse of [`premultiply_rgba8_in_place`], rounding to nearest.
pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[0..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
