use crate::foundation::error::{StatwheelError, StatwheelResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Largest edge the CPU rasterizer accepts.
    pub const MAX_DIM: u32 = u16::MAX as u32;

    /// Create validated dimensions (both edges in `1..=MAX_DIM`).
    pub fn new(width: u32, height: u32) -> StatwheelResult<Self> {
        if width == 0 || height == 0 {
            return Err(StatwheelError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        if width > Self::MAX_DIM || height > Self::MAX_DIM {
            return Err(StatwheelError::validation(format!(
                "canvas {width}x{height} exceeds {max}x{max}",
                max = Self::MAX_DIM
            )));
        }
        Ok(Self { width, height })
    }

    /// Square canvas.
    pub fn square(size: u32) -> StatwheelResult<Self> {
        Self::new(size, size)
    }

    /// Center point in pixel space.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Shorter edge, the reference length for radial layouts.
    pub fn min_edge(self) -> f64 {
        f64::from(self.width.min(self.height))
    }

    pub fn byte_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (case-insensitive, `#` optional).
    pub fn from_hex(s: &str) -> StatwheelResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> StatwheelResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| StatwheelError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(StatwheelError::validation("hex color must be ascii"));
        }
        match s.len() {
            6 => Ok(Self::rgb(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self::rgba(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                hex_byte(&s[6..8])?,
            )),
            _ => Err(StatwheelError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    pub fn premultiplied(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Obj {
                r: u8,
                g: u8,
                b: u8,
                #[serde(default = "opaque")]
                a: u8,
            },
        }

        fn opaque() -> u8 {
            255
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::from_hex(&s).map_err(serde::de::Error::custom),
            Repr::Obj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_rejects_empty_and_oversized() {
        assert!(Canvas::new(0, 10).is_err());
        assert!(Canvas::new(10, 0).is_err());
        assert!(Canvas::new(70_000, 10).is_err());
        let c = Canvas::new(1200, 600).unwrap();
        assert_eq!(c.center(), Point::new(600.0, 300.0));
        assert_eq!(c.min_edge(), 600.0);
        assert_eq!(c.byte_len(), 1200 * 600 * 4);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgba8::from_hex("#151a32").unwrap(), Rgba8::rgb(0x15, 0x1a, 0x32));
        assert_eq!(
            Rgba8::from_hex("0A102Ee6").unwrap(),
            Rgba8::rgba(0x0a, 0x10, 0x2e, 0xe6)
        );
        assert!(Rgba8::from_hex("#12345").is_err());
        assert!(Rgba8::from_hex("#zzzzzz").is_err());
        assert_eq!(Rgba8::from_hex("#010203FF").unwrap(), Rgba8::rgb(1, 2, 3));
    }

    #[test]
    fn deserializes_hex_and_object() {
        let c: Rgba8 = serde_json::from_str("\"#ff0000\"").unwrap();
        assert_eq!(c, Rgba8::rgb(255, 0, 0));
        let c: Rgba8 = serde_json::from_str(r#"{"r":1,"g":2,"b":3}"#).unwrap();
        assert_eq!(c, Rgba8::rgb(1, 2, 3));
    }

    #[test]
    fn premultiply_rounds() {
        let p = Rgba8::rgba(100, 50, 200, 128).premultiplied();
        assert_eq!(
            p.to_array(),
            [
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128
            ]
        );
        assert_eq!(Rgba8::rgba(9, 9, 9, 0).premultiplied().to_array(), [0, 0, 0, 0]);
    }
}
