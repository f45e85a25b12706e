//! Deterministic color mapping for the gauge and sunburst.

use crate::foundation::core::Rgba8;

/// Hue of every gauge wedge, in degrees.
pub const GAUGE_HUE: f64 = 220.0;
/// Saturation of every gauge wedge, in percent.
pub const GAUGE_SATURATION: f64 = 15.0;
/// Lightness of wedge 0, in percent.
pub const GAUGE_LIGHTNESS_START: f64 = 78.0;
/// Lightness lost per wedge index, in percentage points.
pub const GAUGE_LIGHTNESS_STEP: f64 = 4.0;

/// Base hue per sunburst sector, in attribute order: red, orange, yellow, green, blue, indigo, purple.
pub const SECTOR_HUES: [f64; 7] = [0.0, 30.0, 55.0, 130.0, 210.0, 255.0, 280.0];

const RING_SATURATION_START: f64 = 40.0;
const RING_SATURATION_STEP: f64 = 5.0;
const RING_LIGHTNESS_START: f64 = 70.0;
const RING_LIGHTNESS_STEP: f64 = 4.0;

/// HSL color with hue in degrees and saturation/lightness in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    pub fn to_rgba8(self) -> Rgba8 {
        hsl_to_rgba8(self)
    }
}

/// Gauge wedge color: fixed hue, darkening linearly with index.
pub fn gauge_color(wedge_index: usize) -> Rgba8 {
    let lightness = GAUGE_LIGHTNESS_START - GAUGE_LIGHTNESS_STEP * wedge_index as f64;
    Hsl::new(GAUGE_HUE, GAUGE_SATURATION, lightness).to_rgba8()
}

/// Hue of a sunburst sector. Indices wrap around the palette.
pub fn sector_hue(sector_index: usize) -> f64 {
    SECTOR_HUES[sector_index % SECTOR_HUES.len()]
}

/// Sunburst cell color: sector hue, outer rings more saturated and darker.
pub fn sunburst_color(sector_index: usize, ring_index: usize) -> Rgba8 {
    let r = ring_index as f64;
    Hsl::new(
        sector_hue(sector_index),
        RING_SATURATION_START + RING_SATURATION_STEP * r,
        RING_LIGHTNESS_START - RING_LIGHTNESS_STEP * r,
    )
    .to_rgba8()
}

/// Standard HSL to sRGB conversion, rounded to 8 bits per channel.
pub fn hsl_to_rgba8(hsl: Hsl) -> Rgba8 {
    let h = (hsl.h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = (hsl.s / 100.0).clamp(0.0, 1.0);
    let l = (hsl.l / 100.0).clamp(0.0, 1.0);

    fn to_u8(x: f64) -> u8 {
        (x.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    if s == 0.0 {
        let v = to_u8(l);
        return Rgba8::rgb(v, v, v);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    Rgba8::rgb(
        to_u8(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_rgb(p, q, h)),
        to_u8(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luma(c: Rgba8) -> u32 {
        u32::from(c.r) + u32::from(c.g) + u32::from(c.b)
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl_to_rgba8(Hsl::new(0.0, 100.0, 50.0)), Rgba8::rgb(255, 0, 0));
        assert_eq!(hsl_to_rgba8(Hsl::new(120.0, 100.0, 50.0)), Rgba8::rgb(0, 255, 0));
        assert_eq!(hsl_to_rgba8(Hsl::new(240.0, 100.0, 50.0)), Rgba8::rgb(0, 0, 255));
        assert_eq!(hsl_to_rgba8(Hsl::new(0.0, 0.0, 100.0)), Rgba8::rgb(255, 255, 255));
        assert_eq!(
            hsl_to_rgba8(Hsl::new(-120.0, 100.0, 50.0)),
            hsl_to_rgba8(Hsl::new(240.0, 100.0, 50.0))
        );
    }

    #[test]
    fn colors_are_referentially_transparent() {
        for i in 0..10 {
            assert_eq!(gauge_color(i), gauge_color(i));
        }
        for s in 0..7 {
            for r in 0..10 {
                assert_eq!(sunburst_color(s, r), sunburst_color(s, r));
            }
        }
    }

    #[test]
    fn gauge_darkens_monotonically() {
        for i in 1..10 {
            assert!(luma(gauge_color(i)) < luma(gauge_color(i - 1)), "wedge {i}");
        }
    }

    #[test]
    fn sector_hues_are_distinct() {
        for a in 0..SECTOR_HUES.len() {
            for b in (a + 1)..SECTOR_HUES.len() {
                assert_ne!(sector_hue(a), sector_hue(b));
                assert_ne!(sunburst_color(a, 0), sunburst_color(b, 0));
            }
        }
    }

    #[test]
    fn outer_rings_are_darker() {
        for s in 0..7 {
            for r in 1..10 {
                assert!(luma(sunburst_color(s, r)) < luma(sunburst_color(s, r - 1)));
            }
        }
    }
}
