//! Polar geometry shared by the gauge ring and the sunburst.
//!
//! Angles are radians in screen space (y grows downward), so increasing angle runs clockwise.
//! Section 0 starts at 12 o'clock (`-π/2`). Callers clamp scores and attribute values into
//! `[1, 10]` before they reach this module; nothing here clamps.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{Arc, BezPath, Point, Shape, Vec2};

/// Angle at which section 0 begins (12 o'clock).
pub const START_ANGLE: f64 = -FRAC_PI_2;

const ARC_TOLERANCE: f64 = 0.05;

/// Half-open angular interval `[start, start + sweep)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngularSpan {
    pub start: f64,
    pub sweep: f64,
}

impl AngularSpan {
    pub fn end(self) -> f64 {
        self.start + self.sweep
    }

    pub fn mid(self) -> f64 {
        self.start + self.sweep / 2.0
    }

    /// Same start, sweep scaled by `fraction`.
    pub fn truncated(self, fraction: f64) -> Self {
        Self {
            start: self.start,
            sweep: self.sweep * fraction,
        }
    }
}

/// Half-open radial interval `[inner, outer)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialBand {
    pub inner: f64,
    pub outer: f64,
}

impl RadialBand {
    pub fn new(inner: f64, outer: f64) -> Self {
        Self { inner, outer }
    }

    pub fn thickness(self) -> f64 {
        self.outer - self.inner
    }

    /// Radius at `t` of the way from inner to outer.
    pub fn lerp(self, t: f64) -> f64 {
        self.inner + self.thickness() * t
    }
}

/// Full and partial wedge counts for a gauge score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaugeFill {
    pub full: usize,
    /// Tenth-quantized remainder, `None` when no partial wedge is drawn.
    pub partial: Option<f64>,
}

impl GaugeFill {
    /// Number of wedge slots touched, counting a partial wedge as one.
    pub fn painted(self) -> usize {
        self.full + usize::from(self.partial.is_some())
    }

    /// Covered angle in units of whole wedges.
    pub fn covered_wedges(self) -> f64 {
        self.full as f64 + self.partial.unwrap_or(0.0)
    }
}

/// Whether the fractional part of a value is drawn as a partial cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Integer part only.
    #[default]
    Whole,
    /// Integer part plus one partial cell sized to the tenth-quantized remainder.
    Fractional,
}

/// Angular span of section `index` when the circle is split into `count` equal sections.
pub fn section_span(count: usize, index: usize) -> AngularSpan {
    let sweep = TAU / count as f64;
    AngularSpan {
        start: START_ANGLE + index as f64 * sweep,
        sweep,
    }
}

/// Remainder of `value` above its floor, rounded to the nearest tenth.
pub fn quantized_fraction(value: f64) -> f64 {
    let fraction = value - value.floor();
    (fraction * 10.0).round() / 10.0
}

/// Split a gauge score into full wedges plus an optional partial wedge.
///
/// A partial wedge exists only when the quantized remainder is positive, the fill mode allows it,
/// and there is still an unfilled wedge left.
pub fn gauge_fill(score: f64, total_wedges: usize, mode: FillMode) -> GaugeFill {
    let full = (score.floor().max(0.0) as usize).min(total_wedges);
    let fraction = quantized_fraction(score);
    let partial = match mode {
        FillMode::Fractional if fraction > 0.0 && full < total_wedges => Some(fraction),
        _ => None,
    };
    GaugeFill { full, partial }
}

/// Number of whole ring cells painted for an attribute value.
pub fn ring_cell_count(value: f64, ring_count: usize) -> usize {
    (value.floor().max(0.0) as usize).min(ring_count)
}

/// Radial band of ring cell `ring` when cells of `thickness` stack outward from `inner`.
pub fn ring_band(inner: f64, thickness: f64, ring: usize) -> RadialBand {
    let start = inner + ring as f64 * thickness;
    RadialBand::new(start, start + thickness)
}

/// Point at `radius` and `angle` around `center`.
pub fn polar_point(center: Point, radius: f64, angle: f64) -> Point {
    center + Vec2::from_angle(angle) * radius
}

/// Closed path of an annulus slice: outer arc clockwise, inner arc back.
pub fn annular_sector(center: Point, band: RadialBand, span: AngularSpan) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(polar_point(center, band.outer, span.start));
    append_arc(&mut path, center, band.outer, span.start, span.sweep);
    path.line_to(polar_point(center, band.inner, span.end()));
    if band.inner > 0.0 {
        append_arc(&mut path, center, band.inner, span.end(), -span.sweep);
    }
    path.close_path();
    path
}

/// Full annulus. The inner circle winds against the outer one, so a nonzero fill leaves the hole.
pub fn annulus(center: Point, band: RadialBand) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(polar_point(center, band.outer, 0.0));
    append_arc(&mut path, center, band.outer, 0.0, TAU);
    path.close_path();
    if band.inner > 0.0 {
        path.move_to(polar_point(center, band.inner, 0.0));
        append_arc(&mut path, center, band.inner, 0.0, -TAU);
        path.close_path();
    }
    path
}

/// Filled disc.
pub fn disc(center: Point, radius: f64) -> BezPath {
    annulus(center, RadialBand::new(0.0, radius))
}

/// Thin quad along a ray from `band.inner` to `band.outer` at `angle`.
pub fn radial_line(center: Point, band: RadialBand, angle: f64, width: f64) -> BezPath {
    let normal = Vec2::from_angle(angle + FRAC_PI_2) * (width / 2.0);
    let a = polar_point(center, band.inner, angle);
    let b = polar_point(center, band.outer, angle);
    let mut path = BezPath::new();
    path.move_to(a + normal);
    path.line_to(b + normal);
    path.line_to(b - normal);
    path.line_to(a - normal);
    path.close_path();
    path
}

fn append_arc(path: &mut BezPath, center: Point, radius: f64, start: f64, sweep: f64) {
    let arc = Arc::new(center, (radius, radius), start, sweep, 0.0);
    arc.append_iter(ARC_TOLERANCE).for_each(|el| path.push(el));
}

/// Bounding box of a path, for tests and debug logging.
pub fn path_bounds(path: &BezPath) -> kurbo::Rect {
    path.bounding_box()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn first_section_starts_at_twelve_oclock() {
        let s = section_span(10, 0);
        assert!((s.start + FRAC_PI_2).abs() < EPS);
        assert!((s.sweep - TAU / 10.0).abs() < EPS);

        let s7 = section_span(7, 3);
        assert!((s7.start - (-FRAC_PI_2 + 3.0 * TAU / 7.0)).abs() < EPS);
    }

    #[test]
    fn sections_tile_the_circle() {
        for count in [7usize, 10] {
            let last = section_span(count, count - 1);
            assert!((last.end() - (START_ANGLE + TAU)).abs() < 1e-9);
            for i in 1..count {
                let prev = section_span(count, i - 1);
                let cur = section_span(count, i);
                assert!((prev.end() - cur.start).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn gauge_fill_splits_score() {
        let f = gauge_fill(7.3, 10, FillMode::Fractional);
        assert_eq!(f.full, 7);
        assert!((f.partial.unwrap() - 0.3).abs() < EPS);
        assert_eq!(f.painted(), 8);

        let span = section_span(10, f.full).truncated(f.partial.unwrap());
        assert!((span.sweep.to_degrees() - 10.8).abs() < 1e-9);
    }

    #[test]
    fn gauge_fill_integer_and_max_scores_have_no_partial() {
        for score in [1.0, 4.0, 10.0] {
            let f = gauge_fill(score, 10, FillMode::Fractional);
            assert_eq!(f.full, score as usize);
            assert_eq!(f.partial, None);
        }
    }

    #[test]
    fn gauge_fill_quantizes_tiny_remainders_away() {
        let f = gauge_fill(3.04, 10, FillMode::Fractional);
        assert_eq!(f.full, 3);
        assert_eq!(f.partial, None);

        let f = gauge_fill(3.96, 10, FillMode::Fractional);
        assert_eq!(f.full, 3);
        assert_eq!(f.partial, Some(1.0));
    }

    #[test]
    fn gauge_fill_whole_mode_drops_partial() {
        let f = gauge_fill(7.3, 10, FillMode::Whole);
        assert_eq!(f, GaugeFill { full: 7, partial: None });
    }

    #[test]
    fn covered_angle_tracks_score() {
        for tenths in 10..=100u32 {
            let score = f64::from(tenths) / 10.0;
            let f = gauge_fill(score, 10, FillMode::Fractional);
            let covered = f.covered_wedges() * (TAU / 10.0);
            assert!(
                (covered - score / 10.0 * TAU).abs() < 1e-9,
                "score {score} covered {covered}"
            );
        }
    }

    #[test]
    fn ring_cells_floor_the_value() {
        assert_eq!(ring_cell_count(10.0, 10), 10);
        assert_eq!(ring_cell_count(1.0, 10), 1);
        assert_eq!(ring_cell_count(5.9, 10), 5);
    }

    #[test]
    fn ring_bands_stack_outward() {
        let b0 = ring_band(10.0, 5.0, 0);
        let b3 = ring_band(10.0, 5.0, 3);
        assert_eq!(b0, RadialBand::new(10.0, 15.0));
        assert_eq!(b3, RadialBand::new(25.0, 30.0));
        assert!((RadialBand::new(10.0, 50.0).lerp(0.55) - 32.0).abs() < EPS);
    }

    #[test]
    fn sector_path_stays_inside_its_band() {
        let center = Point::new(100.0, 100.0);
        let band = RadialBand::new(20.0, 40.0);
        let path = annular_sector(center, band, section_span(4, 0));
        let bounds = path_bounds(&path);
        // quarter from 12 to 3 o'clock sits in the top-right quadrant
        assert!(bounds.x0 >= 100.0 - 1e-6);
        assert!(bounds.y1 <= 100.0 + 1e-6);
        assert!(bounds.x1 <= 140.0 + 1e-6);
        assert!(bounds.y0 >= 60.0 - 1e-6);
    }

    #[test]
    fn polar_point_is_clockwise_in_screen_space() {
        let c = Point::ORIGIN;
        let top = polar_point(c, 1.0, START_ANGLE);
        assert!((top.x).abs() < EPS && (top.y + 1.0).abs() < EPS);
        let right = polar_point(c, 1.0, START_ANGLE + PI / 2.0);
        assert!((right.x - 1.0).abs() < EPS && right.y.abs() < EPS);
    }
}
