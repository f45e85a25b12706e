//! Named layout and style constants for every renderer, loadable from JSON.
//!
//! Every struct defaults to the stock chart look; a JSON file only needs the keys it overrides.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::core::{Canvas, Rect, Rgba8},
    foundation::error::{StatwheelError, StatwheelResult},
    geometry::FillMode,
    profile::{SCALE_STEPS, STAT_COUNT},
};

/// Extra font directory searched in addition to system fonts.
pub const FONT_DIR_ENV: &str = "STATWHEEL_FONT_DIR";
/// Supersampling factor applied to measured export bounds.
pub const SUPERSAMPLE_ENV: &str = "STATWHEEL_SUPERSAMPLE";

const DEFAULT_SUPERSAMPLE: f64 = 2.0;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub gauge: GaugeConfig,
    pub sunburst: SunburstConfig,
    pub export: ExportConfig,
    pub level_mode: LevelMode,
}

impl RenderConfig {
    pub fn from_json_str(s: &str) -> StatwheelResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> StatwheelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> StatwheelResult<()> {
        self.gauge.validate()?;
        self.sunburst.validate()?;
        self.export.validate()?;
        Ok(())
    }
}

/// How the `level` line of a profile is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelMode {
    /// `sum(stats) + overall * 3`, ignoring any supplied level text.
    #[default]
    Derived,
    /// The level text exactly as supplied.
    Provided,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    pub total_wedges: usize,
    /// Radii as fractions of the surface's shorter edge.
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub fill: FillMode,
    pub dividers: bool,
    pub divider_color: Rgba8,
    pub divider_width: f64,
    pub track_color: Rgba8,
    pub label_color: Rgba8,
    /// Label font size as a fraction of the shorter edge.
    pub label_size: f64,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            total_wedges: SCALE_STEPS,
            outer_radius: 0.36,
            inner_radius: 0.26,
            fill: FillMode::Fractional,
            dividers: true,
            divider_color: Rgba8::rgba(255, 255, 255, 15),
            divider_width: 1.0,
            track_color: Rgba8::rgb(0x15, 0x1a, 0x32),
            label_color: Rgba8::rgb(0xf5, 0xf5, 0xff),
            label_size: 0.07,
        }
    }
}

impl GaugeConfig {
    pub fn validate(&self) -> StatwheelResult<()> {
        if self.total_wedges != SCALE_STEPS {
            return Err(StatwheelError::validation(format!(
                "gauge.total_wedges must be {SCALE_STEPS}, got {}",
                self.total_wedges
            )));
        }
        validate_radii("gauge", self.inner_radius, self.outer_radius)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SunburstConfig {
    pub section_count: usize,
    pub ring_count: usize,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub fill: FillMode,
    /// Label radius as a fraction of the way from inner to outer radius.
    pub label_radius: f64,
    /// Hub radius as a fraction of the inner radius.
    pub hub_radius: f64,
    pub background_color: Rgba8,
    pub hub_color: Rgba8,
    pub label_color: Rgba8,
    pub label_size: f64,
}

impl Default for SunburstConfig {
    fn default() -> Self {
        Self {
            section_count: STAT_COUNT,
            ring_count: SCALE_STEPS,
            inner_radius: 0.06,
            outer_radius: 0.40,
            fill: FillMode::Whole,
            label_radius: 0.55,
            hub_radius: 0.5,
            background_color: Rgba8::rgb(0x0a, 0x0f, 0x24),
            hub_color: Rgba8::rgb(0x15, 0x1a, 0x32),
            label_color: Rgba8::rgb(0xf5, 0xf5, 0xff),
            label_size: 0.035,
        }
    }
}

impl SunburstConfig {
    pub fn validate(&self) -> StatwheelResult<()> {
        if self.section_count != STAT_COUNT {
            return Err(StatwheelError::validation(format!(
                "sunburst.section_count must be {STAT_COUNT}, one per stat, got {}",
                self.section_count
            )));
        }
        if self.ring_count != SCALE_STEPS {
            return Err(StatwheelError::validation(format!(
                "sunburst.ring_count must be {SCALE_STEPS}, got {}",
                self.ring_count
            )));
        }
        validate_radii("sunburst", self.inner_radius, self.outer_radius)
    }
}

fn validate_radii(what: &str, inner: f64, outer: f64) -> StatwheelResult<()> {
    if !(inner.is_finite() && outer.is_finite()) || inner < 0.0 || outer <= inner || outer > 0.5
    {
        return Err(StatwheelError::validation(format!(
            "{what} radii must satisfy 0 <= inner < outer <= 0.5, got inner={inner} outer={outer}"
        )));
    }
    Ok(())
}

/// Target size of the exported raster.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportSize {
    Fixed { width: u32, height: u32 },
    /// Measured on-screen bounds times a supersampling factor.
    FromBounds {
        width: f64,
        height: f64,
        #[serde(default = "default_supersample")]
        supersample: f64,
    },
}

fn default_supersample() -> f64 {
    std::env::var(SUPERSAMPLE_ENV)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(DEFAULT_SUPERSAMPLE)
}

impl Default for ExportSize {
    fn default() -> Self {
        Self::Fixed {
            width: 1200,
            height: 600,
        }
    }
}

impl ExportSize {
    /// Bounds measured on screen, supersampled by `STATWHEEL_SUPERSAMPLE` or 2.
    pub fn from_bounds(width: f64, height: f64) -> Self {
        Self::FromBounds {
            width,
            height,
            supersample: default_supersample(),
        }
    }

    pub fn resolve(self) -> StatwheelResult<Canvas> {
        match self {
            Self::Fixed { width, height } => Canvas::new(width, height),
            Self::FromBounds {
                width,
                height,
                supersample,
            } => {
                let w = width * supersample;
                let h = height * supersample;
                if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 {
                    return Err(StatwheelError::validation(format!(
                        "export bounds {width}x{height} x{supersample} do not give a usable size"
                    )));
                }
                Canvas::new(w.round() as u32, h.round() as u32)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    Flat { color: Rgba8 },
    /// Linear gradient from the top-left corner to the bottom-right corner.
    Linear { from: Rgba8, to: Rgba8 },
}

impl Default for Background {
    fn default() -> Self {
        Self::Linear {
            from: Rgba8::rgb(0x05, 0x08, 0x14),
            to: Rgba8::rgb(0x1b, 0x23, 0x40),
        }
    }
}

/// Axis-aligned box in layout units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Export layout, expressed in a `layout_width` x `layout_height` coordinate space that is scaled
/// onto the resolved export size.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub size: ExportSize,
    pub layout_width: f64,
    pub layout_height: f64,
    pub background: Background,
    pub portrait_box: LayoutBox,
    pub portrait_backdrop: Rgba8,
    pub placeholder_text: String,
    pub placeholder_color: Rgba8,
    pub placeholder_size: f64,
    /// Gap between the portrait box and the name line.
    pub text_gap: f64,
    pub name_size: f64,
    pub name_color: Rgba8,
    /// Offset from the name line to the first metadata line.
    pub info_offset: f64,
    pub info_size: f64,
    pub info_color: Rgba8,
    pub info_spacing: f64,
    pub gauge_slot: LayoutBox,
    pub sunburst_slot: LayoutBox,
    pub title: String,
    pub title_size: f64,
    pub title_color: Rgba8,
    /// Distance of the title above the chart slots.
    pub title_offset: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            size: ExportSize::default(),
            layout_width: 1200.0,
            layout_height: 600.0,
            background: Background::default(),
            portrait_box: LayoutBox::new(40.0, 40.0, 350.0, 350.0),
            portrait_backdrop: Rgba8::rgba(10, 16, 40, 230),
            placeholder_text: "No Image".to_string(),
            placeholder_color: Rgba8::rgb(0x50, 0x5a, 0x80),
            placeholder_size: 20.0,
            text_gap: 24.0,
            name_size: 32.0,
            name_color: Rgba8::rgb(0xff, 0xff, 0xff),
            info_offset: 40.0,
            info_size: 18.0,
            info_color: Rgba8::rgb(0xd2, 0xd7, 0xff),
            info_spacing: 26.0,
            gauge_slot: LayoutBox::new(460.0, 60.0, 360.0, 360.0),
            sunburst_slot: LayoutBox::new(850.0, 60.0, 360.0, 360.0),
            title: "Character Ability Chart".to_string(),
            title_size: 24.0,
            title_color: Rgba8::rgb(0xf5, 0xf5, 0xff),
            title_offset: 30.0,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> StatwheelResult<()> {
        if !(self.layout_width > 0.0 && self.layout_height > 0.0) {
            return Err(StatwheelError::validation(
                "export layout dimensions must be > 0",
            ));
        }
        for (what, b) in [
            ("portrait_box", self.portrait_box),
            ("gauge_slot", self.gauge_slot),
            ("sunburst_slot", self.sunburst_slot),
        ] {
            if !(b.width > 0.0 && b.height > 0.0) {
                return Err(StatwheelError::validation(format!(
                    "export.{what} must have a positive size"
                )));
            }
        }
        self.size.resolve().map(|_| ())
    }
}

/// Font directories to search besides system fonts: `STATWHEEL_FONT_DIR` if set.
pub fn font_dirs_from_env() -> Vec<PathBuf> {
    std::env::var_os(FONT_DIR_ENV)
        .map(|v| std::env::split_paths(&v).collect())
        .unwrap_or_default()
}
