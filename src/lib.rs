//! Statwheel renders a character profile as two radial charts and composites them into a
//! shareable card.
//!
//! - A gauge ring for the overall score (ten wedges, partial wedge for tenths)
//! - A sunburst for the seven attributes (one sector each, one ring cell per point)
//! - An export card with portrait, text block, and both charts, encoded as PNG
//!
//! Inputs go through [`RawProfile`] so that any form value maps to a valid chart.
#![forbid(unsafe_code)]

pub mod assets;
pub mod color;
pub mod compose;
pub mod config;
pub mod encode;
pub mod foundation;
pub mod geometry;
pub mod profile;
pub mod render;
pub mod session;

pub use crate::assets::decode::{decode_portrait, load_portrait};
pub use crate::assets::portrait::{Portrait, PortraitSlot};
pub use crate::color::{gauge_color, sunburst_color};
pub use crate::compose::{ExportComposer, compose_screen, fit_contain, resample};
pub use crate::config::{
    Background, ExportConfig, ExportSize, GaugeConfig, LevelMode, RenderConfig, SunburstConfig,
};
pub use crate::encode::png::{ExportArtifact, encode_png, suggest_filename};
pub use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{StatwheelError, StatwheelResult};
pub use crate::geometry::FillMode;
pub use crate::profile::{CharacterProfile, RawProfile, RawStats, Stat, Stats, normalize};
pub use crate::render::gauge::{GaugePlan, GaugeRenderer};
pub use crate::render::sunburst::{SunburstPlan, SunburstRenderer};
pub use crate::render::surface::Surface;
pub use crate::render::text::TextRasterizer;
pub use crate::session::{ChartSession, ModalView, Preview, RenderObserver};
