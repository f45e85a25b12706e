use std::sync::Arc;

use crate::{
    color::gauge_color,
    config::GaugeConfig,
    foundation::{
        core::{Affine, Canvas, Point, Rgba8},
        error::StatwheelResult,
    },
    geometry::{self, AngularSpan, GaugeFill, RadialBand},
    profile::format_score,
    render::{
        surface::Surface,
        text::{TextRasterizer, TextRun},
    },
};

/// One painted wedge of the gauge ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WedgeDraw {
    pub index: usize,
    pub span: AngularSpan,
    pub color: Rgba8,
    pub partial: bool,
}

/// Everything the gauge paints for one score, resolved to pixel geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct GaugePlan {
    pub center: Point,
    pub band: RadialBand,
    pub fill: GaugeFill,
    pub wedges: Vec<WedgeDraw>,
    /// Angles of the decorative divider lines, empty when dividers are off.
    pub dividers: Vec<f64>,
    pub label: TextRun,
}

impl GaugePlan {
    /// Lay out the gauge for `score` (already in `[1, 10]`) on `canvas`.
    pub fn build(score: f64, canvas: Canvas, cfg: &GaugeConfig) -> Self {
        let center = canvas.center();
        let edge = canvas.min_edge();
        let band = RadialBand::new(edge * cfg.inner_radius, edge * cfg.outer_radius);

        let fill = geometry::gauge_fill(score, cfg.total_wedges, cfg.fill);
        let mut wedges: Vec<WedgeDraw> = (0..fill.full)
            .map(|i| WedgeDraw {
                index: i,
                span: geometry::section_span(cfg.total_wedges, i),
                color: gauge_color(i),
                partial: false,
            })
            .collect();
        if let Some(fraction) = fill.partial {
            wedges.push(WedgeDraw {
                index: fill.full,
                span: geometry::section_span(cfg.total_wedges, fill.full).truncated(fraction),
                color: gauge_color(fill.full),
                partial: true,
            });
        }

        let dividers = if cfg.dividers {
            (0..cfg.total_wedges)
                .map(|i| geometry::section_span(cfg.total_wedges, i).start)
                .collect()
        } else {
            Vec::new()
        };

        let label = TextRun::new(
            format_score(score),
            center,
            edge * cfg.label_size,
            cfg.label_color,
        )
        .centered();

        Self {
            center,
            band,
            fill,
            wedges,
            dividers,
            label,
        }
    }

    pub fn full_wedges(&self) -> usize {
        self.wedges.iter().filter(|w| !w.partial).count()
    }

    pub fn partial_wedge(&self) -> Option<&WedgeDraw> {
        self.wedges.iter().find(|w| w.partial)
    }

    /// Total angle covered by painted wedges, in radians.
    pub fn covered_angle(&self) -> f64 {
        self.wedges.iter().map(|w| w.span.sweep).sum()
    }
}

/// Draws the overall-score ring.
#[derive(Clone, Debug)]
pub struct GaugeRenderer {
    config: GaugeConfig,
    text: Arc<TextRasterizer>,
}

impl GaugeRenderer {
    pub fn new(config: GaugeConfig, text: Arc<TextRasterizer>) -> Self {
        Self { config, text }
    }

    /// Clear `surface` and draw the gauge for `score`, which the caller has already clamped.
    #[tracing::instrument(skip(self, surface), fields(width = surface.width(), height = surface.height()))]
    pub fn render(&self, surface: &mut Surface, score: f64) -> StatwheelResult<GaugePlan> {
        let plan = GaugePlan::build(score, surface.canvas(), &self.config);
        tracing::debug!(
            full = plan.fill.full,
            partial = ?plan.fill.partial,
            "gauge plan"
        );

        surface.clear();
        let cfg = &self.config;
        surface.paint(|p| {
            p.fill_path(&geometry::annulus(plan.center, plan.band), cfg.track_color);
            for &angle in &plan.dividers {
                p.fill_path(
                    &geometry::radial_line(plan.center, plan.band, angle, cfg.divider_width),
                    cfg.divider_color,
                );
            }
            for wedge in &plan.wedges {
                p.fill_path(
                    &geometry::annular_sector(plan.center, plan.band, wedge.span),
                    wedge.color,
                );
            }
        })?;

        self.text
            .draw(surface, std::slice::from_ref(&plan.label), Affine::IDENTITY);
        Ok(plan)
    }
}
