use std::sync::Arc;

use crate::{
    color::sunburst_color,
    config::SunburstConfig,
    foundation::{
        core::{Affine, Canvas, Point, Rgba8},
        error::StatwheelResult,
    },
    geometry::{self, AngularSpan, FillMode, RadialBand},
    profile::{Stat, Stats},
    render::{
        surface::Surface,
        text::{TextRasterizer, TextRun},
    },
};

/// One painted ring cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellDraw {
    pub sector: usize,
    pub ring: usize,
    pub span: AngularSpan,
    pub band: RadialBand,
    pub color: Rgba8,
    pub partial: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SunburstPlan {
    pub center: Point,
    /// Background disc band, inner to outer radius.
    pub base: RadialBand,
    pub cells: Vec<CellDraw>,
    pub labels: Vec<TextRun>,
    pub hub_radius: f64,
}

impl SunburstPlan {
    /// Lay out the sunburst for `stats` on `canvas`.
    pub fn build(stats: &Stats, canvas: Canvas, cfg: &SunburstConfig) -> Self {
        let center = canvas.center();
        let edge = canvas.min_edge();
        let base = RadialBand::new(edge * cfg.inner_radius, edge * cfg.outer_radius);
        let thickness = base.thickness() / cfg.ring_count as f64;

        let mut cells = Vec::new();
        for (s, (_, value)) in stats.iter().take(cfg.section_count).enumerate() {
            let span = geometry::section_span(cfg.section_count, s);
            let whole = geometry::ring_cell_count(value, cfg.ring_count);
            cells.extend((0..whole).map(|r| CellDraw {
                sector: s,
                ring: r,
                span,
                band: geometry::ring_band(base.inner, thickness, r),
                color: sunburst_color(s, r),
                partial: false,
            }));

            if cfg.fill == FillMode::Fractional && whole < cfg.ring_count {
                let fraction = geometry::quantized_fraction(value);
                if fraction > 0.0 {
                    let band = geometry::ring_band(base.inner, thickness, whole);
                    cells.push(CellDraw {
                        sector: s,
                        ring: whole,
                        span,
                        band: RadialBand::new(band.inner, band.inner + thickness * fraction),
                        color: sunburst_color(s, whole),
                        partial: true,
                    });
                }
            }
        }

        let label_radius = base.lerp(cfg.label_radius);
        let labels = Stat::ALL
            .iter()
            .take(cfg.section_count)
            .enumerate()
            .map(|(s, stat)| {
                let angle = geometry::section_span(cfg.section_count, s).mid();
                TextRun::new(
                    stat.label(),
                    geometry::polar_point(center, label_radius, angle),
                    edge * cfg.label_size,
                    cfg.label_color,
                )
                .centered()
            })
            .collect();

        Self {
            center,
            base,
            cells,
            labels,
            hub_radius: base.inner * cfg.hub_radius,
        }
    }

    /// Whole ring cells painted in `sector`.
    pub fn cells_in_sector(&self, sector: usize) -> usize {
        self.cells
            .iter()
            .filter(|c| c.sector == sector && !c.partial)
            .count()
    }
}

/// Draws the seven-attribute sunburst.
#[derive(Clone, Debug)]
pub struct SunburstRenderer {
    config: SunburstConfig,
    text: Arc<TextRasterizer>,
}

impl SunburstRenderer {
    pub fn new(config: SunburstConfig, text: Arc<TextRasterizer>) -> Self {
        Self { config, text }
    }

    #[tracing::instrument(skip(self, surface, stats), fields(width = surface.width(), height = surface.height()))]
    pub fn render(&self, surface: &mut Surface, stats: &Stats) -> StatwheelResult<SunburstPlan> {
        let plan = SunburstPlan::build(stats, surface.canvas(), &self.config);
        tracing::debug!(cells = plan.cells.len(), "sunburst plan");

        surface.clear();
        let cfg = &self.config;
        surface.paint(|p| {
            p.fill_path(
                &geometry::annulus(plan.center, plan.base),
                cfg.background_color,
            );
            for cell in &plan.cells {
                p.fill_path(
                    &geometry::annular_sector(plan.center, cell.band, cell.span),
                    cell.color,
                );
            }
        })?;

        self.text.draw(surface, &plan.labels, Affine::IDENTITY);
        // Hub goes on top of everything, labels included.
        surface.paint(|p| {
            p.fill_path(&geometry::disc(plan.center, plan.hub_radius), cfg.hub_color);
        })?;
        Ok(plan)
    }
}
