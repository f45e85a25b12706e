//! Merging chart surfaces, portrait, and text into one raster.
//!
//! Screen composition copies already-rendered charts onto a display surface. Export composition
//! lays out a full card in the configured layout space and scales it onto the export size. Source
//! surfaces are only ever read.

use std::sync::Arc;

use crate::{
    assets::portrait::Portrait,
    config::{Background, ExportConfig, RenderConfig},
    foundation::{
        core::{Affine, Canvas, Point, Rect},
        error::StatwheelResult,
    },
    profile::CharacterProfile,
    render::{
        composite,
        gauge::GaugeRenderer,
        sunburst::SunburstRenderer,
        surface::{ImagePaint, Surface},
        text::{TextRasterizer, TextRun},
    },
};

/// Largest rect with the aspect ratio of `content` that fits `bounds`, centered in it.
pub fn fit_contain(bounds: Rect, content_width: f64, content_height: f64) -> Rect {
    let ratio = (bounds.width() / content_width).min(bounds.height() / content_height);
    let w = content_width * ratio;
    let h = content_height * ratio;
    let x = bounds.x0 + (bounds.width() - w) / 2.0;
    let y = bounds.y0 + (bounds.height() - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}

/// Copy `src` onto a fresh surface of `canvas`, stretched to fill it.
pub fn resample(src: &Surface, canvas: Canvas) -> StatwheelResult<Surface> {
    let paint = ImagePaint::from_surface(src)?;
    let mut out = Surface::new(canvas)?;
    let dst = Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height));
    out.paint(|p| p.draw_image(&paint, dst, Affine::IDENTITY))?;
    Ok(out)
}

/// Gauge in the left half, sunburst in the right half, each fitted without distortion.
#[tracing::instrument(skip(gauge, sunburst))]
pub fn compose_screen(gauge: &Surface, sunburst: &Surface, canvas: Canvas) -> StatwheelResult<Surface> {
    let gauge_paint = ImagePaint::from_surface(gauge)?;
    let sunburst_paint = ImagePaint::from_surface(sunburst)?;

    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let half = w / 2.0;
    let left = fit_contain(
        Rect::new(0.0, 0.0, half, h),
        f64::from(gauge.width()),
        f64::from(gauge.height()),
    );
    let right = fit_contain(
        Rect::new(half, 0.0, w, h),
        f64::from(sunburst.width()),
        f64::from(sunburst.height()),
    );

    let mut out = Surface::new(canvas)?;
    out.paint(|p| {
        p.draw_image(&gauge_paint, left, Affine::IDENTITY);
        p.draw_image(&sunburst_paint, right, Affine::IDENTITY);
    })?;
    Ok(out)
}

/// Builds export rasters from a profile.
#[derive(Clone, Debug)]
pub struct ExportComposer {
    config: RenderConfig,
    text: Arc<TextRasterizer>,
}

impl ExportComposer {
    pub fn new(config: RenderConfig, text: Arc<TextRasterizer>) -> Self {
        Self { config, text }
    }

    /// Compose the export card at the configured size.
    ///
    /// A missing portrait falls back to the placeholder box; it never fails composition.
    #[tracing::instrument(skip(self, profile), fields(name = %profile.name))]
    pub fn compose(&self, profile: &CharacterProfile) -> StatwheelResult<Surface> {
        let export = &self.config.export;
        let canvas = export.size.resolve()?;
        let sx = f64::from(canvas.width) / export.layout_width;
        let sy = f64::from(canvas.height) / export.layout_height;
        let layout = Affine::scale_non_uniform(sx, sy);

        let mut out = Surface::new(canvas)?;
        paint_background(&mut out, export.background)?;

        // Charts are re-rendered at their final pixel size rather than upscaled.
        let gauge = self.render_chart_slot(export.gauge_slot.rect(), sx, sy, |s| {
            GaugeRenderer::new(self.config.gauge.clone(), self.text.clone())
                .render(s, profile.overall)
                .map(|_| ())
        })?;
        let sunburst = self.render_chart_slot(export.sunburst_slot.rect(), sx, sy, |s| {
            SunburstRenderer::new(self.config.sunburst.clone(), self.text.clone())
                .render(s, &profile.stats)
                .map(|_| ())
        })?;
        let gauge_paint = ImagePaint::from_surface(&gauge)?;
        let sunburst_paint = ImagePaint::from_surface(&sunburst)?;

        let portrait_box = export.portrait_box.rect();
        let portrait_paint = match profile.portrait.as_deref() {
            Some(portrait) => Some(portrait_placement(portrait, portrait_box)?),
            None => {
                tracing::debug!("no portrait, using placeholder");
                None
            }
        };

        out.paint(|p| {
            p.fill_rect(portrait_box, export.portrait_backdrop, layout);
            if let Some((paint, rect)) = &portrait_paint {
                p.draw_image(paint, *rect, layout);
            }
            p.draw_image(&gauge_paint, export.gauge_slot.rect(), layout);
            p.draw_image(&sunburst_paint, export.sunburst_slot.rect(), layout);
        })?;

        let runs = text_block(profile, export, portrait_paint.is_none());
        self.text.draw(&mut out, &runs, layout);

        Ok(out)
    }

    fn render_chart_slot(
        &self,
        slot: Rect,
        sx: f64,
        sy: f64,
        draw: impl FnOnce(&mut Surface) -> StatwheelResult<()>,
    ) -> StatwheelResult<Surface> {
        let w = (slot.width() * sx).round().max(1.0) as u32;
        let h = (slot.height() * sy).round().max(1.0) as u32;
        let mut surface = Surface::new(Canvas::new(w, h)?)?;
        draw(&mut surface)?;
        Ok(surface)
    }
}

fn portrait_placement(portrait: &Portrait, bounds: Rect) -> StatwheelResult<(ImagePaint, Rect)> {
    let paint = ImagePaint::from_portrait(portrait)?;
    let rect = fit_contain(
        bounds,
        f64::from(portrait.width()),
        f64::from(portrait.height()),
    );
    Ok((paint, rect))
}

fn paint_background(out: &mut Surface, background: Background) -> StatwheelResult<()> {
    match background {
        Background::Flat { color } => {
            out.fill(color);
            Ok(())
        }
        Background::Linear { from, to } => {
            let (w, h) = (out.width(), out.height());
            composite::fill_linear_gradient(out.data_mut(), w, h, from, to)
        }
    }
}

/// Name, metadata lines, title, and the "No Image" label when the portrait is absent.
fn text_block(profile: &CharacterProfile, export: &ExportConfig, placeholder: bool) -> Vec<TextRun> {
    let display = profile.display();
    let pbox = export.portrait_box;
    let name_y = pbox.y + pbox.height + export.text_gap;

    let mut runs = Vec::with_capacity(8);
    if placeholder {
        runs.push(
            TextRun::new(
                export.placeholder_text.clone(),
                Point::new(pbox.x + pbox.width / 2.0, pbox.y + pbox.height / 2.0),
                export.placeholder_size,
                export.placeholder_color,
            )
            .centered(),
        );
    }
    runs.push(TextRun::new(
        display.name.clone(),
        Point::new(pbox.x, name_y),
        export.name_size,
        export.name_color,
    ));

    let mut y = name_y + export.info_offset;
    for line in display.info_lines() {
        runs.push(TextRun::new(
            line,
            Point::new(pbox.x, y),
            export.info_size,
            export.info_color,
        ));
        y += export.info_spacing;
    }

    runs.push(TextRun::new(
        export.title.clone(),
        Point::new(export.gauge_slot.x, export.gauge_slot.y - export.title_offset),
        export.title_size,
        export.title_color,
    ));
    runs
}
