//! Event-facing entry points: the surrounding UI reports input changes and button presses,
//! the session rebuilds the profile and renders. Rendering itself stays a pure function of the
//! profile and configuration.

use std::sync::Arc;

use crate::{
    assets::portrait::{Portrait, PortraitSlot},
    compose::{self, ExportComposer},
    config::RenderConfig,
    encode::png::{ExportArtifact, encode_png, suggest_filename},
    foundation::{core::Canvas, error::StatwheelResult},
    profile::{CharacterProfile, DisplayText, RawProfile},
    render::{
        gauge::{GaugePlan, GaugeRenderer},
        sunburst::{SunburstPlan, SunburstRenderer},
        surface::Surface,
        text::TextRasterizer,
    },
};

/// Inline chart pair rendered for the current inputs.
#[derive(Debug)]
pub struct Preview {
    pub profile: CharacterProfile,
    pub gauge: Surface,
    pub gauge_plan: GaugePlan,
    pub sunburst: Surface,
    pub sunburst_plan: SunburstPlan,
}

/// Enlarged view: resampled chart copies plus the text the UI shows beside them.
#[derive(Debug)]
pub struct ModalView {
    pub gauge: Surface,
    pub sunburst: Surface,
    pub display: DisplayText,
    pub summary: String,
    pub portrait: Option<Arc<Portrait>>,
}

/// Receives every preview the session renders.
pub trait RenderObserver {
    fn on_preview(&mut self, preview: &Preview);
}

impl<F: FnMut(&Preview)> RenderObserver for F {
    fn on_preview(&mut self, preview: &Preview) {
        self(preview)
    }
}

pub struct ChartSession {
    config: RenderConfig,
    preview: Canvas,
    portrait: PortraitSlot,
    gauge: GaugeRenderer,
    sunburst: SunburstRenderer,
    composer: ExportComposer,
    observers: Vec<Box<dyn RenderObserver>>,
}

impl std::fmt::Debug for ChartSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSession")
            .field("preview", &self.preview)
            .field("portrait", &self.portrait.is_present())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl ChartSession {
    /// Validate `config` and build a session rendering previews at `preview` size.
    pub fn new(
        config: RenderConfig,
        preview: Canvas,
        text: Arc<TextRasterizer>,
    ) -> StatwheelResult<Self> {
        config.validate()?;
        Ok(Self {
            gauge: GaugeRenderer::new(config.gauge.clone(), text.clone()),
            sunburst: SunburstRenderer::new(config.sunburst.clone(), text.clone()),
            composer: ExportComposer::new(config.clone(), text),
            config,
            preview,
            portrait: PortraitSlot::new(),
            observers: Vec::new(),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Handle for the upload side to install decoded portraits.
    pub fn portrait_slot(&self) -> PortraitSlot {
        self.portrait.clone()
    }

    pub fn subscribe(&mut self, observer: impl RenderObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Normalize the raw inputs and attach whatever portrait is present right now.
    pub fn profile(&self, raw: &RawProfile) -> CharacterProfile {
        CharacterProfile::from_raw(raw, self.config.level_mode).with_portrait(self.portrait.current())
    }

    /// Re-render both inline charts and notify observers.
    #[tracing::instrument(skip(self, raw))]
    pub fn on_input_changed(&mut self, raw: &RawProfile) -> StatwheelResult<Preview> {
        let preview = self.render_preview(raw)?;
        for observer in &mut self.observers {
            observer.on_preview(&preview);
        }
        Ok(preview)
    }

    /// Fresh inline charts, resampled onto the enlarged view sizes.
    #[tracing::instrument(skip(self, raw))]
    pub fn open_modal(
        &mut self,
        raw: &RawProfile,
        gauge_size: Canvas,
        sunburst_size: Canvas,
    ) -> StatwheelResult<ModalView> {
        let preview = self.on_input_changed(raw)?;
        let display = preview.profile.display();
        Ok(ModalView {
            gauge: compose::resample(&preview.gauge, gauge_size)?,
            sunburst: compose::resample(&preview.sunburst, sunburst_size)?,
            summary: display.summary_line(),
            display,
            portrait: preview.profile.portrait.clone(),
        })
    }

    /// Both inline charts side by side on one surface.
    pub fn screen(&self, raw: &RawProfile, canvas: Canvas) -> StatwheelResult<Surface> {
        let preview = self.render_preview(raw)?;
        compose::compose_screen(&preview.gauge, &preview.sunburst, canvas)
    }

    /// Compose and encode the export card. Only encoding failures surface as errors.
    #[tracing::instrument(skip(self, raw))]
    pub fn export(&self, raw: &RawProfile) -> StatwheelResult<ExportArtifact> {
        let profile = self.profile(raw);
        let surface = self.composer.compose(&profile)?;
        let bytes = encode_png(&surface)?;
        Ok(ExportArtifact {
            bytes,
            filename: suggest_filename(&profile),
            width: surface.width(),
            height: surface.height(),
        })
    }

    fn render_preview(&self, raw: &RawProfile) -> StatwheelResult<Preview> {
        let profile = self.profile(raw);
        let mut gauge = Surface::new(self.preview)?;
        let gauge_plan = self.gauge.render(&mut gauge, profile.overall)?;
        let mut sunburst = Surface::new(self.preview)?;
        let sunburst_plan = self.sunburst.render(&mut sunburst, &profile.stats)?;
        Ok(Preview {
            profile,
            gauge,
            gauge_plan,
            sunburst,
            sunburst_plan,
        })
    }
}
