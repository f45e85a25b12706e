//! Text rasterization through `usvg`/`resvg`.
//!
//! A batch of runs becomes one SVG document the size of the target surface, rendered into a
//! transparent layer and composited over the surface.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{Affine, Point, Rgba8},
        error::{StatwheelError, StatwheelResult},
    },
    render::surface::Surface,
};

use usvg::fontdb;

const FONT_FAMILY: &str = "system-ui, sans-serif";
const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    #[default]
    Top,
    Middle,
}

/// One line of text positioned in the caller's coordinate space.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
    pub size: f64,
    pub color: Rgba8,
    pub anchor: TextAnchor,
    pub baseline: TextBaseline,
}

impl TextRun {
    pub fn new(text: impl Into<String>, origin: Point, size: f64, color: Rgba8) -> Self {
        Self {
            text: text.into(),
            origin,
            size,
            color,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Top,
        }
    }

    /// Center horizontally and vertically on `origin`.
    pub fn centered(mut self) -> Self {
        self.anchor = TextAnchor::Middle;
        self.baseline = TextBaseline::Middle;
        self
    }
}

/// Font database plus the SVG options built from it.
pub struct TextRasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl std::fmt::Debug for TextRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRasterizer")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl TextRasterizer {
    /// System fonts plus any directories named by `STATWHEEL_FONT_DIR`.
    pub fn system() -> Self {
        Self::with_font_dirs(&crate::config::font_dirs_from_env())
    }

    /// Process-wide instance of [`TextRasterizer::system`]; font discovery runs once.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<TextRasterizer>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::system())).clone()
    }

    pub fn with_font_dirs(dirs: &[PathBuf]) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for dir in dirs {
            let added = load_font_dir(&mut db, dir);
            tracing::debug!(dir = %dir.display(), added, "font directory loaded");
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// Draw `runs` onto `surface`. Failures are logged and leave the surface untouched.
    pub fn draw(&self, surface: &mut Surface, runs: &[TextRun], transform: Affine) {
        if runs.iter().all(|r| r.text.is_empty()) {
            return;
        }
        if let Err(err) = self.try_draw(surface, runs, transform) {
            tracing::warn!(%err, runs = runs.len(), "text rasterization skipped");
        }
    }

    pub fn try_draw(
        &self,
        surface: &mut Surface,
        runs: &[TextRun],
        transform: Affine,
    ) -> StatwheelResult<()> {
        let (w, h) = (surface.width(), surface.height());
        let doc = svg_document(w, h, runs, transform);

        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            font_resolver: font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&doc, &opts).context("parse text svg")?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| StatwheelError::render("failed to allocate text pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        surface.over(pixmap.data())
    }
}

fn svg_document(width: u32, height: u32, runs: &[TextRun], transform: Affine) -> String {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    let mut doc = String::with_capacity(256 + runs.len() * 160);
    let _ = write!(
        doc,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = write!(doc, r#"<g transform="matrix({a} {b} {c} {d} {e} {f})">"#);
    for run in runs.iter().filter(|r| !r.text.is_empty()) {
        let anchor = match run.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
        };
        let baseline = match run.baseline {
            TextBaseline::Top => "text-before-edge",
            TextBaseline::Middle => "central",
        };
        let Rgba8 { r, g, b, a } = run.color;
        let _ = write!(
            doc,
            r#"<text x="{x}" y="{y}" font-family="{FONT_FAMILY}" font-size="{size}" fill="rgb({r},{g},{b})" fill-opacity="{opacity}" text-anchor="{anchor}" dominant-baseline="{baseline}" xml:space="preserve">{text}</text>"#,
            x = run.origin.x,
            y = run.origin.y,
            size = run.size,
            opacity = f64::from(a) / 255.0,
            text = escape_xml(&run.text),
        );
    }
    doc.push_str("</g></svg>");
    doc
}

/// Escape the five XML special characters and drop control characters XML 1.0 forbids.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn is_font_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| FONT_EXTENSIONS.iter().any(|f| ext.eq_ignore_ascii_case(f)))
}

/// Load every font file directly inside `dir`; returns how many faces it added.
fn load_font_dir(db: &mut fontdb::Database, dir: &Path) -> usize {
    let before = db.len();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "font directory unreadable");
            return 0;
        }
    };
    for path in entries.flatten().map(|e| e.path()).filter(|p| is_font_file(p)) {
        if let Err(err) = db.load_font_file(&path) {
            tracing::debug!(path = %path.display(), %err, "font file skipped");
        }
    }
    db.len().saturating_sub(before)
}

fn db_family(family: &usvg::FontFamily) -> fontdb::Family<'_> {
    match family {
        usvg::FontFamily::Named(name) => fontdb::Family::Name(name),
        usvg::FontFamily::SansSerif => fontdb::Family::SansSerif,
        usvg::FontFamily::Serif => fontdb::Family::Serif,
        usvg::FontFamily::Monospace => fontdb::Family::Monospace,
        usvg::FontFamily::Cursive => fontdb::Family::Cursive,
        usvg::FontFamily::Fantasy => fontdb::Family::Fantasy,
    }
}

fn db_style(style: usvg::FontStyle) -> fontdb::Style {
    match style {
        usvg::FontStyle::Normal => fontdb::Style::Normal,
        usvg::FontStyle::Italic => fontdb::Style::Italic,
        usvg::FontStyle::Oblique => fontdb::Style::Oblique,
    }
}

/// Requested families first, then the generic ones, then any face at all.
fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, db| {
            let families: Vec<fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(db_family)
                .chain([
                    fontdb::Family::SansSerif,
                    fontdb::Family::Serif,
                    fontdb::Family::Monospace,
                ])
                .collect();
            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: fontdb::Stretch::Normal,
                style: db_style(font.style()),
            };
            db.query(&query)
                .or_else(|| db.faces().next().map(|face| face.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}
