use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "statwheel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the export card as a PNG named after the character.
    Export(ExportArgs),
    /// Render the gauge and sunburst side by side as a PNG.
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
struct Common {
    /// Input profile JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Optional render configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    common: Common,

    /// Portrait image (PNG, JPEG, ...).
    #[arg(long)]
    portrait: Option<PathBuf>,

    /// Directory the PNG is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Fixed export width (requires --height).
    #[arg(long, requires = "height", conflicts_with = "bounds")]
    width: Option<u32>,

    /// Fixed export height (requires --width).
    #[arg(long, requires = "width", conflicts_with = "bounds")]
    height: Option<u32>,

    /// Measured on-screen bounds `WxH`, supersampled (STATWHEEL_SUPERSAMPLE, default 2).
    #[arg(long, value_parser = parse_bounds)]
    bounds: Option<(f64, f64)>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    common: Common,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Edge length of each chart surface.
    #[arg(long, default_value_t = 400)]
    size: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn parse_bounds(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("bad width in '{s}'"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("bad height in '{s}'"))?;
    Ok((w, h))
}

fn read_profile_json(path: &Path) -> anyhow::Result<statwheel::RawProfile> {
    let f = File::open(path).with_context(|| format!("open profile '{}'", path.display()))?;
    let r = BufReader::new(f);
    let raw: statwheel::RawProfile =
        serde_json::from_reader(r).with_context(|| "parse profile JSON")?;
    Ok(raw)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<statwheel::RenderConfig> {
    match path {
        Some(p) => Ok(statwheel::RenderConfig::from_path(p)?),
        None => Ok(statwheel::RenderConfig::default()),
    }
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let raw = read_profile_json(&args.common.in_path)?;
    let mut config = load_config(args.common.config.as_deref())?;

    if let (Some(width), Some(height)) = (args.width, args.height) {
        config.export.size = statwheel::ExportSize::Fixed { width, height };
    } else if let Some((w, h)) = args.bounds {
        config.export.size = statwheel::ExportSize::from_bounds(w, h);
    }

    let session = statwheel::ChartSession::new(
        config,
        statwheel::Canvas::square(400)?,
        statwheel::TextRasterizer::shared(),
    )?;

    if let Some(path) = &args.portrait {
        session
            .portrait_slot()
            .replace(statwheel::load_portrait(path)?);
    }

    let artifact = session.export(&raw)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let out = args.out_dir.join(&artifact.filename);
    std::fs::write(&out, &artifact.bytes)
        .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({}x{})",
        out.display(),
        artifact.width,
        artifact.height
    );
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let raw = read_profile_json(&args.common.in_path)?;
    let config = load_config(args.common.config.as_deref())?;

    let session = statwheel::ChartSession::new(
        config,
        statwheel::Canvas::square(args.size)?,
        statwheel::TextRasterizer::shared(),
    )?;
    let screen = session.screen(&raw, statwheel::Canvas::new(args.size * 2, args.size)?)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &screen.to_rgba8_straight(),
        screen.width(),
        screen.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
