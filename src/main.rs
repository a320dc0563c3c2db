//! text-overlay - Annotates recognized text regions over a camera preview
//!
//! Maps detection-space rectangles from a text recognizer onto the shown
//! preview and labels them per block or per line.

mod config;
mod detection;
mod error;
mod overlay;
mod viewer;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::AppConfig;
use crate::detection::{DetectionFrame, DetectionSlot};
use crate::overlay::image_surface::ImageSurface;
use crate::overlay::{OverlayRenderer, RecordingSurface, ScreenGeometry};
use crate::viewer::ViewerOptions;

/// text-overlay - Text recognition overlay renderer
#[derive(Parser, Debug)]
#[command(name = "text-overlay")]
#[command(about = "Draws recognized text regions and labels over a preview frame")]
struct Args {
    /// Detection result JSON file
    #[arg(short, long)]
    detections: PathBuf,

    /// Configuration file (defaults to config.toml in the config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// One label per block instead of one per line
    #[arg(long)]
    group_by_block: bool,

    /// Prefix labels with the recognized language
    #[arg(long)]
    show_language: bool,

    /// Append line confidence to labels
    #[arg(long)]
    show_confidence: bool,

    /// Frames come from a front-facing camera
    #[arg(long)]
    mirrored: bool,

    /// Display resolution as WIDTHxHEIGHT (defaults to the detection frame size)
    #[arg(long, value_parser = parse_resolution)]
    display: Option<(u32, u32)>,

    /// Preview image drawn behind the overlay
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Print the paint commands of one render pass and exit
    #[arg(long)]
    dump: bool,

    /// Render one pass into this image file and exit
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Font for labels when rendering to an image
    #[arg(long)]
    font: Option<PathBuf>,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    save_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_resolution(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", width))?;
    let height = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", height))?;
    Ok((width, height))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = config::load_or_default(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    if args.save_config {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => config::default_config_path()?,
        };
        config::save_config(&config, &path)?;
    }

    let frame = DetectionFrame::load(&args.detections)?;
    let (display_width, display_height) = args
        .display
        .unwrap_or((frame.frame_width, frame.frame_height));
    let geometry = ScreenGeometry::identity(frame.frame_width, frame.frame_height)
        .with_display(display_width, display_height)
        .with_mirrored(config.preview.mirrored);

    let renderer = OverlayRenderer::new(config.render, config.style.clone(), geometry)
        .with_context(|| format!("Cannot render detections from {:?}", args.detections))?;

    if args.dump {
        return dump(renderer, &frame, geometry);
    }

    let preview = match &config.preview.image {
        Some(path) => Some(
            image::open(path).with_context(|| format!("Failed to load preview: {:?}", path))?,
        ),
        None => None,
    };

    if let Some(output) = &args.output {
        return render_to_image(renderer, &frame, geometry, preview, args.font.as_deref(), output);
    }

    let slot = DetectionSlot::new();
    slot.publish(frame);
    let options = ViewerOptions {
        renderer,
        slot,
        detection_path: args.detections.clone(),
        reload_interval: Duration::from_millis(config.preview.reload_interval_ms.max(50)),
        preview,
    };

    // Run the viewer (blocking)
    if let Err(e) = viewer::run_viewer(options) {
        tracing::error!("Viewer error: {}", e);
    }

    info!("text-overlay shutdown complete");
    Ok(())
}

/// Command-line flags switch settings on; they never switch them off
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    config.render.group_by_block |= args.group_by_block;
    config.render.show_language_tag |= args.show_language;
    config.render.show_confidence |= args.show_confidence;
    config.preview.mirrored |= args.mirrored;
    if let Some(preview) = &args.preview {
        config.preview.image = Some(preview.clone());
    }
}

/// Run one render pass into a recording surface
fn record_pass(
    mut renderer: OverlayRenderer,
    frame: &DetectionFrame,
    geometry: ScreenGeometry,
) -> (usize, RecordingSurface) {
    let mut surface = RecordingSurface::new(geometry.display_width as f32);
    let units = renderer.render(&frame.document, &mut surface);
    (units, surface)
}

fn dump(renderer: OverlayRenderer, frame: &DetectionFrame, geometry: ScreenGeometry) -> Result<()> {
    let (units, surface) = record_pass(renderer, frame, geometry);

    println!("{} overlay units", units);
    for command in &surface.commands {
        println!("  {}", command);
    }
    Ok(())
}

fn render_to_image(
    mut renderer: OverlayRenderer,
    frame: &DetectionFrame,
    geometry: ScreenGeometry,
    preview: Option<image::DynamicImage>,
    font: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let mut surface = match &preview {
        Some(image) => ImageSurface::with_preview(image, geometry.display_width, geometry.display_height),
        None => ImageSurface::blank(geometry.display_width, geometry.display_height),
    };
    if let Some(font) = font {
        surface.load_font(font)?;
    }

    let units = renderer.render(&frame.document, &mut surface);
    info!("Rendered {} overlay units", units);
    surface.save(output)
}
