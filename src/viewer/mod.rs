//! Preview window
//!
//! Shows the preview frame with the overlay painted on top. The window
//! plays the role of the display environment: its size and the mirror
//! toggle are posted to the renderer as geometry updates.

pub mod watcher;

use egui::{Color32, ColorImage, Pos2, Rect, TextureId, TextureOptions, Vec2};
use image::DynamicImage;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::detection::{DetectionFrame, DetectionSlot};
use crate::overlay::egui_surface::EguiSurface;
use crate::overlay::{GeometryUpdates, OverlayRenderer, ScreenGeometry};

pub use watcher::DetectionWatcher;

/// Everything the viewer needs to start
pub struct ViewerOptions {
    pub renderer: OverlayRenderer,
    pub slot: DetectionSlot,
    /// Detection file to watch for new results
    pub detection_path: PathBuf,
    pub reload_interval: Duration,
    pub preview: Option<DynamicImage>,
}

/// The viewer application
pub struct ViewerApp {
    renderer: OverlayRenderer,
    geometry_updates: GeometryUpdates,
    slot: DetectionSlot,
    mirrored: bool,
    last_posted: Option<ScreenGeometry>,
    preview: Option<ColorImage>,
    preview_texture: Option<egui::TextureHandle>,
    detection_path: PathBuf,
    reload_interval: Duration,
    _watcher: Option<DetectionWatcher>,
}

impl ViewerApp {
    pub fn new(options: ViewerOptions) -> Self {
        let geometry_updates = options.renderer.geometry_updates();
        let mirrored = options.renderer.geometry().mirrored;
        let preview = options.preview.map(|image| {
            let rgba = image.to_rgba8();
            ColorImage::from_rgba_unmultiplied(
                [rgba.width() as usize, rgba.height() as usize],
                rgba.as_raw(),
            )
        });

        Self {
            renderer: options.renderer,
            geometry_updates,
            slot: options.slot,
            mirrored,
            last_posted: None,
            preview,
            preview_texture: None,
            detection_path: options.detection_path,
            reload_interval: options.reload_interval,
            _watcher: None,
        }
    }

    /// Start reloading detections in the background, repainting on change
    fn start_watcher(&mut self, ctx: egui::Context) {
        self._watcher = Some(DetectionWatcher::spawn(
            self.detection_path.clone(),
            self.reload_interval,
            self.slot.clone(),
            move || ctx.request_repaint(),
        ));
    }

    /// Create eframe options for the viewer window
    pub fn options() -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([960.0, 720.0])
                .with_min_inner_size([320.0, 240.0])
                .with_title("Text Overlay"),
            ..Default::default()
        }
    }

    fn preview_texture_id(&mut self, ctx: &egui::Context) -> Option<TextureId> {
        if self.preview_texture.is_none() {
            if let Some(image) = self.preview.take() {
                self.preview_texture =
                    Some(ctx.load_texture("preview", image, TextureOptions::LINEAR));
            }
        }
        self.preview_texture.as_ref().map(|t| t.id())
    }

    /// Tell the renderer about the current display, once per change
    fn post_geometry(&mut self, frame: &DetectionFrame, display: Rect) {
        let geometry = display_geometry(frame, display, self.mirrored);
        if self.last_posted == Some(geometry) {
            return;
        }
        if self.geometry_updates.send(geometry).is_err() {
            warn!("Renderer is gone, dropping geometry update");
        }
        self.last_posted = Some(geometry);
    }
}

/// Largest rect with the frame's aspect ratio centered in `available`
///
/// Snapped to whole pixels so the posted display size and the painted
/// surface agree.
fn fit_rect(available: Rect, width: f32, height: f32) -> Rect {
    let fitted = if width <= 0.0 || height <= 0.0 {
        available
    } else {
        let scale = (available.width() / width).min(available.height() / height);
        Rect::from_center_size(available.center(), Vec2::new(width * scale, height * scale))
    };
    Rect::from_min_size(fitted.min.round(), fitted.size().round())
}

/// Geometry for painting `frame` into the snapped `display` rect
fn display_geometry(frame: &DetectionFrame, display: Rect, mirrored: bool) -> ScreenGeometry {
    ScreenGeometry::identity(frame.frame_width, frame.frame_height)
        .with_display(display.width() as u32, display.height() as u32)
        .with_mirrored(mirrored)
}

/// Texture coordinates, flipped horizontally for front cameras
fn preview_uv(mirrored: bool) -> Rect {
    if mirrored {
        Rect::from_min_max(Pos2::new(1.0, 0.0), Pos2::new(0.0, 1.0))
    } else {
        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0))
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let latest = self.slot.latest();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.checkbox(&mut self.mirrored, "Mirror (front camera)");
                ui.separator();
                let config = self.renderer.config();
                ui.label(format!(
                    "group by block: {}  language: {}  confidence: {}",
                    config.group_by_block, config.show_language_tag, config.show_confidence
                ));
                if let Some(frame) = &latest {
                    ui.separator();
                    ui.label(format!(
                        "{} blocks @ {}x{}",
                        frame.document.blocks.len(),
                        frame.frame_width,
                        frame.frame_height
                    ));
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                let available = ui.available_rect_before_wrap();
                let Some(frame) = latest else {
                    ui.centered_and_justified(|ui| ui.label("Waiting for detections..."));
                    return;
                };

                let display = fit_rect(available, frame.frame_width as f32, frame.frame_height as f32);
                self.post_geometry(&frame, display);

                let painter = ui.painter_at(available);
                if let Some(texture_id) = self.preview_texture_id(ctx) {
                    painter.image(texture_id, display, preview_uv(self.mirrored), Color32::WHITE);
                }

                let mut surface = EguiSurface::new(&painter, display);
                self.renderer.render(&frame.document, &mut surface);
            });
    }
}

/// Run the viewer window (blocking)
pub fn run_viewer(options: ViewerOptions) -> Result<(), eframe::Error> {
    info!("Starting viewer...");
    let mut app = ViewerApp::new(options);
    eframe::run_native(
        "Text Overlay",
        ViewerApp::options(),
        Box::new(move |cc| {
            app.start_watcher(cc.egui_ctx.clone());
            Ok(Box::new(app))
        }),
    )
}
