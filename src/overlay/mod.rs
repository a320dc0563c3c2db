//! Overlay Presentation Layer
//!
//! Turns a detection tree into region outlines and labels on a drawing
//! surface. Rendering is synchronous on the thread that owns the surface;
//! geometry changes from other threads arrive over a channel and are
//! applied between passes.

pub mod egui_surface;
pub mod geometry;
pub mod image_surface;
pub mod label;
pub mod style;
pub mod surface;
pub mod units;

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::detection::TextDocument;
use crate::error::OverlayResult;

pub use geometry::{CoordinateTransform, DisplayRect, ScreenGeometry};
pub use label::LabelFormatter;
pub use style::OverlayStyle;
pub use surface::{DrawingSurface, RecordingSurface};
pub use units::{overlay_units, OverlayUnit};

/// What to label and at which granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// One label per block instead of one per line
    pub group_by_block: bool,
    /// Prefix labels with the recognized language
    pub show_language_tag: bool,
    /// Append the line confidence to labels
    pub show_confidence: bool,
}

impl RenderConfig {
    pub fn formatter(&self) -> LabelFormatter {
        LabelFormatter::new(self.show_language_tag, self.show_confidence)
    }
}

/// Sender side for geometry changes (resize, rotation, camera switch)
pub type GeometryUpdates = Sender<ScreenGeometry>;

/// Paints overlay units for detection trees
pub struct OverlayRenderer {
    config: RenderConfig,
    style: OverlayStyle,
    transform: CoordinateTransform,
    /// Latest requested geometry, when it was rejected
    rejected: Option<ScreenGeometry>,
    geometry_sender: Sender<ScreenGeometry>,
    geometry_receiver: Receiver<ScreenGeometry>,
}

impl OverlayRenderer {
    /// Create a renderer; rejects geometry with a zero-sized detection frame
    pub fn new(
        config: RenderConfig,
        style: OverlayStyle,
        geometry: ScreenGeometry,
    ) -> OverlayResult<Self> {
        let transform = CoordinateTransform::new(geometry)?;
        let (geometry_sender, geometry_receiver) = unbounded();
        info!(
            "Overlay renderer ready: {}x{} -> {}x{} (mirrored: {})",
            geometry.detection_width,
            geometry.detection_height,
            geometry.display_width,
            geometry.display_height,
            geometry.mirrored
        );
        Ok(Self {
            config,
            style,
            transform,
            rejected: None,
            geometry_sender,
            geometry_receiver,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn geometry(&self) -> ScreenGeometry {
        self.transform.geometry()
    }

    /// Get a sender for posting geometry changes from other threads
    pub fn geometry_updates(&self) -> GeometryUpdates {
        self.geometry_sender.clone()
    }

    /// Rebuild the transform for new geometry
    ///
    /// On error the previous transform stays in place, but render passes
    /// paint nothing until a valid geometry arrives.
    pub fn update_geometry(&mut self, geometry: ScreenGeometry) -> OverlayResult<()> {
        if geometry == self.transform.geometry() {
            self.rejected = None;
            return Ok(());
        }
        match CoordinateTransform::new(geometry) {
            Ok(transform) => {
                self.transform = transform;
                self.rejected = None;
                debug!("Geometry updated: {:?}", geometry);
                Ok(())
            }
            Err(e) => {
                self.rejected = Some(geometry);
                Err(e)
            }
        }
    }

    /// Apply the newest queued geometry change, if any
    fn apply_pending_geometry(&mut self) {
        let Some(latest) = self.geometry_receiver.try_iter().last() else {
            return;
        };
        if let Err(e) = self.update_geometry(latest) {
            warn!("Ignoring geometry update: {}", e);
        }
    }

    /// Run one render pass over `document`
    ///
    /// Returns the number of overlay units painted.
    pub fn render(&mut self, document: &TextDocument, surface: &mut dyn DrawingSurface) -> usize {
        self.apply_pending_geometry();
        if let Some(geometry) = self.rejected {
            debug!("Skipping render pass for invalid geometry {:?}", geometry);
            return 0;
        }

        // One transform snapshot for the whole pass
        let transform = self.transform;
        let mut painted = 0;
        for unit in overlay_units(document, &self.config, &self.style) {
            paint_unit(&unit, &transform, &self.style, surface);
            painted += 1;
        }
        debug!("Rendered {} overlay units", painted);
        painted
    }
}

/// Paint one overlay unit: outline, optional label background, label text
pub fn paint_unit(
    unit: &OverlayUnit,
    transform: &CoordinateTransform,
    style: &OverlayStyle,
    surface: &mut dyn DrawingSurface,
) {
    let mirrored = transform.is_mirrored();
    let rect = transform.transform_rect(unit.rect, mirrored, surface.width());
    trace!(
        "Unit {:?} at {:?} corners {:?}",
        unit.label,
        rect,
        unit.corners
            .iter()
            .map(|p| transform.to_display_point(*p, mirrored, surface.width()))
            .collect::<Vec<_>>()
    );

    surface.stroke_rect(rect, style.marker_color, style.stroke_width);

    if let Some(background) = style.label_background {
        let text_width = surface.measure_text(&unit.label, style.text_size);
        surface.fill_rect(
            DisplayRect {
                left: rect.left - style.stroke_width,
                top: rect.top - unit.label_height,
                right: rect.left + text_width + 2.0 * style.stroke_width,
                bottom: rect.top,
            },
            background,
        );
    }

    surface.draw_text(
        &unit.label,
        rect.left,
        rect.top - style.stroke_width,
        style.text_size,
        style.text_color,
    );
}
