//! Detection-space to display-space coordinate mapping

use serde::{Deserialize, Serialize};

use crate::detection::{DetectionRect, Point};
use crate::error::{OverlayError, OverlayResult};

/// Resolution and orientation facts for one drawing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    /// Width of the frame fed to the recognizer
    pub detection_width: u32,
    /// Height of the frame fed to the recognizer
    pub detection_height: u32,
    /// Width of the shown preview
    pub display_width: u32,
    /// Height of the shown preview
    pub display_height: u32,
    /// Front-facing camera: reflect horizontally
    pub mirrored: bool,
}

impl ScreenGeometry {
    /// Geometry where detection and display share one resolution
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            detection_width: width,
            detection_height: height,
            display_width: width,
            display_height: height,
            mirrored: false,
        }
    }

    pub fn with_display(mut self, width: u32, height: u32) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    pub fn with_mirrored(mut self, mirrored: bool) -> Self {
        self.mirrored = mirrored;
        self
    }
}

/// Display-space rectangle, always normalized
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Scales detection coordinates onto the display
///
/// Scale factors are computed once from a [`ScreenGeometry`]; build a new
/// transform when the geometry changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    geometry: ScreenGeometry,
    scale_x: f32,
    scale_y: f32,
}

impl CoordinateTransform {
    /// Fails when the detection frame has a zero dimension
    pub fn new(geometry: ScreenGeometry) -> OverlayResult<Self> {
        if geometry.detection_width == 0 || geometry.detection_height == 0 {
            return Err(OverlayError::InvalidFrameResolution {
                width: geometry.detection_width,
                height: geometry.detection_height,
            });
        }

        Ok(Self {
            geometry,
            scale_x: geometry.display_width as f32 / geometry.detection_width as f32,
            scale_y: geometry.display_height as f32 / geometry.detection_height as f32,
        })
    }

    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    pub fn is_mirrored(&self) -> bool {
        self.geometry.mirrored
    }

    pub fn to_display_x(&self, x: f32) -> f32 {
        x * self.scale_x
    }

    pub fn to_display_y(&self, y: f32) -> f32 {
        y * self.scale_y
    }

    /// Map a corner point, reflecting across `surface_width` when mirrored
    pub fn to_display_point(&self, point: Point, mirrored: bool, surface_width: f32) -> Point {
        let x = self.to_display_x(point.x);
        Point {
            x: if mirrored { surface_width - x } else { x },
            y: self.to_display_y(point.y),
        }
    }

    /// Map a detection rect onto a surface `surface_width` pixels wide
    ///
    /// The surface width is the mirror axis, not the display width: a
    /// letterboxed surface can be wider than the preview.
    pub fn transform_rect(
        &self,
        rect: DetectionRect,
        mirrored: bool,
        surface_width: f32,
    ) -> DisplayRect {
        // Non-negative scales and the mirror swap keep a normalized rect ordered
        let rect = rect.normalized();
        let left = self.to_display_x(rect.left);
        let right = self.to_display_x(rect.right);

        let (left, right) = if mirrored {
            (surface_width - right, surface_width - left)
        } else {
            (left, right)
        };

        DisplayRect {
            left,
            top: self.to_display_y(rect.top),
            right,
            bottom: self.to_display_y(rect.bottom),
        }
    }
}
