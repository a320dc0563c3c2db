//! Detection Result Model
//!
//! The hierarchical output of the upstream text recognizer:
//! document -> blocks -> lines -> elements -> symbols. The tree is
//! read-only once built and is replaced wholesale on every new frame.

pub mod slot;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{OverlayError, OverlayResult};

pub use slot::DetectionSlot;

/// Language tag the recognizer reports when it could not tell
pub const UNKNOWN_LANGUAGE: &str = "und";

/// Axis-aligned rectangle as (left, top, right, bottom)
///
/// Edge ordering is not guaranteed by the recognizer; call
/// [`DetectionRect::normalized`] before relying on `left <= right`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl DetectionRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Same rectangle with edges swapped so that `left <= right` and `top <= bottom`
    pub fn normalized(&self) -> Self {
        Self::new(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }
}

/// Corner point of a possibly rotated text quadrilateral
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Read access shared by every level of the detection tree
pub trait DetectionNode {
    fn text(&self) -> &str;
    fn bounding_rect(&self) -> DetectionRect;
    fn corner_points(&self) -> &[Point];
    fn recognized_language(&self) -> &str;

    /// Recognition confidence; blocks never carry one
    fn confidence(&self) -> Option<f32> {
        None
    }

    /// Rotation angle in degrees; blocks never carry one
    fn angle(&self) -> Option<f32> {
        None
    }
}

fn default_language() -> String {
    UNKNOWN_LANGUAGE.to_string()
}

/// Full recognition result for one analyzed frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextDocument {
    /// Concatenated text of all blocks
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

/// A paragraph-like group of lines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
    pub bounding_box: DetectionRect,
    #[serde(default)]
    pub corner_points: Vec<Point>,
    #[serde(default = "default_language")]
    pub recognized_language: String,
    #[serde(default)]
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextLine {
    #[serde(default)]
    pub text: String,
    pub bounding_box: DetectionRect,
    #[serde(default)]
    pub corner_points: Vec<Point>,
    #[serde(default = "default_language")]
    pub recognized_language: String,
    pub confidence: f32,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub elements: Vec<TextElement>,
}

/// Roughly a word
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextElement {
    #[serde(default)]
    pub text: String,
    pub bounding_box: DetectionRect,
    #[serde(default)]
    pub corner_points: Vec<Point>,
    #[serde(default = "default_language")]
    pub recognized_language: String,
    pub confidence: f32,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub symbols: Vec<TextSymbol>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextSymbol {
    #[serde(default)]
    pub text: String,
    pub bounding_box: DetectionRect,
    #[serde(default)]
    pub corner_points: Vec<Point>,
    #[serde(default = "default_language")]
    pub recognized_language: String,
    pub confidence: f32,
    #[serde(default)]
    pub angle: f32,
}

macro_rules! impl_detection_node {
    ($ty:ty) => {
        impl DetectionNode for $ty {
            fn text(&self) -> &str {
                &self.text
            }
            fn bounding_rect(&self) -> DetectionRect {
                self.bounding_box
            }
            fn corner_points(&self) -> &[Point] {
                &self.corner_points
            }
            fn recognized_language(&self) -> &str {
                &self.recognized_language
            }
        }
    };
    ($ty:ty, scored) => {
        impl DetectionNode for $ty {
            fn text(&self) -> &str {
                &self.text
            }
            fn bounding_rect(&self) -> DetectionRect {
                self.bounding_box
            }
            fn corner_points(&self) -> &[Point] {
                &self.corner_points
            }
            fn recognized_language(&self) -> &str {
                &self.recognized_language
            }
            fn confidence(&self) -> Option<f32> {
                Some(self.confidence)
            }
            fn angle(&self) -> Option<f32> {
                Some(self.angle)
            }
        }
    };
}

impl_detection_node!(TextBlock);
impl_detection_node!(TextLine, scored);
impl_detection_node!(TextElement, scored);
impl_detection_node!(TextSymbol, scored);

/// A recognition result together with the resolution of the frame it came from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionFrame {
    /// Width of the analyzed frame in pixels
    pub frame_width: u32,
    /// Height of the analyzed frame in pixels
    pub frame_height: u32,
    #[serde(flatten)]
    pub document: TextDocument,
}

impl DetectionFrame {
    /// Parse a detection frame from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        let frame: DetectionFrame =
            serde_json::from_str(json).context("Failed to parse detection JSON")?;
        debug!(
            "Parsed detection frame {}x{} with {} blocks",
            frame.frame_width,
            frame.frame_height,
            frame.document.blocks.len()
        );
        Ok(frame)
    }

    /// Fails when the frame has a zero dimension; such a frame cannot be mapped
    pub fn check_resolution(&self) -> OverlayResult<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(OverlayError::InvalidFrameResolution {
                width: self.frame_width,
                height: self.frame_height,
            });
        }
        Ok(())
    }

    /// Load a detection frame from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read detection file: {:?}", path))?;
        Self::from_json(&content)
    }
}
