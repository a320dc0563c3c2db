//! Paint style for overlay annotations

use serde::{Deserialize, Serialize};

/// Immutable style shared by every overlay unit in a render pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Outline width of region rectangles
    pub stroke_width: f32,
    /// Label font size in pixels
    pub text_size: f32,
    /// Region outline color (RGBA, 0.0 - 1.0)
    pub marker_color: [f32; 4],
    /// Label text color (RGBA, 0.0 - 1.0)
    pub text_color: [f32; 4],
    /// Fill behind labels; `None` skips the fill entirely
    pub label_background: Option<[f32; 4]>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke_width: 1.0,
            text_size: 20.0,
            marker_color: [0.0, 0.0, 1.0, 1.0],
            text_color: [0.0, 1.0, 0.0, 1.0],
            label_background: None,
        }
    }
}

/// Convert a normalized RGBA color to 8-bit channels
pub fn rgba_u8(color: [f32; 4]) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = OverlayStyle::default();

        assert!((style.stroke_width - 1.0).abs() < 0.001);
        assert!((style.text_size - 20.0).abs() < 0.001);
        assert_eq!(rgba_u8(style.marker_color), [0, 0, 255, 255]);
        assert_eq!(rgba_u8(style.text_color), [0, 255, 0, 255]);
        assert!(style.label_background.is_none());
    }

    #[test]
    fn test_rgba_u8_clamps() {
        assert_eq!(rgba_u8([-1.0, 0.5, 2.0, 1.0]), [0, 128, 255, 255]);
    }
}
