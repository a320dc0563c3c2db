//! Drawing surface abstraction
//!
//! The renderer only needs to stroke rectangles and draw left-anchored
//! text. Fill and measurement back the optional label background.

use super::geometry::DisplayRect;

/// Target the overlay paints onto
pub trait DrawingSurface {
    /// Width of the paint target; the mirror axis for front cameras
    fn width(&self) -> f32;

    /// Stroke the outline of `rect`
    fn stroke_rect(&mut self, rect: DisplayRect, color: [f32; 4], stroke_width: f32);

    /// Draw `text` with its baseline starting at `(x, y)`
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: [f32; 4]);

    fn fill_rect(&mut self, _rect: DisplayRect, _color: [f32; 4]) {}

    /// Advance width of `text`; the default is a rough per-glyph estimate
    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.6
    }
}

/// One recorded paint primitive
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    StrokeRect {
        rect: DisplayRect,
        color: [f32; 4],
        width: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: [f32; 4],
    },
    FillRect {
        rect: DisplayRect,
        color: [f32; 4],
    },
}

impl std::fmt::Display for PaintCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaintCommand::StrokeRect { rect, width, .. } => write!(
                f,
                "stroke ({:.1}, {:.1}) - ({:.1}, {:.1}) width {:.1}",
                rect.left, rect.top, rect.right, rect.bottom, width
            ),
            PaintCommand::Text { text, x, y, size, .. } => {
                write!(f, "text {:?} at ({:.1}, {:.1}) size {:.1}", text, x, y, size)
            }
            PaintCommand::FillRect { rect, .. } => write!(
                f,
                "fill ({:.1}, {:.1}) - ({:.1}, {:.1})",
                rect.left, rect.top, rect.right, rect.bottom
            ),
        }
    }
}

/// Surface that records commands instead of painting
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f32,
    pub commands: Vec<PaintCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            commands: Vec::new(),
        }
    }
}

#[cfg(test)]
impl RecordingSurface {
    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PaintCommand::StrokeRect { .. }))
            .count()
    }

    /// Label strings in paint order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                PaintCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawingSurface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn stroke_rect(&mut self, rect: DisplayRect, color: [f32; 4], stroke_width: f32) {
        self.commands.push(PaintCommand::StrokeRect {
            rect,
            color,
            width: stroke_width,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: [f32; 4]) {
        self.commands.push(PaintCommand::Text {
            text: text.to_string(),
            x,
            y,
            size: font_size,
            color,
        });
    }

    fn fill_rect(&mut self, rect: DisplayRect, color: [f32; 4]) {
        self.commands.push(PaintCommand::FillRect { rect, color });
    }
}
