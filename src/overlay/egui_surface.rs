//! egui painter adapter

use egui::{Color32, FontId, Painter, Pos2, Rect, Rounding, Stroke, Vec2};

use super::geometry::DisplayRect;
use super::style::rgba_u8;
use super::surface::DrawingSurface;

/// Paints onto a region of an egui layer
///
/// Overlay coordinates are relative to `frame.min`; the frame size is the
/// surface size.
pub struct EguiSurface<'a> {
    painter: &'a Painter,
    frame: Rect,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a Painter, frame: Rect) -> Self {
        Self { painter, frame }
    }

    fn to_screen(&self, rect: DisplayRect) -> Rect {
        let offset = self.frame.min.to_vec2();
        Rect::from_min_max(
            Pos2::new(rect.left, rect.top) + offset,
            Pos2::new(rect.right, rect.bottom) + offset,
        )
    }
}

pub fn to_color32(color: [f32; 4]) -> Color32 {
    let [r, g, b, a] = rgba_u8(color);
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

impl DrawingSurface for EguiSurface<'_> {
    fn width(&self) -> f32 {
        self.frame.width()
    }

    fn stroke_rect(&mut self, rect: DisplayRect, color: [f32; 4], stroke_width: f32) {
        self.painter.rect_stroke(
            self.to_screen(rect),
            Rounding::ZERO,
            Stroke::new(stroke_width, to_color32(color)),
        );
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: [f32; 4]) {
        let color = to_color32(color);
        let galley = self
            .painter
            .layout_no_wrap(text.to_string(), FontId::proportional(font_size), color);
        // Glyph positions are baselines relative to the galley top
        let baseline = galley
            .rows
            .first()
            .and_then(|row| row.glyphs.first())
            .map_or(galley.size().y, |glyph| glyph.pos.y);
        self.painter
            .galley(self.frame.min + Vec2::new(x, y - baseline), galley, color);
    }

    fn fill_rect(&mut self, rect: DisplayRect, color: [f32; 4]) {
        self.painter
            .rect_filled(self.to_screen(rect), Rounding::ZERO, to_color32(color));
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        self.painter
            .layout_no_wrap(text.to_string(), FontId::proportional(font_size), Color32::WHITE)
            .size()
            .x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_baseline_at_anchor() {
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            let frame = Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::splat(200.0));
            let mut surface = EguiSurface::new(&painter, frame);
            surface.draw_text("hello", 5.0, 50.0, 20.0, [0.0, 1.0, 0.0, 1.0]);
        });

        let text = output
            .shapes
            .iter()
            .find_map(|clipped| match &clipped.shape {
                egui::Shape::Text(text) => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        let baseline = text.pos.y + text.galley.rows[0].glyphs[0].pos.y;

        assert!((text.pos.x - 15.0).abs() < 0.001);
        assert!((baseline - 70.0).abs() < 0.001);
    }

    #[test]
    fn test_to_color32() {
        assert_eq!(to_color32([0.0, 0.0, 1.0, 1.0]), Color32::from_rgb(0, 0, 255));
        assert_eq!(to_color32([0.0, 1.0, 0.0, 1.0]), Color32::from_rgb(0, 255, 0));
    }
}
