//! Offscreen image adapter
//!
//! Paints the overlay into an RGBA buffer with imageproc, for snapshots
//! of a single render pass.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use anyhow::{anyhow, Context, Result};
use image::{imageops::FilterType, DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::{debug, info};

use super::geometry::DisplayRect;
use super::style::rgba_u8;
use super::surface::DrawingSurface;

/// Image-backed drawing surface
pub struct ImageSurface {
    image: RgbaImage,
    font: Option<FontVec>,
}

impl ImageSurface {
    /// Transparent surface of the given size
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            font: None,
        }
    }

    /// Surface whose backdrop is `preview` stretched to the given size
    pub fn with_preview(preview: &DynamicImage, width: u32, height: u32) -> Self {
        Self {
            image: preview.resize_exact(width, height, FilterType::Triangle).to_rgba8(),
            font: None,
        }
    }

    /// Load a TrueType/OpenType font for labels; without one, labels are skipped
    pub fn load_font(&mut self, path: &Path) -> Result<()> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read font file: {:?}", path))?;
        let font = FontVec::try_from_vec(data)
            .map_err(|e| anyhow!("Invalid font file {:?}: {}", path, e))?;
        self.font = Some(font);
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.image
            .save(path)
            .with_context(|| format!("Failed to write overlay image: {:?}", path))?;
        info!("Overlay written to {:?}", path);
        Ok(())
    }

    /// Integer rect covering `rect`, clipped to one pixel beyond the image
    ///
    /// Edges outside the image stay outside, so clipping never draws a
    /// false border. imageproc rejects empty rects.
    fn pixel_rect(&self, rect: DisplayRect) -> Rect {
        let max_x = self.image.width() as f32 + 1.0;
        let max_y = self.image.height() as f32 + 1.0;
        let left = rect.left.floor().clamp(-1.0, max_x) as i64;
        let top = rect.top.floor().clamp(-1.0, max_y) as i64;
        let right = rect.right.ceil().clamp(-1.0, max_x) as i64;
        let bottom = rect.bottom.ceil().clamp(-1.0, max_y) as i64;
        let width = (right - left).max(1) as u32;
        let height = (bottom - top).max(1) as u32;
        Rect::at(left as i32, top as i32).of_size(width, height)
    }
}

impl DrawingSurface for ImageSurface {
    fn width(&self) -> f32 {
        self.image.width() as f32
    }

    fn stroke_rect(&mut self, rect: DisplayRect, color: [f32; 4], stroke_width: f32) {
        let color = Rgba(rgba_u8(color));
        // Thick outlines as nested one-pixel rings
        let rings = stroke_width.round().max(1.0) as i32;
        for inset in 0..rings {
            let inset = inset as f32;
            let ring = DisplayRect {
                left: rect.left + inset,
                top: rect.top + inset,
                right: (rect.right - inset).max(rect.left + inset),
                bottom: (rect.bottom - inset).max(rect.top + inset),
            };
            let ring = self.pixel_rect(ring);
            draw_hollow_rect_mut(&mut self.image, ring, color);
        }
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: [f32; 4]) {
        let Some(font) = &self.font else {
            debug!("No font loaded, skipping label {:?}", text);
            return;
        };
        let scale = PxScale::from(font_size);
        let ascent = font.as_scaled(scale).ascent();
        draw_text_mut(
            &mut self.image,
            Rgba(rgba_u8(color)),
            x.round() as i32,
            (y - ascent).round() as i32,
            scale,
            font,
            text,
        );
    }

    fn fill_rect(&mut self, rect: DisplayRect, color: [f32; 4]) {
        let rect = self.pixel_rect(rect);
        draw_filled_rect_mut(&mut self.image, rect, Rgba(rgba_u8(color)));
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        match &self.font {
            Some(font) => text_size(PxScale::from(font_size), font, text).0 as f32,
            None => text.chars().count() as f32 * font_size * 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_rect_outline() {
        let mut surface = ImageSurface::blank(20, 20);
        let rect = DisplayRect { left: 2.0, top: 2.0, right: 12.0, bottom: 12.0 };
        surface.stroke_rect(rect, [0.0, 0.0, 1.0, 1.0], 1.0);

        let image = &surface.image;
        assert_eq!(image.get_pixel(2, 2), &Rgba([0, 0, 255, 255]));
        assert_eq!(image.get_pixel(11, 5), &Rgba([0, 0, 255, 255]));
        // Interior stays untouched
        assert_eq!(image.get_pixel(6, 6), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_thick_stroke() {
        let mut surface = ImageSurface::blank(20, 20);
        let rect = DisplayRect { left: 2.0, top: 2.0, right: 12.0, bottom: 12.0 };
        surface.stroke_rect(rect, [1.0, 0.0, 0.0, 1.0], 2.0);

        assert_eq!(surface.image.get_pixel(3, 6), &Rgba([255, 0, 0, 255]));
        assert_eq!(surface.image.get_pixel(6, 6), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_empty_rect_does_not_panic() {
        let mut surface = ImageSurface::blank(10, 10);
        let rect = DisplayRect { left: 5.0, top: 5.0, right: 5.0, bottom: 5.0 };
        surface.stroke_rect(rect, [1.0, 1.0, 1.0, 1.0], 1.0);
        surface.fill_rect(rect, [1.0, 1.0, 1.0, 1.0]);

        assert_eq!(surface.image.get_pixel(5, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_text_without_font_is_skipped() {
        let mut surface = ImageSurface::blank(10, 10);
        surface.draw_text("hi", 0.0, 9.0, 8.0, [1.0, 1.0, 1.0, 1.0]);

        assert!(surface.image.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_load_missing_font() {
        let mut surface = ImageSurface::blank(10, 10);
        assert!(surface.load_font(Path::new("/nonexistent/font.ttf")).is_err());
    }

    #[test]
    fn test_preview_backdrop_is_resized() {
        let preview = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255])));
        let surface = ImageSurface::with_preview(&preview, 8, 6);

        assert_eq!(surface.width(), 8.0);
        assert_eq!(surface.image.height(), 6);
        assert_eq!(surface.image.get_pixel(3, 3), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn test_huge_rect_is_clipped() {
        let mut surface = ImageSurface::blank(100, 100);
        let rect = DisplayRect { left: -1.0e10, top: 10.0, right: 50.0, bottom: 40.0 };
        surface.stroke_rect(rect, [0.0, 0.0, 1.0, 1.0], 1.0);
        surface.fill_rect(DisplayRect { left: 90.0, top: 90.0, right: 1.0e12, bottom: 1.0e12 }, [1.0, 0.0, 0.0, 1.0]);

        // Top and right edges land on the image, the left edge stays off it
        assert_eq!(surface.image.get_pixel(20, 10), &Rgba([0, 0, 255, 255]));
        assert_eq!(surface.image.get_pixel(49, 20), &Rgba([0, 0, 255, 255]));
        assert_eq!(surface.image.get_pixel(0, 20), &Rgba([0, 0, 0, 0]));
        assert_eq!(surface.image.get_pixel(99, 99), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_huge_rect_through_renderer() {
        use crate::detection::{DetectionRect, TextBlock, TextDocument};
        use crate::overlay::{OverlayRenderer, OverlayStyle, RenderConfig, ScreenGeometry};

        let doc = TextDocument {
            text: String::new(),
            blocks: vec![TextBlock {
                bounding_box: DetectionRect::new(-1.0e10, 10.0, 50.0, 40.0),
                ..Default::default()
            }],
        };
        let config = RenderConfig {
            group_by_block: true,
            ..Default::default()
        };
        let mut renderer =
            OverlayRenderer::new(config, OverlayStyle::default(), ScreenGeometry::identity(100, 100))
                .unwrap();
        let mut surface = ImageSurface::blank(100, 100);

        assert_eq!(renderer.render(&doc, &mut surface), 1);
        assert_eq!(surface.image.get_pixel(49, 20), &Rgba([0, 0, 255, 255]));
    }
}
