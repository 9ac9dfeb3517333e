//! Drawing surface: an RGBA pixel canvas sized to the viewport
//!
//! The surface is owned by the renderer session and only written by the
//! compositor (`clear` + `draw_image`). Pixels outside the canvas are clipped.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Viewport size in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Parse "WIDTHxHEIGHT" (e.g. "1920x1080")
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.trim().split_once(['x', 'X'])?;
        Some(Self::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
    }
}

impl std::fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Transparent black, what `clear` resets pixels to
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// RGBA canvas
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            pixels: RgbaImage::new(size.width, size.height),
        }
    }

    pub fn size(&self) -> ViewportSize {
        ViewportSize::new(self.pixels.width(), self.pixels.height())
    }

    /// Reallocate to `size`. Contents are discarded (cleared).
    pub fn resize(&mut self, size: ViewportSize) {
        if size != self.size() {
            self.pixels = RgbaImage::new(size.width, size.height);
        } else {
            self.clear();
        }
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = CLEAR;
        }
    }

    /// Draw the whole `src` scaled to `width` x `height` with its top-left corner
    /// at `(x, y)`. Offsets may be negative; overflow is cropped.
    ///
    /// Only the source region that lands on the surface is resampled, so the
    /// work is bounded by the surface size whatever the scale.
    pub fn draw_image(&mut self, src: &RgbaImage, x: f64, y: f64, width: f64, height: f64) {
        let (src_w, src_h) = src.dimensions();
        if src_w == 0 || src_h == 0 || !x.is_finite() || !y.is_finite() {
            return;
        }
        if !(width > 0.0 && height > 0.0) {
            return;
        }

        // Visible part of the destination rectangle
        let (surf_w, surf_h) = (self.pixels.width() as f64, self.pixels.height() as f64);
        let left = x.max(0.0);
        let top = y.max(0.0);
        let right = (x + width).min(surf_w);
        let bottom = (y + height).min(surf_h);
        if right <= left || bottom <= top {
            return;
        }
        let dst_x = left.floor();
        let dst_y = top.floor();
        let dst_w = (right.ceil() - dst_x) as u32;
        let dst_h = (bottom.ceil() - dst_y) as u32;

        // Source rows/columns behind it
        let (sx0, sx1) = source_span(left - x, right - x, src_w, width);
        let (sy0, sy1) = source_span(top - y, bottom - y, src_h, height);
        let region = imageops::crop_imm(src, sx0, sy0, sx1 - sx0, sy1 - sy0).to_image();

        let scaled = if region.dimensions() == (dst_w, dst_h) {
            region
        } else {
            imageops::resize(&region, dst_w, dst_h, FilterType::Triangle)
        };
        imageops::replace(&mut self.pixels, &scaled, dst_x as i64, dst_y as i64);
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Write surface to an image file (format from extension)
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        self.pixels.save(path)?;
        Ok(())
    }
}

/// Source pixel span `[start, end)` covering destination offsets `from..to`
/// of an image `src_len` pixels long drawn `dst_len` long. Never empty.
fn source_span(from: f64, to: f64, src_len: u32, dst_len: f64) -> (u32, u32) {
    let scale = src_len as f64 / dst_len;
    let last = src_len as f64;
    let start = (from * scale).floor().clamp(0.0, last - 1.0);
    let end = (to * scale).ceil().clamp(start + 1.0, last);
    (start as u32, end as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(ViewportSize::parse("1920x1080"), Some(ViewportSize::new(1920, 1080)));
        assert_eq!(ViewportSize::parse(" 800X600 "), Some(ViewportSize::new(800, 600)));
        assert_eq!(ViewportSize::parse("800"), None);
        assert_eq!(ViewportSize::parse("axb"), None);
        assert_eq!(ViewportSize::new(10, 20).to_string(), "10x20");
    }

    #[test]
    fn test_draw_image_negative_offset_crops() {
        let mut surface = Surface::new(ViewportSize::new(4, 4));
        let src = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        surface.draw_image(&src, -2.0, -2.0, 4.0, 4.0);
        // Scaled 4x4 image shifted by -2 covers the top-left 2x2 quadrant
        assert_eq!(surface.pixels().get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(surface.pixels().get_pixel(1, 1), &Rgba([255, 0, 0, 255]));
        assert_eq!(surface.pixels().get_pixel(3, 3), &CLEAR);
    }

    #[test]
    fn test_draw_image_huge_scale_resamples_visible_part() {
        // Left column red, right column blue; drawn 1e9 px wide, so only
        // the left (red) source column is on the surface
        let mut src = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        src.put_pixel(1, 1, Rgba([0, 0, 255, 255]));
        let mut surface = Surface::new(ViewportSize::new(4, 4));
        surface.draw_image(&src, 0.0, 0.0, 1e9, 1e9);
        assert!(surface.pixels().pixels().all(|p| *p == Rgba([255, 0, 0, 255])));

        // Entirely off-surface: nothing drawn
        surface.clear();
        surface.draw_image(&src, 0.0, 10.0, 1e9, 1e9);
        assert!(surface.pixels().pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn test_source_span() {
        assert_eq!(source_span(0.0, 4.0, 2, 4.0), (0, 2));
        assert_eq!(source_span(2.0, 4.0, 2, 4.0), (1, 2));
        // Sub-pixel visible band still maps to one source pixel
        assert_eq!(source_span(0.0, 1.0, 20000, 4e8), (0, 1));
        assert_eq!(source_span(512.0, 1024.0, 16, 1024.0), (8, 16));
    }

    #[test]
    fn test_clear_and_resize() {
        let mut surface = Surface::new(ViewportSize::new(2, 2));
        let src = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        surface.draw_image(&src, 0.0, 0.0, 2.0, 2.0);
        surface.clear();
        assert!(surface.pixels().pixels().all(|p| *p == CLEAR));

        surface.resize(ViewportSize::new(5, 3));
        assert_eq!(surface.size(), ViewportSize::new(5, 3));
    }
}
