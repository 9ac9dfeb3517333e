//! Cover-fit compositor: paints one sequence frame onto the surface.
//!
//! The frame is scaled so it fully covers the surface (aspect preserved,
//! overflow cropped) and centered horizontally. Vertically it is centered too,
//! unless the scaled frame is taller than the surface: then it is pinned at a
//! fixed top offset instead, so the top of portrait sources is never cut.

use log::trace;

use crate::entities::{Frame, Surface, ViewportSize};

/// Default top offset (device pixels) for frames taller than the surface
pub const DEFAULT_TOP_OFFSET: f64 = 50.0;

/// Destination rectangle of a scaled frame on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub ratio: f64,
}

/// Compute the cover-fit draw rectangle for a `src` sized frame on `surface`.
///
/// Returns None for degenerate (zero) sizes.
pub fn cover_fit(src: (u32, u32), surface: ViewportSize, top_offset: f64) -> Option<DrawRect> {
    let (w, h) = (src.0 as f64, src.1 as f64);
    if w <= 0.0 || h <= 0.0 || surface.is_empty() {
        return None;
    }
    let (sw, sh) = (surface.width as f64, surface.height as f64);

    let ratio = (sw / w).max(sh / h);
    let width = w * ratio;
    let height = h * ratio;

    let x = (sw - width) / 2.0;
    let mut y = (sh - height) / 2.0;
    if y < 0.0 {
        y = top_offset;
    }

    Some(DrawRect {
        x,
        y,
        width,
        height,
        ratio,
    })
}

/// Paints frames with the cover-fit rule
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    top_offset: f64,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_OFFSET)
    }
}

impl Compositor {
    pub fn new(top_offset: f64) -> Self {
        Self { top_offset }
    }

    pub fn top_offset(&self) -> f64 {
        self.top_offset
    }

    /// Draw rectangle `frame` would get on a surface of `size` (None if not loaded)
    pub fn layout(&self, frame: &Frame, size: ViewportSize) -> Option<DrawRect> {
        cover_fit(frame.dimensions()?, size, self.top_offset)
    }

    /// Clear the surface and draw `frame` over it.
    ///
    /// No-op (surface untouched) when the frame has no decoded handle.
    /// Returns true if something was painted.
    pub fn paint(&self, frame: &Frame, surface: &mut Surface) -> bool {
        let Some(img) = frame.handle() else {
            trace!("Compositor: frame {} not loaded, skipping paint", frame.index());
            return false;
        };
        let Some(rect) = cover_fit(img.dimensions(), surface.size(), self.top_offset) else {
            return false;
        };

        surface.clear();
        surface.draw_image(&img, rect.x, rect.y, rect.width, rect.height);
        trace!(
            "Compositor: painted frame {} at ({:.1}, {:.1}) {:.1}x{:.1} ratio {:.3}",
            frame.index(),
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            rect.ratio
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FrameError;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn loaded(img: RgbaImage) -> Frame {
        let frame = Frame::new(0, PathBuf::from("1.png"));
        frame.settle(Ok(img));
        frame
    }

    #[test]
    fn test_ratio_covers_surface() {
        let sizes = [1u32, 3, 16, 50, 333, 1080, 1920];
        for &w in &sizes {
            for &h in &sizes {
                for &(sw, sh) in &[(1u32, 1u32), (800, 600), (375, 812), (1920, 1080)] {
                    let rect = cover_fit((w, h), ViewportSize::new(sw, sh), 50.0).unwrap();
                    let expected = (sw as f64 / w as f64).max(sh as f64 / h as f64);
                    assert_eq!(rect.ratio, expected);
                    assert!(rect.width + 1e-9 >= sw as f64, "{}x{} on {}x{}", w, h, sw, sh);
                    assert!(rect.height + 1e-9 >= sh as f64, "{}x{} on {}x{}", w, h, sw, sh);
                    // Always centered horizontally
                    assert!((rect.x - (sw as f64 - rect.width) / 2.0).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_tall_frame_uses_top_offset() {
        // Portrait 100x400 on 800x600: ratio 8, height 3200 -> centering would be -1300
        let rect = cover_fit((100, 400), ViewportSize::new(800, 600), 50.0).unwrap();
        assert_eq!(rect.ratio, 8.0);
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 50.0);

        // Barely taller: still the constant, never the small negative value
        let rect = cover_fit((1000, 1001), ViewportSize::new(1000, 1000), 12.0).unwrap();
        assert_eq!(rect.y, 12.0);
    }

    #[test]
    fn test_wide_frame_centers_vertically_at_zero() {
        // Landscape: width overflows, height matches exactly -> y = 0
        let rect = cover_fit((400, 100), ViewportSize::new(200, 100), 50.0).unwrap();
        assert_eq!(rect.ratio, 1.0);
        assert_eq!(rect.x, -100.0);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(cover_fit((0, 10), ViewportSize::new(10, 10), 50.0).is_none());
        assert!(cover_fit((10, 10), ViewportSize::new(0, 10), 50.0).is_none());
    }

    #[test]
    fn test_paint_unloaded_frame_is_noop() {
        let compositor = Compositor::default();
        let marker = RgbaImage::from_pixel(4, 4, BLUE);
        let pending = Frame::new(0, PathBuf::from("1.png"));
        let failed = Frame::new(1, PathBuf::from("2.png"));
        failed.settle(Err(FrameError::Io("gone".into())));

        for size in [ViewportSize::new(4, 4), ViewportSize::new(0, 0), ViewportSize::new(9, 2)] {
            let mut surface = Surface::new(size);
            surface.draw_image(&marker, 0.0, 0.0, size.width as f64, size.height as f64);
            let before = surface.pixels().clone();
            assert!(!compositor.paint(&pending, &mut surface));
            assert!(!compositor.paint(&failed, &mut surface));
            assert_eq!(surface.pixels(), &before);
        }
        assert!(compositor.layout(&pending, ViewportSize::new(4, 4)).is_none());
    }

    #[test]
    fn test_paint_clears_and_draws() {
        // 2x1 frame (left red, right blue) on 4x4: ratio 4 -> 8x4 at x = -2
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, RED);
        img.put_pixel(1, 0, BLUE);
        let frame = loaded(img);

        let compositor = Compositor::default();
        let mut surface = Surface::new(ViewportSize::new(4, 4));
        assert!(compositor.paint(&frame, &mut surface));
        let rect = compositor.layout(&frame, surface.size()).unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (-2.0, 0.0, 8.0, 4.0));

        // Every surface pixel is covered (opaque); left half leans red, right half blue
        assert!(surface.pixels().pixels().all(|p| p[3] > 250));
        let left = surface.pixels().get_pixel(0, 2);
        let right = surface.pixels().get_pixel(3, 2);
        assert!(left[0] > left[2]);
        assert!(right[2] > right[0]);

        // Idempotent
        let first = surface.pixels().clone();
        assert!(compositor.paint(&frame, &mut surface));
        assert_eq!(surface.pixels(), &first);
    }

    #[test]
    fn test_paint_extreme_aspect_frame() {
        // 1x20000 frame on a 20000x1 surface: ratio 20000, scaled 20000 x 4e8
        let frame = loaded(RgbaImage::from_pixel(1, 20_000, RED));
        let size = ViewportSize::new(20_000, 1);
        let rect = cover_fit((1, 20_000), size, DEFAULT_TOP_OFFSET).unwrap();
        assert_eq!(rect.ratio, 20_000.0);
        assert_eq!(rect.height, 4e8);

        // Default offset pushes the frame below the single row: cleared, no draw
        let mut surface = Surface::new(size);
        surface.draw_image(&RgbaImage::from_pixel(1, 1, BLUE), 0.0, 0.0, 20_000.0, 1.0);
        assert!(Compositor::default().paint(&frame, &mut surface));
        assert_eq!(surface.size(), size);
        assert!(surface.pixels().pixels().all(|p| p[3] == 0));

        // Zero offset: the top of the frame covers the whole row
        assert!(Compositor::new(0.0).paint(&frame, &mut surface));
        assert!(surface.pixels().pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_paint_tall_frame_leaves_top_band_clear() {
        let frame = loaded(RgbaImage::from_pixel(1, 4, RED));
        let compositor = Compositor::new(2.0);
        let mut surface = Surface::new(ViewportSize::new(4, 4));
        surface.draw_image(&RgbaImage::from_pixel(1, 1, BLUE), 0.0, 0.0, 4.0, 4.0);

        assert!(compositor.paint(&frame, &mut surface));
        // Cleared above the offset, image from row 2 down
        assert_eq!(surface.pixels().get_pixel(0, 0)[3], 0);
        assert_eq!(surface.pixels().get_pixel(0, 1)[3], 0);
        assert_eq!(surface.pixels().get_pixel(0, 2), &RED);
        assert_eq!(surface.pixels().get_pixel(3, 3), &RED);
    }
}
