//! Page geometry
//!
//! Rectangles in PDF point-space (1/72 inch, origin top-left, y down) and
//! their pixel-space counterparts at a given render DPI.
//!
//! A single uniform factor `dpi / 72` maps points to pixels. There is no
//! rotation and no independent x/y scaling.

use serde::{Deserialize, Serialize};

/// Points per inch in PDF user space
pub const POINTS_PER_INCH: f32 = 72.0;

/// Scale factor from points to pixels at `dpi`
///
/// DPI is clamped to at least 1 so a zero never reaches the renderer.
pub fn scale_for_dpi(dpi: u32) -> f32 {
    dpi.max(1) as f32 / POINTS_PER_INCH
}

/// Axis-aligned rectangle in point-space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build a rectangle from two arbitrary corners, normalizing the order
    pub fn from_corners(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Convert to pixel-space at `dpi`
    pub fn to_pixels(&self, dpi: u32) -> PixelRect {
        let scale = scale_for_dpi(dpi);
        PixelRect {
            x0: self.x0 * scale,
            y0: self.y0 * scale,
            x1: self.x1 * scale,
            y1: self.y1 * scale,
        }
    }
}

impl From<mupdf::Rect> for Rect {
    fn from(r: mupdf::Rect) -> Self {
        Rect::from_corners(r.x0, r.y0, r.x1, r.y1)
    }
}

/// Axis-aligned rectangle in pixel-space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PixelRect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build from an origin and a size, as OCR engines report boxes
    pub fn from_origin_size(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            x0: left,
            y0: top,
            x1: left + width.max(0.0),
            y1: top + height.max(0.0),
        }
    }

    /// Convert back to point-space at `dpi`
    pub fn to_points(&self, dpi: u32) -> Rect {
        let scale = scale_for_dpi(dpi);
        Rect {
            x0: self.x0 / scale,
            y0: self.y0 / scale,
            x1: self.x1 / scale,
            y1: self.y1 / scale,
        }
    }
}

/// Convert a sequence of point-space rectangles to pixel-space
pub fn rects_to_pixels<'a, I>(rects: I, dpi: u32) -> Vec<PixelRect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    rects.into_iter().map(|r| r.to_pixels(dpi)).collect()
}

/// Size of a raster in points, given its pixel size and render DPI
pub fn pixels_to_points_size(width_px: u32, height_px: u32, dpi: u32) -> (f32, f32) {
    let scale = scale_for_dpi(dpi);
    (width_px as f32 / scale, height_px as f32 / scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_scale_for_dpi() {
        assert!(approx(scale_for_dpi(72), 1.0));
        assert!(approx(scale_for_dpi(144), 2.0));
        assert!(approx(scale_for_dpi(450), 6.25));
        // zero is treated as 1 DPI
        assert!(approx(scale_for_dpi(0), 1.0 / 72.0));
    }

    #[test]
    fn test_to_pixels_scales_every_bound() {
        let r = Rect::new(10.0, 20.0, 110.0, 70.0);
        let px = r.to_pixels(144);
        assert_eq!(px, PixelRect::new(20.0, 40.0, 220.0, 140.0));
    }

    #[test]
    fn test_pixels_back_to_points() {
        let r = Rect::new(12.5, 33.25, 301.0, 400.75);
        for dpi in [72, 96, 150, 300, 450, 600] {
            let back = r.to_pixels(dpi).to_points(dpi);
            assert!(approx(back.x0, r.x0), "dpi {dpi}");
            assert!(approx(back.y0, r.y0), "dpi {dpi}");
            assert!(approx(back.x1, r.x1), "dpi {dpi}");
            assert!(approx(back.y1, r.y1), "dpi {dpi}");
        }
    }

    #[test]
    fn test_from_corners_normalizes() {
        let r = Rect::from_corners(50.0, 80.0, 10.0, 20.0);
        assert_eq!(r, Rect::new(10.0, 20.0, 50.0, 80.0));
        assert!(r.x1 >= r.x0 && r.y1 >= r.y0);
    }

    #[test]
    fn test_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -2.0, 20.0, 8.0);
        assert_eq!(a.union(&b), Rect::new(0.0, -2.0, 20.0, 10.0));
    }

    #[test]
    fn test_pixel_size_in_points() {
        // US letter at 450 DPI
        let (w, h) = pixels_to_points_size(3825, 4950, 450);
        assert!(approx(w, 612.0));
        assert!(approx(h, 792.0));
    }

    #[test]
    fn test_rects_to_pixels_preserves_order() {
        let rects = vec![Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(2.0, 2.0, 3.0, 3.0)];
        let px = rects_to_pixels(&rects, 72);
        assert_eq!(px[0].x1, 1.0);
        assert_eq!(px[1].x0, 2.0);
    }
}
