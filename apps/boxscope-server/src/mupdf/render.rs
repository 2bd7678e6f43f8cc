//! Page rasterization

use std::io::Cursor;
use std::sync::Arc;

use mupdf::{Colorspace, Matrix, Page, Pixmap};

use crate::engine::{EngineError, PageImage};
use crate::geometry::scale_for_dpi;

/// Rasterize a page at `dpi` and encode it as PNG
pub fn render_page(page: &Page, dpi: u32) -> Result<PageImage, EngineError> {
    let scale = scale_for_dpi(dpi);
    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();
    let pixmap = page
        .to_pixmap(&matrix, &colorspace, false, true)
        .map_err(|e| EngineError::Render(e.to_string()))?;

    let width_px = pixmap.width() as u32;
    let height_px = pixmap.height() as u32;
    let rgb = pixmap_to_rgb(&pixmap)?;
    let png = encode_png(rgb, width_px, height_px)?;

    Ok(PageImage {
        png: Arc::new(png),
        width_px,
        height_px,
    })
}

/// Copy pixmap rows into a tightly packed RGB buffer
fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, EngineError> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(EngineError::Render(format!(
            "Unsupported pixmap format: {} channels",
            n
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err(EngineError::Render("Pixmap buffer size mismatch".to_string()));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row = &samples[y * stride..y * stride + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }
    Ok(out)
}

fn encode_png(rgb: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, EngineError> {
    let img = image::RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| EngineError::Image("Failed to create image buffer".to_string()))?;

    let mut output = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| EngineError::Image(e.to_string()))?;
    Ok(output)
}
