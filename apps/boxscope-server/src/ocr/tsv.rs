//! Tesseract TSV parsing
//!
//! Tesseract's `tsv` output has one row per layout element:
//!
//! ```text
//! level page_num block_num par_num line_num word_num left top width height conf text
//! ```
//!
//! Rows are emitted in reading order, which is kept.

use super::types::{OcrBox, OcrError, OcrLevel};
use crate::extraction::PageGeometry;
use crate::geometry::PixelRect;

const COLUMNS: usize = 12;

/// Parse TSV output into boxes, skipping the header row
pub fn parse_tsv(input: &str) -> Result<Vec<OcrBox>, OcrError> {
    let mut boxes = Vec::new();

    for (idx, row) in input.lines().enumerate() {
        let line = idx + 1;
        if row.trim().is_empty() || row.starts_with("level") {
            continue;
        }

        let cols: Vec<&str> = row.splitn(COLUMNS, '\t').collect();
        if cols.len() < COLUMNS - 1 {
            return Err(OcrError::MalformedOutput {
                line,
                reason: format!("expected {} columns, found {}", COLUMNS, cols.len()),
            });
        }

        let number = |i: usize| -> Result<f32, OcrError> {
            cols[i].trim().parse::<f32>().map_err(|_| OcrError::MalformedOutput {
                line,
                reason: format!("column {} is not a number: {:?}", i + 1, cols[i]),
            })
        };

        let Some(level) = OcrLevel::from_tsv(number(0)? as u8) else {
            continue;
        };

        boxes.push(OcrBox {
            level,
            rect: PixelRect::from_origin_size(number(6)?, number(7)?, number(8)?, number(9)?),
            confidence: number(10)?,
            text: cols.get(11).map(|t| t.trim().to_string()).unwrap_or_default(),
        });
    }

    Ok(boxes)
}

/// Convert OCR boxes recognized on an image rendered at `dpi` into point-space geometry
///
/// Blocks come from block rows, lines and spans from line rows (OCR has no
/// finer run structure than a line), words from non-empty word rows.
pub fn boxes_to_geometry(boxes: &[OcrBox], dpi: u32) -> PageGeometry {
    let mut geometry = PageGeometry::default();

    for b in boxes {
        let rect = b.rect.to_points(dpi);
        match b.level {
            OcrLevel::Block => geometry.blocks.push(rect),
            OcrLevel::Line => {
                geometry.lines.push(rect);
                geometry.spans.push(rect);
            }
            OcrLevel::Word if !b.text.is_empty() => geometry.words.push(rect),
            _ => {}
        }
    }

    geometry
}
