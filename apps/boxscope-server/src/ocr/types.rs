//! OCR Types
//!
//! Word and layout boxes reported by an OCR engine for a rendered page.

use serde::Serialize;

use crate::geometry::PixelRect;

/// Layout level of an OCR box, as numbered in tesseract's TSV output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrLevel {
    Page,
    Block,
    Paragraph,
    Line,
    Word,
}

impl OcrLevel {
    /// Map a TSV `level` column value
    pub fn from_tsv(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Page),
            2 => Some(Self::Block),
            3 => Some(Self::Paragraph),
            4 => Some(Self::Line),
            5 => Some(Self::Word),
            _ => None,
        }
    }
}

/// One recognized box, in pixels of the image that was recognized
#[derive(Debug, Clone, Serialize)]
pub struct OcrBox {
    pub level: OcrLevel,
    pub rect: PixelRect,
    /// Confidence (0-100); -1 for layout rows
    pub confidence: f32,
    /// Recognized text (words only)
    pub text: String,
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("Malformed OCR output at line {line}: {reason}")]
    MalformedOutput { line: usize, reason: String },

    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),
}
