//! PDF engine interface
//!
//! The rasterizer and the structured-text extractor are external
//! collaborators. Everything above this seam (store, cache, navigation,
//! figures) talks to them only through [`PdfEngine`].

#[cfg(test)]
pub(crate) mod fake;

use std::sync::Arc;

use thiserror::Error;

use crate::extraction::{OcrMode, PageGeometry};
use crate::ocr::OcrError;

/// Errors raised by the PDF/OCR collaborators
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to open PDF: {0}")]
    Open(String),

    #[error("Page {0} not found (document has {1} pages)")]
    PageNotFound(usize, usize),

    #[error("Failed to render page: {0}")]
    Render(String),

    #[error("Failed to build text page: {0}")]
    TextPage(String),

    #[error("Image encoding error: {0}")]
    Image(String),

    #[error("OCR requested but no OCR engine is available: {0}")]
    OcrUnavailable(String),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("MuPDF error: {0}")]
    MuPdf(String),
}

impl From<mupdf::Error> for EngineError {
    fn from(e: mupdf::Error) -> Self {
        EngineError::MuPdf(e.to_string())
    }
}

/// A rasterized page
#[derive(Clone)]
pub struct PageImage {
    /// PNG-encoded pixels
    pub png: Arc<Vec<u8>>,
    /// Width in pixels
    pub width_px: u32,
    /// Height in pixels
    pub height_px: u32,
}

impl std::fmt::Debug for PageImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageImage")
            .field("png_len", &self.png.len())
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .finish()
    }
}

/// Rasterization and structured-text extraction over raw PDF bytes
pub trait PdfEngine: Send + Sync {
    /// Open `bytes` and rasterize every page at `dpi`, in page order
    fn render_pages(&self, bytes: &[u8], dpi: u32) -> Result<Vec<PageImage>, EngineError>;

    /// Extract blocks, lines, spans and words for one zero-based page
    fn extract_geometry(
        &self,
        bytes: &[u8],
        page_index: usize,
        flags: u32,
        ocr_mode: OcrMode,
    ) -> Result<PageGeometry, EngineError>;
}

/// Shared engine handle
pub type SharedEngine = Arc<dyn PdfEngine>;
