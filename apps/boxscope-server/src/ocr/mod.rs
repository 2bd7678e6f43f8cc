//! OCR Module
//!
//! Provides an OCR text layer for scanned pages. The engine renders the
//! page, hands the PNG to an [`OcrProvider`], and converts the returned
//! pixel boxes back to point-space.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use boxscope_server::ocr::{OcrProvider, TesseractProvider, boxes_to_geometry};
//!
//! let provider = TesseractProvider::new("tesseract", "eng");
//! if provider.is_available() {
//!     let boxes = provider.recognize(&png_at_300_dpi, None)?;
//!     let geometry = boxes_to_geometry(&boxes, 300);
//! }
//! ```

mod provider;
mod tsv;
mod types;

pub use provider::{OcrProvider, TesseractProvider};
pub use tsv::{boxes_to_geometry, parse_tsv};
pub use types::{OcrBox, OcrError, OcrLevel};

#[cfg(test)]
pub(crate) use provider::MockProvider;
