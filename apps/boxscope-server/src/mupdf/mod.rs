//! MuPDF-backed engine
//!
//! Wraps the MuPDF bindings behind [`crate::engine::PdfEngine`]:
//!
//! - `safe`: opens a document from borrowed bytes for a single operation
//! - `render`: rasterizes a page at a DPI and encodes it as PNG
//! - `stext`: walks a structured text page into blocks, lines, spans, words
//! - `engine`: ties the above to OCR modes
//!
//! MuPDF's `fz_context` is not thread-safe, so no MuPDF handle outlives the
//! call that opened it; every engine call opens a fresh document.

mod engine;
mod render;
mod safe;
mod stext;

pub use engine::MuPdfEngine;
pub use render::render_page;
pub use safe::SafeDocument;
pub use stext::extract_page_geometry;
