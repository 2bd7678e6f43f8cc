//! Short-lived document handle
//!
//! Opens a MuPDF document over borrowed bytes for the duration of one
//! engine call. The bytes stay owned by the store's `Document`; this
//! wrapper never copies or mutates them.

use mupdf::{Document, Page};

use crate::engine::EngineError;

const PDF_MIME: &str = "application/pdf";

/// How far into the file the `%PDF` header may appear
const HEADER_SEARCH_LIMIT: usize = 1024;

/// A document opened for a single operation
pub struct SafeDocument {
    doc: Document,
    page_count: usize,
}

impl SafeDocument {
    /// Open a PDF from bytes
    ///
    /// Rejects inputs without a `%PDF` header before handing them to MuPDF,
    /// since MuPDF will otherwise try hard to repair arbitrary data.
    pub fn open(data: &[u8]) -> Result<Self, EngineError> {
        if !has_pdf_header(data) {
            return Err(EngineError::Open("missing %PDF header".to_string()));
        }

        let doc = Document::from_bytes(data, PDF_MIME)
            .map_err(|e| EngineError::Open(e.to_string()))?;
        let page_count = doc
            .page_count()
            .map_err(|e| EngineError::Open(e.to_string()))?;

        Ok(Self {
            doc,
            page_count: page_count.max(0) as usize,
        })
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Load a zero-based page
    pub fn load_page(&self, index: usize) -> Result<Page, EngineError> {
        if index >= self.page_count {
            return Err(EngineError::PageNotFound(index, self.page_count));
        }
        Ok(self.doc.load_page(index as i32)?)
    }
}

fn has_pdf_header(data: &[u8]) -> bool {
    let window = &data[..data.len().min(HEADER_SEARCH_LIMIT)];
    window.windows(4).any(|w| w == b"%PDF")
}
