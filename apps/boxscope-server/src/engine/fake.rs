//! Scripted engine for tests
//!
//! Documents are plain text headers: `%PDF-FAKE <pages>` optionally followed
//! by `fail=<page>` to make extraction of that page fail. Anything else is
//! unparsable. Every call is counted so cache behavior can be asserted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{EngineError, PageImage, PdfEngine};
use crate::extraction::{OcrMode, PageGeometry};
use crate::geometry::{scale_for_dpi, Rect};

/// Bytes for a fake document with `pages` pages
pub fn fake_pdf(pages: usize) -> Vec<u8> {
    format!("%PDF-FAKE {}", pages).into_bytes()
}

/// Bytes for a fake document whose page `fail_page` cannot be extracted
pub fn fake_pdf_failing(pages: usize, fail_page: usize) -> Vec<u8> {
    format!("%PDF-FAKE {} fail={}", pages, fail_page).into_bytes()
}

struct FakeDoc {
    pages: usize,
    fail_page: Option<usize>,
}

fn parse(bytes: &[u8]) -> Result<FakeDoc, EngineError> {
    let text = std::str::from_utf8(bytes).map_err(|e| EngineError::Open(e.to_string()))?;
    let mut parts = text.split_whitespace();
    if parts.next() != Some("%PDF-FAKE") {
        return Err(EngineError::Open("no PDF header".to_string()));
    }
    let pages = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| EngineError::Open("missing page count".to_string()))?;
    let fail_page = parts
        .next()
        .and_then(|p| p.strip_prefix("fail="))
        .and_then(|p| p.parse().ok());
    Ok(FakeDoc { pages, fail_page })
}

#[derive(Default)]
pub struct FakeEngine {
    pub render_calls: AtomicUsize,
    pub extract_calls: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn renders(&self) -> usize {
        self.render_calls.load(Ordering::SeqCst)
    }

    pub fn extractions(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }
}

impl PdfEngine for FakeEngine {
    fn render_pages(&self, bytes: &[u8], dpi: u32) -> Result<Vec<PageImage>, EngineError> {
        let doc = parse(bytes)?;
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        let scale = scale_for_dpi(dpi);
        let png = Arc::new(format!("png@{}", dpi).into_bytes());
        Ok((0..doc.pages)
            .map(|_| PageImage {
                png: Arc::clone(&png),
                width_px: (612.0 * scale).round() as u32,
                height_px: (792.0 * scale).round() as u32,
            })
            .collect())
    }

    fn extract_geometry(
        &self,
        bytes: &[u8],
        page_index: usize,
        flags: u32,
        ocr_mode: OcrMode,
    ) -> Result<PageGeometry, EngineError> {
        let doc = parse(bytes)?;
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        if page_index >= doc.pages {
            return Err(EngineError::PageNotFound(page_index, doc.pages));
        }
        if doc.fail_page == Some(page_index) {
            return Err(EngineError::TextPage("malformed content stream".to_string()));
        }

        // Encode the inputs into the boxes so tests can tell results apart
        let tag = flags as f32;
        let mode = match ocr_mode {
            OcrMode::Off => 0.0,
            OcrMode::Auto => 1.0,
            OcrMode::Full => 2.0,
        };
        let row = |i: usize| {
            let y = 10.0 * i as f32 + page_index as f32;
            Rect::new(tag, y, tag + 100.0 + mode, y + 5.0)
        };
        Ok(PageGeometry {
            blocks: (0..1).map(row).collect(),
            lines: (0..2).map(row).collect(),
            spans: (0..3).map(row).collect(),
            words: (0..4).map(row).collect(),
        })
    }
}
