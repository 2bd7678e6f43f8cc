//! MuPDF implementation of the PDF engine

use std::sync::Arc;

use mupdf::Page;

use super::render::render_page;
use super::safe::SafeDocument;
use super::stext::extract_page_geometry;
use crate::engine::{EngineError, PageImage, PdfEngine};
use crate::extraction::{OcrMode, PageGeometry};
use crate::ocr::{boxes_to_geometry, OcrError, OcrProvider};

/// Default resolution for OCR rasters
pub const DEFAULT_OCR_DPI: u32 = 300;

/// PDF engine backed by MuPDF, with an optional OCR provider
pub struct MuPdfEngine {
    ocr: Option<Arc<dyn OcrProvider>>,
    ocr_dpi: u32,
    ocr_language: Option<String>,
}

impl Default for MuPdfEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MuPdfEngine {
    /// Engine without OCR; `auto`/`full` extraction fails when OCR is needed
    pub fn new() -> Self {
        Self {
            ocr: None,
            ocr_dpi: DEFAULT_OCR_DPI,
            ocr_language: None,
        }
    }

    /// Attach an OCR provider
    pub fn with_ocr(mut self, provider: Arc<dyn OcrProvider>, dpi: u32, language: Option<String>) -> Self {
        self.ocr = Some(provider);
        self.ocr_dpi = dpi.max(1);
        self.ocr_language = language;
        self
    }

    /// Run OCR over the whole page
    fn ocr_page(&self, page: &Page) -> Result<PageGeometry, EngineError> {
        let provider = self
            .ocr
            .as_ref()
            .ok_or_else(|| EngineError::OcrUnavailable("no OCR provider configured".to_string()))?;

        let image = render_page(page, self.ocr_dpi)?;
        let boxes = provider
            .recognize(&image.png, self.ocr_language.as_deref())
            .map_err(|e| match e {
                OcrError::ProviderNotAvailable(msg) => EngineError::OcrUnavailable(msg),
                other => EngineError::Ocr(other),
            })?;

        tracing::debug!(
            provider = provider.name(),
            boxes = boxes.len(),
            dpi = self.ocr_dpi,
            "OCR text layer built"
        );
        Ok(boxes_to_geometry(&boxes, self.ocr_dpi))
    }
}

impl PdfEngine for MuPdfEngine {
    fn render_pages(&self, bytes: &[u8], dpi: u32) -> Result<Vec<PageImage>, EngineError> {
        let doc = SafeDocument::open(bytes)?;
        (0..doc.page_count())
            .map(|index| {
                let page = doc.load_page(index)?;
                render_page(&page, dpi)
            })
            .collect()
    }

    fn extract_geometry(
        &self,
        bytes: &[u8],
        page_index: usize,
        flags: u32,
        ocr_mode: OcrMode,
    ) -> Result<PageGeometry, EngineError> {
        let doc = SafeDocument::open(bytes)?;
        let page = doc.load_page(page_index)?;

        match ocr_mode {
            OcrMode::Off => extract_page_geometry(&page, flags),
            OcrMode::Auto => {
                let embedded = extract_page_geometry(&page, flags)?;
                if !embedded.words.is_empty() {
                    return Ok(embedded);
                }
                tracing::debug!(page = page_index, "No embedded text, falling back to OCR");
                self.ocr_page(&page)
            }
            OcrMode::Full => self.ocr_page(&page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PixelRect;
    use crate::ocr::{MockProvider, OcrBox, OcrLevel};

    /// Build a small valid PDF with one text page per entry in `pages`
    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut objects: Vec<String> = Vec::new();
        let n = pages.len();
        // 1: catalog, 2: pages, 3: font, then (page, contents) pairs
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        let kids: Vec<String> = (0..n).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            n
        ));
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());
        for (i, text) in pages.iter().enumerate() {
            let content_id = 5 + 2 * i;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                content_id
            ));
            let stream = if text.is_empty() {
                String::new()
            } else {
                format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", text)
            };
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                stream.len(),
                stream
            ));
        }

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        out
    }

    fn ocr_word(x: f32) -> OcrBox {
        OcrBox {
            level: OcrLevel::Word,
            rect: PixelRect::new(x, 300.0, x + 100.0, 375.0),
            confidence: 90.0,
            text: "scan".to_string(),
        }
    }

    #[test]
    fn test_render_pages_at_dpi() {
        let pdf = build_pdf(&["Hello world", ""]);
        let images = MuPdfEngine::new().render_pages(&pdf, 72).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].width_px, 612);
        assert_eq!(images[0].height_px, 792);
        assert!(images[0].png.starts_with(&[0x89, b'P', b'N', b'G']));

        let images = MuPdfEngine::new().render_pages(&pdf, 144).unwrap();
        assert_eq!(images[1].width_px, 1224);
    }

    #[test]
    fn test_render_rejects_garbage() {
        let result = MuPdfEngine::new().render_pages(b"not a pdf at all", 72);
        assert!(matches!(result, Err(EngineError::Open(_))));
    }

    #[test]
    fn test_extract_embedded_text() {
        let pdf = build_pdf(&["Hello world"]);
        let geometry = MuPdfEngine::new()
            .extract_geometry(&pdf, 0, 0, OcrMode::Off)
            .unwrap();
        assert_eq!(geometry.blocks.len(), 1);
        assert_eq!(geometry.lines.len(), 1);
        assert_eq!(geometry.words.len(), 2);
        assert!(!geometry.spans.is_empty());

        let hello = geometry.words[0];
        let world = geometry.words[1];
        assert!(hello.x0 >= 71.0 && hello.x0 < 73.0);
        assert!(hello.x1 <= world.x0);
        // y grows downward: baseline at 792 - 700
        assert!(hello.y1 > 80.0 && hello.y1 < 100.0);
    }

    #[test]
    fn test_extract_page_out_of_range() {
        let pdf = build_pdf(&["Hello"]);
        let result = MuPdfEngine::new().extract_geometry(&pdf, 3, 0, OcrMode::Off);
        assert!(matches!(result, Err(EngineError::PageNotFound(3, 1))));
    }

    #[test]
    fn test_full_ocr_without_provider_fails() {
        let pdf = build_pdf(&["Hello"]);
        let result = MuPdfEngine::new().extract_geometry(&pdf, 0, 0, OcrMode::Full);
        assert!(matches!(result, Err(EngineError::OcrUnavailable(_))));
    }

    #[test]
    fn test_auto_ocr_only_for_empty_pages() {
        let provider = Arc::new(MockProvider::new(vec![ocr_word(300.0), ocr_word(500.0)]));
        let engine = MuPdfEngine::new().with_ocr(provider.clone(), 300, None);
        let pdf = build_pdf(&["Hello world", ""]);

        let text_page = engine.extract_geometry(&pdf, 0, 0, OcrMode::Auto).unwrap();
        assert_eq!(text_page.words.len(), 2);
        assert_eq!(provider.calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        let blank_page = engine.extract_geometry(&pdf, 1, 0, OcrMode::Auto).unwrap();
        assert_eq!(blank_page.words.len(), 2);
        assert!((blank_page.words[0].x0 - 72.0).abs() < 1e-3);
        assert_eq!(provider.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_full_ocr_ignores_embedded_text() {
        let provider = Arc::new(MockProvider::new(vec![ocr_word(300.0)]));
        let engine = MuPdfEngine::new().with_ocr(provider, 300, Some("eng".to_string()));
        let pdf = build_pdf(&["Hello world"]);

        let geometry = engine.extract_geometry(&pdf, 0, 0, OcrMode::Full).unwrap();
        assert_eq!(geometry.words.len(), 1);
        assert!(geometry.blocks.is_empty());
    }
}
