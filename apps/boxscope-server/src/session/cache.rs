//! Geometry cache tracking
//!
//! Tracks the `(flags, ocr_mode)` pair the store's geometry was computed
//! under. A request with a different pair clears every page of every
//! document before anything is recomputed, so no slot ever holds geometry
//! from older settings.

use crate::engine::PdfEngine;
use crate::extraction::OcrMode;
use crate::store::{CacheSlot, DocumentStore};

/// Settings that affect extracted geometry (DPI does not)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey {
    pub flags: u32,
    pub ocr_mode: OcrMode,
}

/// A page whose extraction failed
#[derive(Debug, Clone, PartialEq)]
pub struct PageFailure {
    pub document: String,
    pub page: usize,
    pub reason: String,
}

/// Outcome of filling one or more documents
#[derive(Debug, Default)]
pub struct WarmReport {
    /// Pages extracted by this call
    pub computed: usize,
    /// Pages that failed during this call
    pub failed: Vec<PageFailure>,
}

impl WarmReport {
    fn merge(&mut self, other: WarmReport) {
        self.computed += other.computed;
        self.failed.extend(other.failed);
    }
}

/// Last-used extraction settings for one store
#[derive(Debug, Default)]
pub struct GeometryCache {
    last_used: Option<CacheKey>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_used(&self) -> Option<CacheKey> {
        self.last_used
    }

    /// Forget the last-used settings; the next request invalidates
    pub fn reset(&mut self) {
        self.last_used = None;
    }

    /// Clear the whole store if `key` differs from the last-used settings
    ///
    /// Returns true when the store was invalidated.
    pub fn sync(&mut self, store: &mut DocumentStore, key: CacheKey) -> bool {
        if self.last_used == Some(key) {
            return false;
        }

        tracing::debug!(
            old = ?self.last_used,
            new = ?key,
            "Extraction settings changed, clearing cached geometry"
        );
        store.invalidate_all();
        self.last_used = Some(key);
        true
    }

    /// Fill every `NotComputed` page of one document
    ///
    /// Failed pages are recorded as `Failed` and reported, not retried.
    pub fn ensure_document(
        &self,
        engine: &dyn PdfEngine,
        store: &mut DocumentStore,
        doc_idx: usize,
        key: CacheKey,
    ) -> WarmReport {
        let mut report = WarmReport::default();
        let Some(doc) = store.get_mut(doc_idx) else {
            return report;
        };

        for (index, page) in doc.pages.iter_mut().enumerate() {
            if page.geometry != CacheSlot::NotComputed {
                continue;
            }

            match engine.extract_geometry(&doc.bytes, index, key.flags, key.ocr_mode) {
                Ok(geometry) => {
                    page.geometry = CacheSlot::Computed(geometry);
                    report.computed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        document = %doc.name,
                        page = index,
                        error = %e,
                        "Page extraction failed"
                    );
                    page.geometry = CacheSlot::Failed(e.to_string());
                    report.failed.push(PageFailure {
                        document: doc.name.clone(),
                        page: index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Bring the store in line with `key`, then fill the current document
    /// and the one after it
    pub fn prepare(
        &mut self,
        engine: &dyn PdfEngine,
        store: &mut DocumentStore,
        doc_idx: usize,
        key: CacheKey,
    ) -> WarmReport {
        self.sync(store, key);

        let mut report = self.ensure_document(engine, store, doc_idx, key);

        let next = doc_idx + 1;
        if next < store.len() {
            let warm = self.ensure_document(engine, store, next, key);
            if warm.computed > 0 {
                tracing::debug!(doc_idx = next, pages = warm.computed, "Warmed next document");
            }
            report.merge(warm);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::fake::{fake_pdf, fake_pdf_failing, FakeEngine};
    use crate::store::SlotStatus;

    const KEY: CacheKey = CacheKey {
        flags: 199,
        ocr_mode: OcrMode::Off,
    };

    fn store(engine: &FakeEngine, docs: &[(&str, Vec<u8>)]) -> DocumentStore {
        let inputs = docs
            .iter()
            .map(|(n, b)| (n.to_string(), Arc::new(b.clone())));
        DocumentStore::build(engine, inputs, 72).0
    }

    fn statuses(store: &DocumentStore, doc: usize) -> Vec<SlotStatus> {
        store.get(doc).unwrap().pages.iter().map(|p| p.geometry.status()).collect()
    }

    #[test]
    fn test_first_request_fills_current_and_next() {
        let engine = FakeEngine::new();
        let mut store = store(
            &engine,
            &[("a.pdf", fake_pdf(2)), ("b.pdf", fake_pdf(3)), ("c.pdf", fake_pdf(1))],
        );
        let mut cache = GeometryCache::new();

        let report = cache.prepare(&engine, &mut store, 0, KEY);

        assert_eq!(report.computed, 5);
        assert!(report.failed.is_empty());
        assert_eq!(engine.extractions(), 5);
        assert_eq!(cache.last_used(), Some(KEY));
        assert_eq!(statuses(&store, 2), vec![SlotStatus::NotComputed]);
    }

    #[test]
    fn test_unchanged_settings_hit_cache() {
        let engine = FakeEngine::new();
        let mut store = store(&engine, &[("a.pdf", fake_pdf(2)), ("b.pdf", fake_pdf(1))]);
        let mut cache = GeometryCache::new();

        cache.prepare(&engine, &mut store, 0, KEY);
        let calls = engine.extractions();
        let report = cache.prepare(&engine, &mut store, 0, KEY);

        assert_eq!(report.computed, 0);
        assert_eq!(engine.extractions(), calls);
    }

    #[test]
    fn test_settings_change_clears_every_document() {
        let engine = FakeEngine::new();
        let mut store = store(
            &engine,
            &[("a.pdf", fake_pdf(1)), ("b.pdf", fake_pdf(1)), ("c.pdf", fake_pdf(1))],
        );
        let mut cache = GeometryCache::new();

        // Fill all three documents under the first settings
        cache.prepare(&engine, &mut store, 0, KEY);
        cache.prepare(&engine, &mut store, 1, KEY);
        assert_eq!(statuses(&store, 2), vec![SlotStatus::Computed]);

        let changed = CacheKey {
            ocr_mode: OcrMode::Auto,
            ..KEY
        };
        cache.prepare(&engine, &mut store, 0, changed);

        // c.pdf is neither current nor next, so it was cleared and left empty
        assert_eq!(statuses(&store, 2), vec![SlotStatus::NotComputed]);
        let CacheSlot::Computed(geometry) = &store.get(0).unwrap().pages[0].geometry else {
            panic!("current document not recomputed");
        };
        // the fake engine encodes the OCR mode into x1
        assert_eq!(geometry.blocks[0].x1, 199.0 + 100.0 + 1.0);
    }

    #[test]
    fn test_flag_change_recomputes() {
        let engine = FakeEngine::new();
        let mut store = store(&engine, &[("a.pdf", fake_pdf(1))]);
        let mut cache = GeometryCache::new();

        cache.prepare(&engine, &mut store, 0, KEY);
        cache.prepare(&engine, &mut store, 0, CacheKey { flags: 7, ..KEY });

        assert_eq!(engine.extractions(), 2);
        let CacheSlot::Computed(geometry) = &store.get(0).unwrap().pages[0].geometry else {
            panic!("expected geometry");
        };
        assert_eq!(geometry.words[0].x0, 7.0);
    }

    #[test]
    fn test_failed_page_is_not_retried() {
        let engine = FakeEngine::new();
        let mut store = store(&engine, &[("a.pdf", fake_pdf_failing(3, 1))]);
        let mut cache = GeometryCache::new();

        let report = cache.prepare(&engine, &mut store, 0, KEY);
        assert_eq!(report.computed, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].page, 1);
        assert_eq!(
            statuses(&store, 0),
            vec![SlotStatus::Computed, SlotStatus::Failed, SlotStatus::Computed]
        );

        let calls = engine.extractions();
        let report = cache.prepare(&engine, &mut store, 0, KEY);
        assert!(report.failed.is_empty());
        assert_eq!(engine.extractions(), calls);
    }

    #[test]
    fn test_reset_forces_invalidation() {
        let engine = FakeEngine::new();
        let mut store = store(&engine, &[("a.pdf", fake_pdf(1))]);
        let mut cache = GeometryCache::new();

        cache.prepare(&engine, &mut store, 0, KEY);
        cache.reset();
        assert!(cache.sync(&mut store, KEY));
        assert_eq!(statuses(&store, 0), vec![SlotStatus::NotComputed]);
    }

    #[test]
    fn test_out_of_range_document_is_ignored() {
        let engine = FakeEngine::new();
        let mut store = store(&engine, &[("a.pdf", fake_pdf(1))]);
        let report = GeometryCache::new().prepare(&engine, &mut store, 5, KEY);
        assert_eq!(report.computed, 0);
    }
}
