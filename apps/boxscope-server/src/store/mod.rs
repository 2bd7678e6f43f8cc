//! Document/Page store
//!
//! In-memory collection of the documents of one session. Each document keeps
//! its original bytes, one raster per page at the store's DPI, and a lazily
//! filled geometry slot per page.
//!
//! Documents are kept sorted by name. Rasters are only produced here, so a
//! DPI change means building a new store.

use std::sync::Arc;

use serde::Serialize;

use crate::engine::{EngineError, PageImage, PdfEngine};
use crate::extraction::PageGeometry;

/// Cached geometry for one page
///
/// All four levels live in one [`PageGeometry`], so they are filled and
/// cleared together.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CacheSlot {
    #[default]
    NotComputed,
    Computed(PageGeometry),
    /// Extraction failed under the current settings; not retried until the
    /// next invalidation
    Failed(String),
}

impl CacheSlot {
    pub fn status(&self) -> SlotStatus {
        match self {
            CacheSlot::NotComputed => SlotStatus::NotComputed,
            CacheSlot::Computed(_) => SlotStatus::Computed,
            CacheSlot::Failed(_) => SlotStatus::Failed,
        }
    }
}

/// Serializable view of a [`CacheSlot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    NotComputed,
    Computed,
    Failed,
}

/// One page: its raster and its geometry slot
#[derive(Debug, Clone)]
pub struct Page {
    pub image: PageImage,
    pub geometry: CacheSlot,
}

/// An uploaded PDF
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    /// Original file content, never modified
    pub bytes: Arc<Vec<u8>>,
    pub pages: Vec<Page>,
}

impl Document {
    /// Rasterize every page of `bytes` at `dpi`
    pub fn render(
        engine: &dyn PdfEngine,
        name: &str,
        bytes: Arc<Vec<u8>>,
        dpi: u32,
    ) -> Result<Self, EngineError> {
        let images = engine.render_pages(&bytes, dpi)?;
        let pages = images
            .into_iter()
            .map(|image| Page {
                image,
                geometry: CacheSlot::NotComputed,
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            bytes,
            pages,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Reset every page to `NotComputed`
    pub fn invalidate(&mut self) {
        for page in &mut self.pages {
            page.geometry = CacheSlot::NotComputed;
        }
    }
}

/// A file that could not be turned into a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub name: String,
    pub reason: String,
}

/// Sorted collection of documents rendered at one DPI
#[derive(Debug, Clone)]
pub struct DocumentStore {
    documents: Vec<Document>,
    dpi: u32,
}

impl DocumentStore {
    pub fn new(dpi: u32) -> Self {
        Self {
            documents: Vec::new(),
            dpi,
        }
    }

    /// Build a store from `(name, bytes)` pairs
    ///
    /// Each input is rendered on its own; unparsable inputs are reported and
    /// skipped instead of failing the batch.
    pub fn build<I>(engine: &dyn PdfEngine, inputs: I, dpi: u32) -> (Self, Vec<Rejection>)
    where
        I: IntoIterator<Item = (String, Arc<Vec<u8>>)>,
    {
        let mut store = Self::new(dpi);
        let mut rejected = Vec::new();

        for (name, bytes) in inputs {
            match Document::render(engine, &name, bytes, dpi) {
                Ok(doc) => store.insert(doc),
                Err(e) => {
                    tracing::warn!(document = %name, dpi, error = %e, "Rejected unparsable PDF");
                    rejected.push(Rejection {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            documents = store.len(),
            rejected = rejected.len(),
            dpi,
            "Rendered document batch"
        );
        (store, rejected)
    }

    /// DPI the rasters were rendered at
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Insert a document in name order, replacing one with the same name
    pub fn insert(&mut self, doc: Document) {
        match self
            .documents
            .binary_search_by(|d| d.name.as_str().cmp(doc.name.as_str()))
        {
            Ok(idx) => self.documents[idx] = doc,
            Err(idx) => self.documents.insert(idx, doc),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Document> {
        let idx = self.position(name)?;
        Some(self.documents.remove(idx))
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, idx: usize) -> Option<&Document> {
        self.documents.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Document> {
        self.documents.get_mut(idx)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.documents
            .binary_search_by(|d| d.name.as_str().cmp(name))
            .ok()
    }

    pub fn names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.name.clone()).collect()
    }

    /// Reset the geometry of every page of every document
    pub fn invalidate_all(&mut self) {
        for doc in &mut self.documents {
            doc.invalidate();
        }
    }
}
