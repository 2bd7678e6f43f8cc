//! Inspection sessions
//!
//! A [`Session`] owns everything one user works with: the document store,
//! the navigation cursor, the active extraction settings and the record of
//! which settings the cached geometry was computed under. Sessions never
//! share any of it.
//!
//! Session methods are synchronous and may call into the PDF engine; the
//! HTTP layer runs them on blocking worker threads.

mod cache;
mod manager;
mod navigation;
mod settings;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::RenderConfig;
use crate::engine::PdfEngine;
use crate::error::{AppError, Result};
use crate::extraction::{Level, OcrMode};
use crate::figure::{build_figure, Figure};
use crate::store::{CacheSlot, Document, DocumentStore, Rejection, SlotStatus};

pub use cache::{CacheKey, GeometryCache, PageFailure, WarmReport};
pub use manager::{SessionManager, SharedSession};
pub use navigation::{Cursor, Direction, NavTarget, NavigationState};
pub use settings::{ExtractionSettings, SettingsUpdate, SettingsView};

/// Result of an upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub accepted: Vec<String>,
    pub rejected: Vec<Rejection>,
    pub navigation: NavigationState,
}

/// A document as listed to clients
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub name: String,
    pub page_count: usize,
    /// Geometry cache status per page
    pub pages: Vec<SlotStatus>,
}

/// What the current figure shows
#[derive(Debug, Clone, Serialize)]
pub struct FigureSummary {
    pub document: String,
    pub page: usize,
    pub page_count: usize,
    pub level: Level,
    pub boxes: usize,
    pub dpi: u32,
    pub ocr_mode: OcrMode,
    pub flags: u32,
}

/// Figure plus summary for the current page
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub summary: FigureSummary,
    pub figure: Figure,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub documents: Vec<String>,
    pub settings: SettingsView,
    pub navigation: NavigationState,
}

pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    render: RenderConfig,
    store: DocumentStore,
    cursor: Cursor,
    settings: ExtractionSettings,
    cache: GeometryCache,
}

impl Session {
    pub fn new(id: Uuid, render: RenderConfig) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            last_accessed: now,
            render,
            store: DocumentStore::new(render.default_dpi),
            cursor: Cursor::default(),
            settings: ExtractionSettings::new(render.default_dpi),
            cache: GeometryCache::new(),
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    pub fn navigation(&self) -> NavigationState {
        self.cursor.state(&self.store)
    }

    pub fn settings_view(&self) -> SettingsView {
        SettingsView::new(&self.settings, &self.render)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            last_accessed: self.last_accessed,
            documents: self.store.names(),
            settings: self.settings_view(),
            navigation: self.navigation(),
        }
    }

    pub fn documents(&self) -> Vec<DocumentSummary> {
        self.store
            .documents()
            .iter()
            .map(|d| DocumentSummary {
                name: d.name.clone(),
                page_count: d.page_count(),
                pages: d.pages.iter().map(|p| p.geometry.status()).collect(),
            })
            .collect()
    }

    /// Add uploaded files at the current DPI
    ///
    /// Files are rendered one by one; unparsable ones are reported and the
    /// rest are kept. A name already in the store is replaced. The whole
    /// cache starts over and the cursor goes to the first page of the
    /// first document.
    pub fn upload(
        &mut self,
        engine: &dyn PdfEngine,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<UploadReport> {
        if files.is_empty() {
            return Err(AppError::BadRequest("No files in upload".to_string()));
        }

        let dpi = self.store.dpi();
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for (name, bytes) in files {
            match Document::render(engine, &name, Arc::new(bytes), dpi) {
                Ok(doc) => {
                    tracing::info!(
                        session_id = %self.id,
                        document = %name,
                        pages = doc.page_count(),
                        dpi,
                        "Document rendered"
                    );
                    self.store.insert(doc);
                    accepted.push(name);
                }
                Err(e) => {
                    tracing::warn!(session_id = %self.id, document = %name, error = %e, "Rejected upload");
                    rejected.push(Rejection {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if accepted.is_empty() {
            let first = rejected.into_iter().next().ok_or_else(|| {
                AppError::Internal("Upload produced neither documents nor rejections".to_string())
            })?;
            return Err(AppError::UnparsablePdf {
                name: first.name,
                reason: first.reason,
            });
        }

        self.store.invalidate_all();
        self.cache.reset();
        self.cursor.reset(&self.store);

        Ok(UploadReport {
            accepted,
            rejected,
            navigation: self.navigation(),
        })
    }

    /// Drop one document without re-rendering the others
    pub fn remove_document(&mut self, name: &str) -> Result<NavigationState> {
        let previous = self.cursor.document_name(&self.store).map(str::to_string);
        self.store
            .remove(name)
            .ok_or_else(|| AppError::DocumentNotFound(name.to_string()))?;
        self.cursor.reconcile(&self.store, previous.as_deref());

        tracing::info!(session_id = %self.id, document = %name, "Document removed");
        Ok(self.navigation())
    }

    pub fn clear_documents(&mut self) -> NavigationState {
        self.store.clear();
        self.cursor.reconcile(&self.store, None);
        self.cache.reset();
        self.navigation()
    }

    pub fn select_document(&mut self, name: &str) -> Result<NavigationState> {
        if !self.cursor.select_document(&self.store, name) {
            return Err(AppError::DocumentNotFound(name.to_string()));
        }
        Ok(self.navigation())
    }

    /// One prev/next step; a step past either end leaves the state unchanged
    pub fn navigate(&mut self, target: NavTarget, direction: Direction) -> NavigationState {
        if !self.cursor.step(&self.store, target, direction) {
            tracing::debug!(session_id = %self.id, ?target, ?direction, "Navigation at boundary");
        }
        self.navigation()
    }

    pub fn select_page(&mut self, index: usize) -> NavigationState {
        self.cursor.select_page(&self.store, index);
        self.navigation()
    }

    pub fn set_level(&mut self, level: Level) -> NavigationState {
        self.cursor.level = level;
        self.navigation()
    }

    /// Apply a settings change
    ///
    /// Flags and OCR mode take effect on the next geometry request. A new
    /// DPI re-renders every document and keeps the current document
    /// selected by name.
    pub fn update_settings(
        &mut self,
        engine: &dyn PdfEngine,
        update: &SettingsUpdate,
    ) -> Result<SettingsView> {
        let update = update.validate(&self.render)?;

        if let Some(flags) = update.flags {
            self.settings.flags = flags;
        }
        if let Some(mode) = update.ocr_mode {
            self.settings.ocr_mode = mode;
        }
        if let Some(dpi) = update.dpi {
            self.set_dpi(engine, dpi);
        }

        Ok(self.settings_view())
    }

    fn set_dpi(&mut self, engine: &dyn PdfEngine, dpi: u32) {
        self.settings.dpi = dpi;
        if dpi == self.store.dpi() {
            return;
        }

        let previous = self.cursor.document_name(&self.store).map(str::to_string);
        let inputs = self
            .store
            .documents()
            .iter()
            .map(|d| (d.name.clone(), Arc::clone(&d.bytes)))
            .collect::<Vec<_>>();

        let (store, rejected) = DocumentStore::build(engine, inputs, dpi);
        for r in &rejected {
            tracing::error!(
                session_id = %self.id,
                document = %r.name,
                reason = %r.reason,
                "Document dropped while re-rendering"
            );
        }

        self.store = store;
        self.cache.reset();
        self.cursor.reconcile(&self.store, previous.as_deref());
    }

    /// Build the figure for the current page
    ///
    /// Returns `None` when no document or page is selected. Fills the
    /// geometry cache for the current and next document first.
    pub fn current_view(&mut self, engine: &dyn PdfEngine) -> Result<Option<PageView>> {
        let (Some(doc_idx), Some(page_index)) = (self.cursor.doc_idx, self.cursor.page_index)
        else {
            return Ok(None);
        };

        let key = self.settings.cache_key();
        self.cache.prepare(engine, &mut self.store, doc_idx, key);

        let dpi = self.store.dpi();
        let level = self.cursor.level;
        let doc = self
            .store
            .get(doc_idx)
            .ok_or_else(|| AppError::Internal(format!("Cursor past store end: {}", doc_idx)))?;
        let page = doc.pages.get(page_index).ok_or_else(|| {
            AppError::Internal(format!("Cursor past page end: {}/{}", doc.name, page_index))
        })?;

        let geometry = match &page.geometry {
            CacheSlot::Computed(geometry) => geometry,
            CacheSlot::Failed(reason) => {
                return Err(AppError::ExtractionFailure {
                    document: doc.name.clone(),
                    page: page_index,
                    reason: reason.clone(),
                })
            }
            CacheSlot::NotComputed => {
                return Err(AppError::Internal(format!(
                    "Geometry missing after warm-up: {}/{}",
                    doc.name, page_index
                )))
            }
        };

        let rects = geometry.level(level);
        Ok(Some(PageView {
            summary: FigureSummary {
                document: doc.name.clone(),
                page: page_index,
                page_count: doc.page_count(),
                level,
                boxes: rects.len(),
                dpi,
                ocr_mode: key.ocr_mode,
                flags: key.flags,
            },
            figure: build_figure(&page.image, rects, dpi, level),
        }))
    }
}
