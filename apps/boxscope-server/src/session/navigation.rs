//! Navigation cursors
//!
//! Current document, page and level. Moves past either end are no-ops and
//! are reported through the `*_disabled` fields of [`NavigationState`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::extraction::Level;
use crate::store::DocumentStore;

/// What a prev/next move acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavTarget {
    Document,
    Page,
    Level,
}

impl FromStr for NavTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(NavTarget::Document),
            "page" => Ok(NavTarget::Page),
            "level" => Ok(NavTarget::Level),
            other => Err(format!("Unknown navigation target: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(Direction::Prev),
            "next" => Ok(Direction::Next),
            other => Err(format!("Unknown direction: {}", other)),
        }
    }
}

/// Cursor over a [`DocumentStore`]
///
/// `doc_idx` is `None` only when the store is empty; `page_index` is `None`
/// only when there is no current document or it has no pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub doc_idx: Option<usize>,
    pub page_index: Option<usize>,
    pub level: Level,
}

/// Navigation snapshot returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationState {
    pub document: Option<String>,
    pub doc_idx: Option<usize>,
    pub doc_count: usize,
    pub page_index: Option<usize>,
    pub page_count: usize,
    pub level: Level,
    pub doc_prev_disabled: bool,
    pub doc_next_disabled: bool,
    pub page_prev_disabled: bool,
    pub page_next_disabled: bool,
    pub level_prev_disabled: bool,
    pub level_next_disabled: bool,
}

fn first_page(store: &DocumentStore, doc_idx: usize) -> Option<usize> {
    store
        .get(doc_idx)
        .filter(|d| d.page_count() > 0)
        .map(|_| 0)
}

impl Cursor {
    /// Name of the current document
    pub fn document_name<'a>(&self, store: &'a DocumentStore) -> Option<&'a str> {
        self.doc_idx
            .and_then(|i| store.get(i))
            .map(|d| d.name.as_str())
    }

    fn page_count(&self, store: &DocumentStore) -> usize {
        self.doc_idx
            .and_then(|i| store.get(i))
            .map(|d| d.page_count())
            .unwrap_or(0)
    }

    /// Jump to the first page of the first document
    pub fn reset(&mut self, store: &DocumentStore) {
        self.doc_idx = if store.is_empty() { None } else { Some(0) };
        self.page_index = self.doc_idx.and_then(|d| first_page(store, d));
    }

    /// Bring the cursor back in bounds after the store changed
    ///
    /// The document named `previous` stays selected if it still exists;
    /// otherwise the document index is clamped and the page starts over.
    pub fn reconcile(&mut self, store: &DocumentStore, previous: Option<&str>) {
        if store.is_empty() {
            self.doc_idx = None;
            self.page_index = None;
            return;
        }

        match previous.and_then(|name| store.position(name)) {
            Some(idx) => {
                self.doc_idx = Some(idx);
                let pages = self.page_count(store);
                self.page_index = match self.page_index {
                    _ if pages == 0 => None,
                    Some(p) => Some(p.min(pages - 1)),
                    None => Some(0),
                };
            }
            None => {
                let idx = self.doc_idx.unwrap_or(0).min(store.len() - 1);
                self.doc_idx = Some(idx);
                self.page_index = first_page(store, idx);
            }
        }
    }

    /// Select a document by name; the page starts over at 0
    pub fn select_document(&mut self, store: &DocumentStore, name: &str) -> bool {
        let Some(idx) = store.position(name) else {
            return false;
        };
        self.doc_idx = Some(idx);
        self.page_index = first_page(store, idx);
        true
    }

    /// Select a page of the current document; out-of-range indices are ignored
    pub fn select_page(&mut self, store: &DocumentStore, index: usize) -> bool {
        if index >= self.page_count(store) {
            return false;
        }
        self.page_index = Some(index);
        true
    }

    /// Move one step; returns false at a boundary
    pub fn step(&mut self, store: &DocumentStore, target: NavTarget, direction: Direction) -> bool {
        match target {
            NavTarget::Document => {
                let Some(current) = self.doc_idx else {
                    return false;
                };
                let next = match direction {
                    Direction::Prev => current.checked_sub(1),
                    Direction::Next => Some(current + 1).filter(|&i| i < store.len()),
                };
                match next {
                    Some(idx) => {
                        self.doc_idx = Some(idx);
                        self.page_index = first_page(store, idx);
                        true
                    }
                    None => false,
                }
            }
            NavTarget::Page => {
                let Some(current) = self.page_index else {
                    return false;
                };
                let pages = self.page_count(store);
                let next = match direction {
                    Direction::Prev => current.checked_sub(1),
                    Direction::Next => Some(current + 1).filter(|&i| i < pages),
                };
                match next {
                    Some(p) => {
                        self.page_index = Some(p);
                        true
                    }
                    None => false,
                }
            }
            NavTarget::Level => {
                let next = match direction {
                    Direction::Prev => self.level.prev(),
                    Direction::Next => self.level.next(),
                };
                match next {
                    Some(level) => {
                        self.level = level;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    pub fn state(&self, store: &DocumentStore) -> NavigationState {
        let doc_count = store.len();
        let page_count = self.page_count(store);

        NavigationState {
            document: self.document_name(store).map(str::to_string),
            doc_idx: self.doc_idx,
            doc_count,
            page_index: self.page_index,
            page_count,
            level: self.level,
            doc_prev_disabled: self.doc_idx.map_or(true, |i| i == 0),
            doc_next_disabled: self.doc_idx.map_or(true, |i| i + 1 >= doc_count),
            page_prev_disabled: self.page_index.map_or(true, |p| p == 0),
            page_next_disabled: self.page_index.map_or(true, |p| p + 1 >= page_count),
            level_prev_disabled: self.level.prev().is_none(),
            level_next_disabled: self.level.next().is_none(),
        }
    }
}
