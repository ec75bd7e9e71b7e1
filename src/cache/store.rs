//! In-memory render cache keyed by document identifier.

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::pages::{DocumentId, PageRecord};

/// One cached render and the stamp it was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub last_modified: String,
    pub page: PageRecord,
}

/// Cached renders for the documents of previous runs.
///
/// Entries are only ever replaced wholesale; the last store for a document
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderCache {
    entries: BTreeMap<DocumentId, CacheEntry>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: BTreeMap<DocumentId, CacheEntry>) -> Self {
        Self { entries }
    }

    pub(crate) fn entries(&self) -> &BTreeMap<DocumentId, CacheEntry> {
        &self.entries
    }

    /// True iff an entry exists whose stamp equals `last_modified` exactly.
    /// An empty stamp carries no information and never matches.
    pub fn should_skip(&self, document: &DocumentId, last_modified: &str) -> bool {
        !last_modified.is_empty()
            && self
                .entries
                .get(document)
                .is_some_and(|entry| entry.last_modified == last_modified)
    }

    pub fn lookup(&self, document: &DocumentId) -> Option<&PageRecord> {
        self.entries.get(document).map(|entry| &entry.page)
    }

    /// Record a fresh render, replacing any previous entry.
    pub fn store(&mut self, page: PageRecord) {
        let entry = CacheEntry {
            last_modified: page.last_modified.clone(),
            page,
        };
        self.entries.insert(entry.page.document_id.clone(), entry);
    }

    /// Drop entries for documents outside `keep`. Returns how many were
    /// removed.
    pub fn prune(&mut self, keep: &[DocumentId]) -> usize {
        let keep: HashSet<&DocumentId> = keep.iter().collect();
        let before = self.entries.len();
        self.entries.retain(|document, _| keep.contains(document));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
