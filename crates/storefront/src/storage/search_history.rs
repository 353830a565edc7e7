//! Search history collection store.

use std::sync::Arc;

use crate::models::SearchHistoryEntry;

use super::{StorageBackend, keys, read_collection, write_collection};

/// Typed accessor over the `seasons_search_history` blob.
///
/// Most-recent-first, deduplicated case-insensitively by term (the stored
/// term keeps the casing as typed), capped at [`Self::MAX_ENTRIES`].
#[derive(Clone)]
pub struct SearchHistoryStore {
    backend: Arc<dyn StorageBackend>,
}

impl SearchHistoryStore {
    /// Cap on stored entries; the oldest is evicted past this.
    pub const MAX_ENTRIES: usize = 20;

    pub(super) fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// The decoded history, or empty if storage is absent or unreadable.
    #[must_use]
    pub fn get(&self) -> Vec<SearchHistoryEntry> {
        read_collection(self.backend.as_ref(), keys::SEARCH_HISTORY)
    }

    /// Record a search. Blank or whitespace-only terms are ignored
    /// (returns `false`, history unchanged).
    pub fn add(&self, term: &str) -> bool {
        if term.trim().is_empty() {
            return false;
        }
        let mut history = self.get();
        let folded = term.to_lowercase();
        history.retain(|entry| entry.term.to_lowercase() != folded);
        history.insert(0, SearchHistoryEntry::now(term));
        history.truncate(Self::MAX_ENTRIES);
        write_collection(self.backend.as_ref(), keys::SEARCH_HISTORY, &history)
    }

    /// Remove the whole history blob.
    pub fn clear(&self) -> bool {
        self.backend.remove(keys::SEARCH_HISTORY)
    }
}
