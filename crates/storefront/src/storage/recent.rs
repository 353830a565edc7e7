//! Recently-viewed products collection store.

use std::sync::Arc;

use crate::models::{ProductSummary, RecentProductEntry};

use super::{StorageBackend, keys, read_collection, write_collection};

/// Typed accessor over the `seasons_recent_products` blob.
///
/// Most-recent-first, deduplicated by product id (re-viewing moves the entry
/// to the front), capped at [`Self::MAX_ENTRIES`].
#[derive(Clone)]
pub struct RecentProductsStore {
    backend: Arc<dyn StorageBackend>,
}

impl RecentProductsStore {
    /// Cap on stored entries; the oldest is evicted past this.
    pub const MAX_ENTRIES: usize = 10;

    pub(super) fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// The decoded history, or empty if storage is absent or unreadable.
    #[must_use]
    pub fn get(&self) -> Vec<RecentProductEntry> {
        read_collection(self.backend.as_ref(), keys::RECENT_PRODUCTS)
    }

    /// Record a view of `product`: move-to-front-or-insert, then truncate.
    pub fn add(&self, product: &ProductSummary) -> bool {
        let mut recent = self.get();
        recent.retain(|entry| entry.id != product.id);
        recent.insert(0, RecentProductEntry::from_product(product));
        recent.truncate(Self::MAX_ENTRIES);
        write_collection(self.backend.as_ref(), keys::RECENT_PRODUCTS, &recent)
    }

    /// Remove the whole history blob.
    pub fn clear(&self) -> bool {
        self.backend.remove(keys::RECENT_PRODUCTS)
    }
}
