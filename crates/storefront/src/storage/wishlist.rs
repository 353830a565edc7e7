//! Wishlist collection store.

use std::sync::Arc;

use seasons_core::ProductId;

use crate::models::{ProductSummary, WishlistEntry};

use super::{StorageBackend, keys, read_collection, write_collection};

/// Typed accessor over the `seasons_wishlist` blob.
///
/// Set semantics keyed by product id.
#[derive(Clone)]
pub struct WishlistStore {
    backend: Arc<dyn StorageBackend>,
}

impl WishlistStore {
    pub(super) fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// The decoded wishlist, or empty if storage is absent or unreadable.
    #[must_use]
    pub fn get(&self) -> Vec<WishlistEntry> {
        read_collection(self.backend.as_ref(), keys::WISHLIST)
    }

    /// Replace the whole wishlist.
    pub fn set(&self, entries: &[WishlistEntry]) -> bool {
        write_collection(self.backend.as_ref(), keys::WISHLIST, &entries)
    }

    /// Add `product`; a no-op if its id is already present.
    pub fn add_item(&self, product: &ProductSummary) -> bool {
        let mut wishlist = self.get();
        if wishlist.iter().any(|entry| entry.id == product.id) {
            return true;
        }
        wishlist.push(WishlistEntry::from_product(product));
        self.set(&wishlist)
    }

    /// Remove the entry for `id`, if present.
    pub fn remove_item(&self, id: ProductId) -> bool {
        let mut wishlist = self.get();
        wishlist.retain(|entry| entry.id != id);
        self.set(&wishlist)
    }

    /// Whether `id` is saved.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get().iter().any(|entry| entry.id == id)
    }

    /// Remove the whole wishlist blob.
    pub fn clear(&self) -> bool {
        self.backend.remove(keys::WISHLIST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    use seasons_core::Price;

    fn store() -> WishlistStore {
        WishlistStore::new(Arc::new(MemoryBackend::new()))
    }

    fn product() -> ProductSummary {
        ProductSummary {
            id: ProductId::generate(),
            name: "Canvas tote".to_owned(),
            sku: "TOTE-02".to_owned(),
            retail_price: Price::from_cents(2500),
            wholesale_base_price: None,
            images: vec![],
        }
    }

    #[test]
    fn add_is_idempotent_per_product_id() {
        let wishlist = store();
        let p = product();

        assert!(wishlist.add_item(&p));
        assert!(wishlist.add_item(&p));

        assert_eq!(wishlist.get().len(), 1);
    }

    #[test]
    fn contains_tracks_membership() {
        let wishlist = store();
        let p = product();
        assert!(!wishlist.contains(p.id));

        wishlist.add_item(&p);
        assert!(wishlist.contains(p.id));

        wishlist.remove_item(p.id);
        assert!(!wishlist.contains(p.id));
    }

    #[test]
    fn get_on_empty_storage_is_an_empty_list() {
        assert!(store().get().is_empty());
    }

    #[test]
    fn clear_removes_the_key() {
        let backend = Arc::new(MemoryBackend::new());
        let wishlist = WishlistStore::new(backend.clone());
        wishlist.add_item(&product());
        assert!(wishlist.clear());
        assert!(backend.get(keys::WISHLIST).is_none());
    }
}
