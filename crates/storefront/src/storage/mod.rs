//! Local persistence store.
//!
//! Six named collections, each stored as exactly one serialized blob under a
//! fixed key in a [`StorageBackend`]: cart, wishlist, preferences, recent
//! products, search history, and theme. Typed stores layered over the backend
//! enforce the per-collection invariants (quantity merge, set semantics,
//! bounded move-to-front history).
//!
//! # Failure model
//!
//! A missing or corrupt blob is never an error: `get` degrades to the
//! collection's default (logging the decode failure) and `set`-style mutators
//! report success as a bool. Nothing here panics or returns `Result`.
//!
//! # Concurrency
//!
//! Mutators are read-modify-write with no cross-call locking. Two rapid
//! mutations of the same collection from concurrent UI callbacks can lose an
//! update (last write wins). Collections are small and mutations user-paced,
//! so this is an accepted limitation; a CAS-capable backend can slot in
//! behind [`StorageBackend`] if that ever changes.

mod backend;
mod cart;
mod preferences;
mod recent;
mod search_history;
mod theme;
mod wishlist;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use cart::CartStore;
pub use preferences::PreferencesStore;
pub use recent::RecentProductsStore;
pub use search_history::SearchHistoryStore;
pub use theme::ThemeStore;
pub use wishlist::WishlistStore;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Fixed storage keys, one per collection.
pub mod keys {
    pub const CART: &str = "seasons_cart";
    pub const WISHLIST: &str = "seasons_wishlist";
    pub const USER_PREFERENCES: &str = "seasons_user_preferences";
    pub const RECENT_PRODUCTS: &str = "seasons_recent_products";
    pub const SEARCH_HISTORY: &str = "seasons_search_history";
    pub const THEME: &str = "seasons_theme";

    /// Every key the store owns, for whole-store resets.
    pub const ALL: [&str; 6] = [
        CART,
        WISHLIST,
        USER_PREFERENCES,
        RECENT_PRODUCTS,
        SEARCH_HISTORY,
        THEME,
    ];
}

/// Decode the blob under `key`, degrading to the default on absence or
/// decode failure.
pub(crate) fn read_collection<T>(backend: &dyn StorageBackend, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = backend.get(key) else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, error = %err, "corrupt collection blob, using default");
            T::default()
        }
    }
}

/// Serialize `value` and persist it under `key`.
pub(crate) fn write_collection<T>(backend: &dyn StorageBackend, key: &str, value: &T) -> bool
where
    T: Serialize,
{
    match serde_json::to_string(value) {
        Ok(raw) => backend.set(key, &raw),
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to encode collection");
            false
        }
    }
}

/// All six collection stores over one backend.
///
/// This is what UI views get handed; it is cheap to clone.
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn StorageBackend>,
    pub cart: CartStore,
    pub wishlist: WishlistStore,
    pub preferences: PreferencesStore,
    pub recent_products: RecentProductsStore,
    pub search_history: SearchHistoryStore,
    pub theme: ThemeStore,
}

impl LocalStore {
    /// Create the full store over a shared backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            cart: CartStore::new(Arc::clone(&backend)),
            wishlist: WishlistStore::new(Arc::clone(&backend)),
            preferences: PreferencesStore::new(Arc::clone(&backend)),
            recent_products: RecentProductsStore::new(Arc::clone(&backend)),
            search_history: SearchHistoryStore::new(Arc::clone(&backend)),
            theme: ThemeStore::new(Arc::clone(&backend)),
            backend,
        }
    }

    /// Remove every collection key. Used for full local-state resets
    /// (debugging, logout hygiene).
    ///
    /// Returns `false` if any removal failed; the rest are still attempted.
    pub fn clear_all_data(&self) -> bool {
        let mut ok = true;
        for key in keys::ALL {
            ok &= self.backend.remove(key);
        }
        ok
    }
}
