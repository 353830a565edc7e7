//! Preferences collection store.

use std::sync::Arc;

use crate::models::{PreferenceUpdate, Preferences};

use super::{StorageBackend, keys, read_collection, write_collection};

/// Typed accessor over the `seasons_user_preferences` blob.
#[derive(Clone)]
pub struct PreferencesStore {
    backend: Arc<dyn StorageBackend>,
}

impl PreferencesStore {
    pub(super) fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// The stored record, or the default preference record if storage is
    /// absent or unreadable.
    #[must_use]
    pub fn get(&self) -> Preferences {
        read_collection(self.backend.as_ref(), keys::USER_PREFERENCES)
    }

    /// Replace the whole record.
    pub fn set(&self, preferences: &Preferences) -> bool {
        write_collection(self.backend.as_ref(), keys::USER_PREFERENCES, preferences)
    }

    /// Merge a single-field update into the stored record.
    pub fn update(&self, update: PreferenceUpdate) -> bool {
        let mut preferences = self.get();
        preferences.apply(update);
        self.set(&preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    use seasons_core::{CurrencyCode, ThemeMode};

    fn store() -> PreferencesStore {
        PreferencesStore::new(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn get_on_empty_storage_is_the_default_record() {
        assert_eq!(store().get(), Preferences::default());
    }

    #[test]
    fn update_merges_into_the_existing_record() {
        let prefs = store();
        prefs.update(PreferenceUpdate::Theme(ThemeMode::Dark));
        prefs.update(PreferenceUpdate::Language("fr".to_owned()));

        let stored = prefs.get();
        assert_eq!(stored.theme, ThemeMode::Dark);
        assert_eq!(stored.language, "fr");
        // untouched fields keep their defaults
        assert_eq!(stored.currency, CurrencyCode::USD);
        assert!(stored.notifications);
    }

    #[test]
    fn corrupt_blob_degrades_to_the_default_record() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set(keys::USER_PREFERENCES, "42");
        let prefs = PreferencesStore::new(backend);
        assert_eq!(prefs.get(), Preferences::default());
    }
}
