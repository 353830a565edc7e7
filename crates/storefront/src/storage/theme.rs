//! Standalone theme store.
//!
//! Stored as the bare string `light` / `dark` rather than a JSON blob, under
//! its own key. Independent of `Preferences.theme` - the navbar toggle reads
//! and writes this key only.

use std::sync::Arc;

use seasons_core::ThemeMode;

use super::{StorageBackend, keys};

/// Typed accessor over the `seasons_theme` value.
#[derive(Clone)]
pub struct ThemeStore {
    backend: Arc<dyn StorageBackend>,
}

impl ThemeStore {
    pub(super) fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// The stored mode, defaulting to light when absent or unreadable.
    #[must_use]
    pub fn get(&self) -> ThemeMode {
        let Some(raw) = self.backend.get(keys::THEME) else {
            return ThemeMode::Light;
        };
        raw.parse().unwrap_or_else(|err| {
            tracing::warn!(key = keys::THEME, error = %err, "corrupt theme value, using light");
            ThemeMode::Light
        })
    }

    /// Persist `mode`.
    pub fn set(&self, mode: ThemeMode) -> bool {
        self.backend.set(keys::THEME, mode.as_str())
    }

    /// Flip between light and dark.
    pub fn toggle(&self) -> bool {
        self.set(self.get().toggled())
    }
}
