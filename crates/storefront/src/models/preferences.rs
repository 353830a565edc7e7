//! User preference record.

use serde::{Deserialize, Serialize};

use seasons_core::{CurrencyCode, ThemeMode};

/// The single locally stored preference record.
///
/// Note: `theme` here is a stored preference and is deliberately independent
/// of the standalone theme key the UI toggle writes
/// ([`crate::storage::ThemeStore`]). The two have always been separate stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: ThemeMode,
    pub language: String,
    pub currency: CurrencyCode,
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Light,
            language: "en".to_owned(),
            currency: CurrencyCode::USD,
            notifications: true,
        }
    }
}

/// A single-field preference update.
///
/// Updates merge into the stored record one field at a time; the tagged enum
/// replaces the stringly-typed `(key, value)` pairs the UI used to pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceUpdate {
    Theme(ThemeMode),
    Language(String),
    Currency(CurrencyCode),
    Notifications(bool),
}

impl Preferences {
    /// Apply a single-field update in place.
    pub fn apply(&mut self, update: PreferenceUpdate) {
        match update {
            PreferenceUpdate::Theme(theme) => self.theme = theme,
            PreferenceUpdate::Language(language) => self.language = language,
            PreferenceUpdate::Currency(currency) => self.currency = currency,
            PreferenceUpdate::Notifications(on) => self.notifications = on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_matches_documented_values() {
        let prefs = Preferences::default();
        assert_eq!(prefs.theme, ThemeMode::Light);
        assert_eq!(prefs.language, "en");
        assert_eq!(prefs.currency, CurrencyCode::USD);
        assert!(prefs.notifications);
    }

    #[test]
    fn apply_touches_only_the_named_field() {
        let mut prefs = Preferences::default();
        prefs.apply(PreferenceUpdate::Currency(CurrencyCode::EUR));
        assert_eq!(prefs.currency, CurrencyCode::EUR);
        assert_eq!(prefs.language, "en");
        assert_eq!(prefs.theme, ThemeMode::Light);
    }
}
