//! Recently-viewed products and search history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seasons_core::ProductId;

use super::product::ProductSummary;

/// One recently-viewed product.
///
/// The collection is ordered most-recent-first, deduplicated by id, and
/// capped; see [`crate::storage::RecentProductsStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentProductEntry {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub image: Option<String>,
    pub viewed_at: DateTime<Utc>,
}

impl RecentProductEntry {
    /// Build an entry from a product summary.
    #[must_use]
    pub fn from_product(product: &ProductSummary) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            image: product.first_image(),
            viewed_at: Utc::now(),
        }
    }
}

/// One past search.
///
/// The term keeps the casing the user typed; deduplication across the
/// collection is case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub term: String,
    pub searched_at: DateTime<Utc>,
}

impl SearchHistoryEntry {
    /// Record a search performed now.
    #[must_use]
    pub fn now(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            searched_at: Utc::now(),
        }
    }
}
