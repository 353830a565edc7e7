//! Wishlist entry records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seasons_core::{Price, ProductId};

use super::product::ProductSummary;

/// One saved product in the locally stored wishlist.
///
/// Set semantics keyed by product id: adding an already-present product is a
/// no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WishlistEntry {
    /// Build an entry from a product summary.
    #[must_use]
    pub fn from_product(product: &ProductSummary) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            price: product.retail_price,
            image: product.first_image(),
            added_at: Utc::now(),
        }
    }
}
