//! Product summary as delivered by the remote catalog.

use serde::{Deserialize, Serialize};

use seasons_core::{Price, ProductId};

/// The slice of a remote product record that the local collections care about.
///
/// Cart, wishlist, and recent-product entries denormalize from this shape at
/// insertion time; they never hold a reference back to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Remote product row id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Stock keeping unit.
    pub sku: String,
    /// Retail price; the only price cart totals use.
    pub retail_price: Price,
    /// Wholesale base price, present for business-side listings.
    #[serde(default)]
    pub wholesale_base_price: Option<Price>,
    /// Image URLs, primary first.
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductSummary {
    /// The primary image, if the listing has any.
    #[must_use]
    pub fn first_image(&self) -> Option<String> {
        self.images.first().cloned()
    }
}
