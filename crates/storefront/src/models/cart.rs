//! Cart line records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seasons_core::{Price, ProductId};

use super::product::ProductSummary;

/// One line in the locally stored cart.
///
/// Keyed by product id; the cart holds at most one line per product and
/// accumulates quantity on repeated adds. `quantity` is always >= 1 - setting
/// it to zero removes the line instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    /// Retail price captured at add time.
    pub price: Price,
    /// Wholesale price captured at add time, when the listing had one.
    #[serde(default)]
    pub wholesale_price: Option<Price>,
    /// Primary product image, if any.
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Build a fresh line from a product summary.
    #[must_use]
    pub fn from_product(product: &ProductSummary, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            price: product.retail_price,
            wholesale_price: product.wholesale_base_price,
            image: product.first_image(),
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Retail subtotal for this line.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}
