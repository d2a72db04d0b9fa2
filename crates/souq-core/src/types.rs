//! # Domain Types
//!
//! Catalog types the cart is built from.
//!
//! ## Dual-Key Identity Pattern
//! A product has:
//! - `id`: immutable document id, used as the cart line's product reference
//! - `slug`: human-readable, used for product page links

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// The slice of a catalog product the storefront needs to add it to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category: String,
    /// Image URLs; the first one is the cart thumbnail.
    pub images: Vec<String>,
    /// Unit price in minor units of the base currency.
    pub price: Money,
    pub count_in_stock: i64,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub is_published: bool,
}

impl Product {
    /// The image shown next to the cart line.
    pub fn thumbnail(&self) -> &str {
        self.images.first().map(String::as_str).unwrap_or_default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64) -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Oud Perfume".to_string(),
            slug: "oud-perfume".to_string(),
            category: "Perfumes".to_string(),
            images: vec!["/images/oud-1.jpg".to_string(), "/images/oud-2.jpg".to_string()],
            price: Money::from_minor(10_000),
            count_in_stock: stock,
            colors: vec![],
            sizes: vec![],
            is_published: true,
        }
    }

    #[test]
    fn test_thumbnail() {
        assert_eq!(product(1).thumbnail(), "/images/oud-1.jpg");
        let mut p = product(1);
        p.images.clear();
        assert_eq!(p.thumbnail(), "");
    }
}
