//! # Cart
//!
//! The shopping cart and its line items.
//!
//! ## Derived State
//! `items_price` is never independent truth. Every `&mut self` method ends
//! with a recalculation, so a caller can never observe items and totals
//! that disagree.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Shopper Action            Method                  Cart Change          │
//! │  ──────────────            ──────                  ───────────          │
//! │  Add to cart ────────────► add_item() ──────────► push / merge qty     │
//! │  [+] button ─────────────► increment() ─────────► qty + 1 (≤ stock)    │
//! │  [-] button ─────────────► decrement() ─────────► qty - 1 (≥ 1)        │
//! │  Quantity select ────────► set_quantity() ──────► qty = n              │
//! │  Delete ─────────────────► remove_item() ───────► items.remove(i)      │
//! │  Fresh stock ────────────► reconcile_stock() ───► clamp / drop lines   │
//! │                                                                         │
//! │  Every row ends with items_price = Σ price × quantity                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::shipping;
use crate::types::Product;
use crate::validation::{validate_cart_size, validate_quantity};
use crate::MAX_CART_ITEMS;

// =============================================================================
// Cart Item
// =============================================================================

/// One product/variant/quantity line in the cart.
///
/// ## Design Notes
/// - `client_id`: opaque local identifier, stable across quantity changes
/// - `product`: reference to the catalog product
/// - `price`: frozen unit price at the time the line was added
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub client_id: String,
    pub product: String,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub image: String,
    pub price: Money,
    pub quantity: i64,
    pub count_in_stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CartItem {
    /// Creates a new line from a catalog product.
    pub fn from_product(
        product: &Product,
        quantity: i64,
        color: Option<String>,
        size: Option<String>,
    ) -> Self {
        CartItem {
            client_id: Uuid::new_v4().to_string(),
            product: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            category: product.category.clone(),
            image: product.thumbnail().to_string(),
            price: product.price,
            quantity,
            count_in_stock: product.count_in_stock,
            color,
            size,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// Whether the [+] control is enabled.
    pub fn can_increment(&self) -> bool {
        self.quantity < self.count_in_stock
    }

    /// Whether the [-] control is enabled.
    pub fn can_decrement(&self) -> bool {
        self.quantity > 1
    }

    /// Values offered by the quantity selector.
    pub fn quantity_options(&self) -> std::ops::RangeInclusive<i64> {
        1..=self.count_in_stock.max(1)
    }

    /// Same product in the same variant.
    pub fn is_same_line(&self, other: &CartItem) -> bool {
        self.product == other.product && self.color == other.color && self.size == other.size
    }
}

// =============================================================================
// Stock Adjustment
// =============================================================================

/// What `Cart::reconcile_stock` changed on a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum StockAdjustment {
    /// Only the stock figure moved; quantity still fits.
    StockUpdated { client_id: String, count_in_stock: i64 },
    /// Quantity was lowered to the new stock.
    Clamped { client_id: String, from: i64, to: i64 },
    /// Stock hit zero and the line was dropped.
    Removed { client_id: String, name: String },
}

// =============================================================================
// Cart View
// =============================================================================

/// Which branch the cart page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartView<'a> {
    /// "Your cart is empty" with a continue-shopping link.
    Empty,
    /// Line items table plus the summary card.
    Items(&'a [CartItem]),
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - `items_price == Σ price × quantity` after every call
/// - `1 ≤ quantity ≤ count_in_stock` for every line with stock
/// - One line per (product, color, size)
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredCart")]
pub struct Cart {
    items: Vec<CartItem>,
    items_price: Money,
}

/// On-disk shape. Any stored `itemsPrice` is ignored and recomputed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCart {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl From<StoredCart> for Cart {
    fn from(stored: StoredCart) -> Self {
        Cart::from_items(stored.items)
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Builds a cart from previously persisted lines.
    ///
    /// Stored lines are not trusted:
    /// - zero-quantity and out-of-stock lines are dropped
    /// - repeated lines for one variant are merged into the first
    /// - quantities above stock are clamped
    /// - lines past `MAX_CART_ITEMS` are dropped
    ///
    /// The total is recomputed.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());

        for item in items {
            if item.quantity <= 0 || item.count_in_stock <= 0 {
                continue;
            }
            match merged.iter_mut().find(|m| m.is_same_line(&item)) {
                Some(existing) => {
                    existing.quantity += item.quantity;
                    existing.count_in_stock = item.count_in_stock;
                }
                None => merged.push(item),
            }
        }

        merged.truncate(MAX_CART_ITEMS);
        for item in &mut merged {
            item.quantity = item.quantity.min(item.count_in_stock);
        }

        let mut cart = Cart {
            items: merged,
            items_price: Money::zero(),
        };
        cart.recalculate();
        cart
    }

    /// Adds `quantity` of a catalog product in the chosen variant.
    ///
    /// ## Errors
    /// - `NotPublished` when the product is hidden from the storefront
    /// - everything [`Cart::add_item`] returns
    pub fn add_product(
        &mut self,
        product: &Product,
        quantity: i64,
        color: Option<String>,
        size: Option<String>,
    ) -> CoreResult<String> {
        if !product.is_published {
            return Err(CoreError::NotPublished(product.name.clone()));
        }
        self.add_item(CartItem::from_product(product, quantity, color, size))
    }

    /// Adds a line or merges into an existing line for the same variant.
    ///
    /// ## Returns
    /// The `client_id` of the line that now holds the quantity.
    ///
    /// ## Errors
    /// - `OutOfStock` when the product has no stock
    /// - `InsufficientStock` when the resulting quantity exceeds stock
    /// - `CartTooLarge` when a new line would exceed `MAX_CART_ITEMS`
    pub fn add_item(&mut self, item: CartItem) -> CoreResult<String> {
        if item.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if item.count_in_stock <= 0 {
            return Err(CoreError::OutOfStock(item.name));
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.is_same_line(&item)) {
            let requested = existing.quantity + item.quantity;
            if requested > item.count_in_stock {
                return Err(CoreError::InsufficientStock {
                    name: item.name,
                    available: item.count_in_stock,
                    requested,
                });
            }
            existing.quantity = requested;
            existing.count_in_stock = item.count_in_stock;
            let client_id = existing.client_id.clone();
            self.recalculate();
            return Ok(client_id);
        }

        if item.quantity > item.count_in_stock {
            return Err(CoreError::InsufficientStock {
                name: item.name,
                available: item.count_in_stock,
                requested: item.quantity,
            });
        }

        validate_cart_size(self.items.len())
            .map_err(|_| CoreError::CartTooLarge { max: MAX_CART_ITEMS })?;

        let client_id = item.client_id.clone();
        self.items.push(item);
        self.recalculate();
        Ok(client_id)
    }

    /// Increases a line by one.
    ///
    /// Returns `Ok(false)` without touching state when the line is already
    /// at `count_in_stock`.
    pub fn increment(&mut self, client_id: &str) -> CoreResult<bool> {
        let item = self.find_mut(client_id)?;
        if !item.can_increment() {
            return Ok(false);
        }
        item.quantity += 1;
        self.recalculate();
        Ok(true)
    }

    /// Decreases a line by one.
    ///
    /// Returns `Ok(false)` at quantity 1; deleting is `remove_item`.
    pub fn decrement(&mut self, client_id: &str) -> CoreResult<bool> {
        let item = self.find_mut(client_id)?;
        if !item.can_decrement() {
            return Ok(false);
        }
        item.quantity -= 1;
        self.recalculate();
        Ok(true)
    }

    /// Sets a line's quantity from the quantity selector.
    ///
    /// Returns `Ok(false)` when the quantity is unchanged.
    pub fn set_quantity(&mut self, client_id: &str, quantity: i64) -> CoreResult<bool> {
        let item = self.find_mut(client_id)?;
        validate_quantity(quantity, item.count_in_stock)?;
        if item.quantity == quantity {
            return Ok(false);
        }
        item.quantity = quantity;
        self.recalculate();
        Ok(true)
    }

    /// Removes a line by client id.
    pub fn remove_item(&mut self, client_id: &str) -> CoreResult<CartItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.client_id == client_id)
            .ok_or_else(|| CoreError::ItemNotFound(client_id.to_string()))?;

        let removed = self.items.remove(index);
        self.recalculate();
        Ok(removed)
    }

    /// Clears all lines. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.clear();
        self.recalculate();
        true
    }

    /// Applies fresh stock for a product to every matching line.
    ///
    /// Quantities above the new stock are clamped down; lines whose stock
    /// reached zero are removed. An empty result means nothing changed.
    pub fn reconcile_stock(&mut self, product: &str, count_in_stock: i64) -> Vec<StockAdjustment> {
        let mut adjustments = Vec::new();

        self.items.retain_mut(|item| {
            if item.product != product {
                return true;
            }

            if count_in_stock <= 0 {
                adjustments.push(StockAdjustment::Removed {
                    client_id: item.client_id.clone(),
                    name: item.name.clone(),
                });
                return false;
            }

            if item.quantity > count_in_stock {
                adjustments.push(StockAdjustment::Clamped {
                    client_id: item.client_id.clone(),
                    from: item.quantity,
                    to: count_in_stock,
                });
                item.quantity = count_in_stock;
            } else if item.count_in_stock != count_in_stock {
                adjustments.push(StockAdjustment::StockUpdated {
                    client_id: item.client_id.clone(),
                    count_in_stock,
                });
            }
            item.count_in_stock = count_in_stock;
            true
        });

        if !adjustments.is_empty() {
            self.recalculate();
        }
        adjustments
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, client_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.client_id == client_id)
    }

    /// Σ price × quantity, kept in step with `items`.
    pub fn items_price(&self) -> Money {
        self.items_price
    }

    /// Σ quantity, for the header badge.
    pub fn total_items(&self) -> i64 {
        shipping::total_items(&self.items)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn view(&self) -> CartView<'_> {
        if self.items.is_empty() {
            CartView::Empty
        } else {
            CartView::Items(&self.items)
        }
    }

    fn find_mut(&mut self, client_id: &str) -> CoreResult<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|i| i.client_id == client_id)
            .ok_or_else(|| CoreError::ItemNotFound(client_id.to_string()))
    }

    fn recalculate(&mut self) {
        self.items_price = shipping::subtotal(&self.items);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
