//! # Cart State
//!
//! The process-wide cart store and the summary the cart page renders.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  View Action              CartAction                Cart Change         │
//! │  ───────────              ──────────                ───────────         │
//! │                                                                         │
//! │  Add to Cart ───────────► AddProduct{..} ─────────► published? merge    │
//! │  Restore a line ────────► Add(item) ──────────────► merge or push       │
//! │  [+] ───────────────────► Increment(id) ──────────► qty + 1 (≤ stock)   │
//! │  [-] ───────────────────► Decrement(id) ──────────► qty - 1 (≥ 1)       │
//! │  Quantity selector ─────► SetQuantity{id, q} ─────► qty = q             │
//! │  Delete ────────────────► Remove(id) ─────────────► line removed        │
//! │  Place order ───────────► Clear ──────────────────► items.clear()       │
//! │  Fresh stock figures ───► ReconcileStock{..} ─────► clamp / remove      │
//! │                                                                         │
//! │  items_price is recomputed inside each change; a listener never sees   │
//! │  a stale total.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use souq_core::shipping::{self, FreeShippingStatus, OrderPricing};
use souq_core::{Cart, CartItem, CartView, CoreError, DeliveryDate, Money, Product, Rate};
use tracing::debug;
use ts_rs::TS;

use crate::store::{Reducer, Store};

/// An edit to the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    AddProduct {
        product: Product,
        quantity: i64,
        color: Option<String>,
        size: Option<String>,
    },
    Add(CartItem),
    Increment(String),
    Decrement(String),
    SetQuantity { client_id: String, quantity: i64 },
    Remove(String),
    Clear,
    ReconcileStock { product: String, count_in_stock: i64 },
}

impl Reducer for Cart {
    type Action = CartAction;
    type Error = CoreError;
    const NAME: &'static str = "cart";

    fn reduce(&mut self, action: CartAction) -> Result<bool, CoreError> {
        match action {
            CartAction::AddProduct {
                product,
                quantity,
                color,
                size,
            } => {
                let client_id = self.add_product(&product, quantity, color, size)?;
                debug!(client_id = %client_id, product = %product.id, "Added to cart");
                Ok(true)
            }
            CartAction::Add(item) => {
                let client_id = self.add_item(item)?;
                debug!(client_id = %client_id, "Added to cart");
                Ok(true)
            }
            CartAction::Increment(client_id) => self.increment(&client_id),
            CartAction::Decrement(client_id) => self.decrement(&client_id),
            CartAction::SetQuantity {
                client_id,
                quantity,
            } => self.set_quantity(&client_id, quantity),
            CartAction::Remove(client_id) => {
                let removed = self.remove_item(&client_id)?;
                debug!(client_id = %client_id, name = %removed.name, "Removed from cart");
                Ok(true)
            }
            CartAction::Clear => Ok(self.clear()),
            CartAction::ReconcileStock {
                product,
                count_in_stock,
            } => {
                let adjustments = self.reconcile_stock(&product, count_in_stock);
                for adjustment in &adjustments {
                    debug!(product = %product, ?adjustment, "Stock reconciled");
                }
                Ok(!adjustments.is_empty())
            }
        }
    }
}

/// The shopper's cart.
pub type CartStore = Store<Cart>;

// =============================================================================
// Cart Summary
// =============================================================================

/// Everything the cart page and the header badge render from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub total_items: i64,
    pub items_price: Money,
    pub free_shipping: FreeShippingStatus,
}

impl CartSummary {
    /// Summarizes `cart` against the store's free-shipping threshold.
    pub fn new(cart: &Cart, threshold: Option<Money>) -> Self {
        CartSummary {
            items: cart.items().to_vec(),
            total_items: cart.total_items(),
            items_price: cart.items_price(),
            free_shipping: FreeShippingStatus::new(cart.items_price(), threshold),
        }
    }

    /// Selects the "your cart is empty" branch.
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
}

/// Checkout breakdown for the current cart.
pub fn price_cart(cart: &Cart, delivery: Option<&DeliveryDate>, tax: Rate) -> OrderPricing {
    shipping::price_order(cart.items(), delivery, tax)
}

// =============================================================================
// Unit Tests
// =============================================================================
