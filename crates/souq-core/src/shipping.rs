//! # Shipping & Pricing
//!
//! Derived cart figures: item count, subtotal, free-shipping progress and
//! the checkout price breakdown.
//!
//! ## Free-Shipping Progress Bar
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Subtotal 250.00                threshold 500.00                        │
//! │  ██████████████████████░░░░░░░░░░░░░░░░░░░░░░░░  50%                    │
//! │  Add 250.00 more for free shipping                                      │
//! │                                                                         │
//! │  progress  = min(100%, subtotal / threshold)                            │
//! │  remaining = max(0, threshold - subtotal)                               │
//! │  threshold unset or ≤ 0 → already satisfied, never divides by zero      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartItem;
use crate::money::{Money, Rate};
use crate::settings::DeliveryDate;

/// 100% in basis points.
const FULL_BPS: u32 = 10_000;

// =============================================================================
// Cart Derivations
// =============================================================================

/// Σ quantity. Zero for an empty cart.
pub fn total_items(items: &[CartItem]) -> i64 {
    items.iter().map(|i| i.quantity).sum()
}

/// Σ price × quantity, exact in minor units.
pub fn subtotal(items: &[CartItem]) -> Money {
    items.iter().map(CartItem::line_total).sum()
}

// =============================================================================
// Shipping Progress
// =============================================================================

/// Free-shipping progress in basis points, clamped to 0..=10000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingProgress(u32);

impl ShippingProgress {
    pub const fn full() -> Self {
        ShippingProgress(FULL_BPS)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Whole percent, rounded down (for the bar width).
    #[inline]
    pub const fn percent(&self) -> u32 {
        self.0 / 100
    }

    #[inline]
    pub const fn is_complete(&self) -> bool {
        self.0 >= FULL_BPS
    }
}

/// The threshold, if configured and positive.
fn active_threshold(threshold: Option<Money>) -> Option<Money> {
    threshold.filter(|t| t.is_positive())
}

/// `min(100%, 100 × subtotal / threshold)`.
///
/// An unset or non-positive threshold counts as already satisfied.
pub fn shipping_progress(subtotal: Money, threshold: Option<Money>) -> ShippingProgress {
    let Some(threshold) = active_threshold(threshold) else {
        return ShippingProgress::full();
    };

    let subtotal = subtotal.minor().max(0) as i128;
    let bps = (subtotal * FULL_BPS as i128 / threshold.minor() as i128).min(FULL_BPS as i128);
    ShippingProgress(bps as u32)
}

/// `max(0, threshold − subtotal)`; zero when no threshold is configured.
pub fn remaining_for_free_shipping(subtotal: Money, threshold: Option<Money>) -> Money {
    match active_threshold(threshold) {
        Some(threshold) if threshold > subtotal => threshold - subtotal,
        _ => Money::zero(),
    }
}

/// Everything the cart page needs to draw the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FreeShippingStatus {
    pub threshold: Option<Money>,
    pub remaining: Money,
    pub progress: ShippingProgress,
    pub qualifies: bool,
}

impl FreeShippingStatus {
    pub fn new(subtotal: Money, threshold: Option<Money>) -> Self {
        let remaining = remaining_for_free_shipping(subtotal, threshold);
        FreeShippingStatus {
            threshold: active_threshold(threshold),
            remaining,
            progress: shipping_progress(subtotal, threshold),
            qualifies: remaining.is_zero(),
        }
    }
}

// =============================================================================
// Order Pricing
// =============================================================================

/// Checkout price breakdown.
///
/// ```text
/// items_price     Σ price × quantity
/// shipping_price  0 if the option offers free shipping (min > 0) and
///                 items_price ≥ delivery.free_shipping_min_price,
///                 else delivery.shipping_price
/// tax_price       items_price × tax rate (half up)
/// total_price     items + shipping + tax
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricing {
    pub items_price: Money,
    pub shipping_price: Money,
    pub tax_price: Money,
    pub total_price: Money,
}

/// Prices an order for the chosen delivery option.
///
/// With no delivery option chosen yet, shipping is zero.
pub fn price_order(items: &[CartItem], delivery: Option<&DeliveryDate>, tax: Rate) -> OrderPricing {
    let items_price = subtotal(items);

    let shipping_price = match delivery {
        Some(d) if d.ships_free(items_price) => Money::zero(),
        Some(d) => d.shipping_price,
        None => Money::zero(),
    };

    let tax_price = items_price.apply_rate(tax);

    OrderPricing {
        items_price,
        shipping_price,
        tax_price,
        total_price: items_price + shipping_price + tax_price,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, quantity: i64) -> CartItem {
        CartItem {
            client_id: format!("c-{price}-{quantity}"),
            product: format!("p-{price}"),
            name: "Item".to_string(),
            slug: "item".to_string(),
            category: "Misc".to_string(),
            image: String::new(),
            price: Money::from_minor(price),
            quantity,
            count_in_stock: 10,
            color: None,
            size: None,
        }
    }

    fn delivery(shipping: i64, free_min: i64) -> DeliveryDate {
        DeliveryDate {
            name: "Next 3 Days".to_string(),
            days_to_deliver: 3,
            shipping_price: Money::from_minor(shipping),
            free_shipping_min_price: Money::from_minor(free_min),
        }
    }

    #[test]
    fn test_example_cart() {
        // [{price:100, qty:2}, {price:50, qty:1}], threshold 500
        let items = vec![item(10_000, 2), item(5_000, 1)];
        let threshold = Some(Money::from_minor(50_000));

        let sub = subtotal(&items);
        assert_eq!(sub.minor(), 25_000);
        assert_eq!(total_items(&items), 3);
        assert_eq!(remaining_for_free_shipping(sub, threshold).minor(), 25_000);
        assert_eq!(shipping_progress(sub, threshold).percent(), 50);
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(total_items(&[]), 0);
        assert!(subtotal(&[]).is_zero());
    }

    #[test]
    fn test_progress_is_clamped() {
        let threshold = Some(Money::from_minor(1000));
        for minor in [0, 1, 333, 999, 1000, 1001, 1_000_000] {
            let p = shipping_progress(Money::from_minor(minor), threshold);
            assert!(p.bps() <= 10_000, "{minor} -> {}", p.bps());
        }
        assert_eq!(shipping_progress(Money::from_minor(333), threshold).bps(), 3330);
        assert!(shipping_progress(Money::from_minor(5000), threshold).is_complete());
        assert_eq!(shipping_progress(Money::from_minor(-50), threshold).bps(), 0);
    }

    #[test]
    fn test_zero_or_unset_threshold_is_satisfied() {
        let sub = Money::from_minor(1234);
        assert_eq!(shipping_progress(sub, None), ShippingProgress::full());
        assert_eq!(shipping_progress(sub, Some(Money::zero())), ShippingProgress::full());
        assert!(remaining_for_free_shipping(sub, None).is_zero());
        assert!(remaining_for_free_shipping(sub, Some(Money::zero())).is_zero());

        let status = FreeShippingStatus::new(sub, Some(Money::zero()));
        assert!(status.qualifies);
        assert_eq!(status.threshold, None);
    }

    #[test]
    fn test_remaining_is_zero_exactly_at_threshold() {
        let threshold = Some(Money::from_minor(50_000));
        let mut previous = i64::MAX;
        for minor in (0..=60_000).step_by(2_500) {
            let remaining = remaining_for_free_shipping(Money::from_minor(minor), threshold);
            assert_eq!(remaining.is_zero(), minor >= 50_000);
            assert!(remaining.minor() <= previous);
            previous = remaining.minor();
        }
    }

    #[test]
    fn test_free_shipping_status() {
        let status = FreeShippingStatus::new(Money::from_minor(40_000), Some(Money::from_minor(50_000)));
        assert_eq!(status.remaining.minor(), 10_000);
        assert_eq!(status.progress.percent(), 80);
        assert!(!status.qualifies);
    }

    #[test]
    fn test_price_order_charges_shipping_below_minimum() {
        let items = vec![item(10_000, 2), item(5_000, 1)];
        let pricing = price_order(&items, Some(&delivery(1_500, 50_000)), Rate::from_bps(1500));

        assert_eq!(pricing.items_price.minor(), 25_000);
        assert_eq!(pricing.shipping_price.minor(), 1_500);
        assert_eq!(pricing.tax_price.minor(), 3_750);
        assert_eq!(pricing.total_price.minor(), 30_250);
    }

    #[test]
    fn test_price_order_free_shipping_at_minimum() {
        let items = vec![item(25_000, 2)];
        let pricing = price_order(&items, Some(&delivery(1_500, 50_000)), Rate::zero());

        assert!(pricing.shipping_price.is_zero());
        assert_eq!(pricing.total_price.minor(), 50_000);
    }

    #[test]
    fn test_price_order_option_without_free_shipping() {
        let items = vec![item(100_000, 1)];
        let pricing = price_order(&items, Some(&delivery(1_290, 0)), Rate::zero());

        assert_eq!(pricing.shipping_price.minor(), 1_290);
    }

    #[test]
    fn test_price_order_without_delivery() {
        let pricing = price_order(&[item(1000, 1)], None, Rate::zero());
        assert!(pricing.shipping_price.is_zero());
        assert_eq!(pricing.total_price.minor(), 1000);
    }
}
