//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A cart subtotal drifting by a halala after a few quantity clicks is   │
//! │  exactly the bug the cart page must never show.                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    SAR 12.50 is stored as 1250 halalas                                  │
//! │    Σ price × quantity is exact integer arithmetic                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use souq_core::money::Money;
//!
//! let price = Money::from_minor(1250); // 12.50
//! let line_total = price * 3;          // 37.50
//! assert_eq!(line_total.minor(), 3750);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of the store's base currency.
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction (`threshold - subtotal`) may go negative
///   before it is clamped
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ```text
/// CartItem.price ──► × quantity ──► line total ──► Σ ──► Cart.items_price
///                                                        │
///                          free-shipping threshold ◄─────┤
///                                                        ▼
///                                     OrderPricing.total_price
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (halalas, cents).
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use souq_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).minor(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use souq_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(10_000); // 100.00
    /// assert_eq!(unit_price.multiply_quantity(2).minor(), 20_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a basis-point rate (tax, commission) to this amount.
    ///
    /// Integer math: `(amount * bps + 5000) / 10000`, the +5000 rounds
    /// half up to the minor unit.
    ///
    /// ## Example
    /// ```rust
    /// use souq_core::money::{Money, Rate};
    ///
    /// let items = Money::from_minor(25_000); // 250.00
    /// let vat = items.apply_rate(Rate::from_bps(1500)); // 15%
    /// assert_eq!(vat.minor(), 3750);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // i128 prevents overflow on large amounts
        let amount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(amount as i64)
    }

    /// Converts this base-currency amount into a display currency.
    ///
    /// The product is rounded half away from zero to the minor unit.
    /// Returns `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use souq_core::money::{ExchangeRate, Money};
    ///
    /// let usd = Money::from_minor(10_000); // 100.00 USD
    /// let rate = ExchangeRate::new(Decimal::new(375, 2)); // 3.75
    /// assert_eq!(usd.convert(rate).map(|m| m.minor()), Some(37_500));
    /// ```
    pub fn convert(&self, rate: ExchangeRate) -> Option<Money> {
        Decimal::from(self.0)
            .checked_mul(rate.value())?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Money)
    }

    /// Formats with a currency symbol, e.g. `"SAR 12.50"` or `"$12.50"`.
    ///
    /// Alphabetic symbols get a separating space, glyph symbols do not.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let sep = if symbol.chars().all(char::is_alphabetic) && !symbol.is_empty() {
            " "
        } else {
            ""
        };
        format!(
            "{sign}{symbol}{sep}{}.{:02}",
            self.major().abs(),
            self.minor_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering without a symbol (`12.50`).
///
/// ## Note
/// Views format through [`crate::settings::Currency::format`] so the
/// selected currency's symbol and rate apply.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Rate
// =============================================================================

/// A ratio in basis points (bps).
///
/// 1 basis point = 0.01%, so 1500 bps = 15% (Saudi VAT).
/// Used for tax and payment-method commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round().max(0.0) as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// Exact multiplier from the base currency into a display currency.
///
/// Serialized as a decimal string (`"3.75"`) so no precision is lost in
/// the stored settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    pub const fn new(value: Decimal) -> Self {
        ExchangeRate(value)
    }

    /// The identity rate (the base currency itself).
    pub const fn one() -> Self {
        ExchangeRate(Decimal::ONE)
    }

    pub const fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        ExchangeRate::one()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1099).to_string(), "10.99");
        assert_eq!(Money::from_minor(500).to_string(), "5.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Money::from_minor(1250).format_with("SAR"), "SAR 12.50");
        assert_eq!(Money::from_minor(1250).format_with("$"), "$12.50");
        assert_eq!(Money::from_minor(-1250).format_with("$"), "-$12.50");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 2000);
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // 10.00 at 8.25% = 0.825 → 0.83
        let tax = Money::from_minor(1000).apply_rate(Rate::from_bps(825));
        assert_eq!(tax.minor(), 83);
    }

    #[test]
    fn test_rate_from_percentage() {
        assert_eq!(Rate::from_percentage(15.0).bps(), 1500);
        assert_eq!(Rate::from_percentage(8.25).bps(), 825);
        assert_eq!(Rate::from_percentage(-1.0).bps(), 0);
    }

    #[test]
    fn test_convert_is_exact() {
        let rate = ExchangeRate::new(Decimal::new(375, 2));
        assert_eq!(
            Money::from_minor(10_000).convert(rate),
            Some(Money::from_minor(37_500))
        );
        // 3.33 × 3.75 = 12.4875 → 12.49
        assert_eq!(
            Money::from_minor(333).convert(rate),
            Some(Money::from_minor(1249))
        );
        assert_eq!(
            Money::from_minor(42).convert(ExchangeRate::one()),
            Some(Money::from_minor(42))
        );
    }

    #[test]
    fn test_exchange_rate_serializes_as_string() {
        let rate = ExchangeRate::new(Decimal::new(375, 2));
        let json = serde_json::to_string(&rate).unwrap();
        assert_eq!(json, "\"3.75\"");
        let back: ExchangeRate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rate);
    }
}
