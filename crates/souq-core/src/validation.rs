//! # Validation Module
//!
//! Field validators shared by the cart and the settings forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (view)                                                   │
//! │  └── Immediate inline feedback per field                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Business rule validation (stock bounds, code formats, ...)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  └── NOT NULL / CHECK constraints                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use souq_core::validation::{validate_currency_code, validate_quantity};
//!
//! assert!(validate_currency_code("SAR").is_ok());
//! assert!(validate_quantity(2, 3).is_ok());
//! assert!(validate_quantity(4, 3).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::{Money, Rate};
use crate::MAX_CART_ITEMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field with a maximum length.
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an ISO 4217 currency code (`SAR`, `USD`).
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must be three uppercase letters".to_string(),
        });
    }

    Ok(())
}

/// Validates a language code (`ar`, `en`, `en-US`).
pub fn validate_language_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    let mut parts = code.splitn(2, '-');
    let language = parts.next().unwrap_or_default();
    let region = parts.next();

    let language_ok = language.len() == 2 && language.chars().all(|c| c.is_ascii_lowercase());
    let region_ok = region.map_or(true, |r| {
        r.len() == 2 && r.chars().all(|c| c.is_ascii_uppercase())
    });

    if !language_ok || !region_ok {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must look like 'ar' or 'en-US'".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity against the stock on hand.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `count_in_stock`
///
/// ```text
/// Quantity selector: [1] [2] [3]   (count_in_stock = 3)
///       │
///       ▼
/// validate_quantity(q, 3) ← THIS FUNCTION
///       │
///       ├── q <= 0? → "quantity must be positive"
///       ├── q > 3?  → "quantity must be between 1 and 3"
///       └── OK
/// ```
pub fn validate_quantity(qty: i64, count_in_stock: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > count_in_stock {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: count_in_stock.max(0),
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free shipping option, free gift).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a basis-point rate: 0% to 100%.
pub fn validate_rate(field: &str, rate: Rate) -> ValidationResult<()> {
    if rate.bps() > 10000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a catalog page size: 1 to 100 items.
pub fn validate_page_size(page_size: u32) -> ValidationResult<()> {
    if !(1..=100).contains(&page_size) {
        return Err(ValidationError::OutOfRange {
            field: "page size".to_string(),
            min: 1,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of distinct lines) before adding one more.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Souq", 50).is_ok());
        assert!(validate_required("name", "   ", 50).is_err());
        assert!(validate_required("name", &"ع".repeat(51), 50).is_err());
        assert!(validate_required("name", &"ع".repeat(50), 50).is_ok());
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("SAR").is_ok());
        assert!(validate_currency_code("usd").is_err());
        assert!(validate_currency_code("EURO").is_err());
        assert!(matches!(
            validate_currency_code(""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_language_code() {
        assert!(validate_language_code("ar").is_ok());
        assert!(validate_language_code("en-US").is_ok());
        assert!(validate_language_code("EN").is_err());
        assert!(validate_language_code("en-us").is_err());
        assert!(validate_language_code("arabic").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1, 3).is_ok());
        assert!(validate_quantity(3, 3).is_ok());

        assert!(validate_quantity(0, 3).is_err());
        assert!(validate_quantity(-1, 3).is_err());
        assert_eq!(
            validate_quantity(4, 3),
            Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: 3,
            })
        );
    }

    #[test]
    fn test_validate_price_and_rate() {
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_minor(-1)).is_err());
        assert!(validate_rate("commission", Rate::from_bps(10000)).is_ok());
        assert!(validate_rate("commission", Rate::from_bps(10001)).is_err());
    }

    #[test]
    fn test_validate_page_size() {
        assert!(validate_page_size(9).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(101).is_err());
    }
}
