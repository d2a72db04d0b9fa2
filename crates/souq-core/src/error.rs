//! # Error Types
//!
//! Domain-specific error types for souq-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  souq-core errors (this file)                                           │
//! │  ├── CoreError        - Cart and domain rule failures                   │
//! │  ├── ValidationError  - A single field failed validation                │
//! │  └── FieldErrors      - Every failing field of a form                   │
//! │                                                                         │
//! │  souq-db errors (separate crate)                                        │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  souq-state errors                                                      │
//! │  └── StateError       - What a view sees (toast / inline messages)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and business rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Merging or setting a quantity would exceed the stock on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 2) with 3 already in cart, stock 4
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Abaya", available: 4, requested: 5 }
    ///      │
    ///      ▼
    /// Toast: "Not enough items in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// The product has no stock at all.
    #[error("{0} is out of stock")]
    OutOfStock(String),

    /// The product is hidden from the storefront.
    #[error("{0} is not available")]
    NotPublished(String),

    /// No cart line with this client id.
    #[error("Cart item not found: {0}")]
    ItemNotFound(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., lowercase currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., two currencies with the same code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Field Errors
// =============================================================================

/// All validation failures of a form, keyed by field path.
///
/// Paths follow the form layout, e.g. `currencies.entries[1].code` or
/// `currencies.default`, so a view can render each message inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(String, ValidationError)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, error: ValidationError) {
        self.errors.push((path.into(), error));
    }

    /// Records the error of `result` (if any) under `path`.
    pub fn check(&mut self, path: impl Into<String>, result: Result<(), ValidationError>) {
        if let Err(error) = result {
            self.push(path, error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the first error recorded for `path`.
    pub fn get(&self, path: &str) -> Option<&ValidationError> {
        self.errors
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, error)| error)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationError)> {
        self.errors.iter().map(|(p, e)| (p.as_str(), e))
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, error)) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{path}: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
