//! # souq-core: Pure Business Logic for the Souq Storefront
//!
//! This crate holds the cart math and the settings invariants of the
//! storefront as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Souq Architecture                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Storefront / Admin views (web)                     │   │
//! │  │    Cart page ──► Checkout ──► Settings forms ──► Header badge   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ subscribe / dispatch                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    souq-state (stores)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ souq-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  money   │ │   cart   │ │ shipping │ │    settings      │  │   │
//! │  │   │  Money   │ │   Cart   │ │ progress │ │ SelectableList   │  │   │
//! │  │   │  Rate    │ │ CartItem │ │ pricing  │ │ default invariant│  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    souq-db (Database Layer)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in minor units, rates, exchange-rate conversion
//! - [`types`] - Catalog product snapshot
//! - [`cart`] - Cart and line items with derived totals
//! - [`shipping`] - Free-shipping progress and order pricing
//! - [`settings`] - Store settings and the default-selection invariant
//! - [`locale`] - Locale direction, theme, shopper preferences
//! - [`validation`] - Field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use souq_core::money::Money;
//! use souq_core::shipping::{remaining_for_free_shipping, shipping_progress};
//!
//! let subtotal = Money::from_minor(25_000); // 250.00
//! let threshold = Some(Money::from_minor(50_000)); // 500.00
//!
//! assert_eq!(remaining_for_free_shipping(subtotal, threshold).minor(), 25_000);
//! assert_eq!(shipping_progress(subtotal, threshold).percent(), 50);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod locale;
pub mod money;
pub mod settings;
pub mod shipping;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartView, StockAdjustment};
pub use error::{CoreError, CoreResult, FieldErrors, ValidationError};
pub use locale::{Direction, Preferences, Theme};
pub use money::{ExchangeRate, Money, Rate};
pub use settings::{
    Carousel, CommonSettings, Currency, DeliveryDate, Discriminated, Language, ListAction,
    PaymentMethod, SelectableList, Settings, SiteInfo,
};
pub use shipping::{FreeShippingStatus, OrderPricing, ShippingProgress};
pub use types::Product;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Default value-added tax applied at checkout (15%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1500;
