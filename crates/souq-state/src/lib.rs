//! # souq-state: Application State for Souq
//!
//! State containers the storefront and admin views render from, wired to
//! the database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Storefront::open                               │
//! │                                                                         │
//! │   AppConfig::from_env ──► Database::new ──► SettingsCache::load         │
//! │                                │                 │                      │
//! │                                ▼                 ▼                      │
//! │                         carts.load(cart_id)   PreferencesStore          │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                           CartStore ──subscribe──► CartPersistence      │
//! │                                                                         │
//! │   views: subscribe(..) / get_snapshot() / dispatch(action)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`] - `Store<S>`: subscribe, get_snapshot, dispatch
//! - [`cart`] - Cart actions and the cart page summary
//! - [`settings`] - Settings cache, admin form, save
//! - [`preferences`] - Locale, theme, display currency
//! - [`persist`] - Ordered background cart saves
//! - [`config`] - `SOUQ_*` environment configuration
//! - [`error`] - `StateError` and the view error payload

pub mod cart;
pub mod config;
pub mod error;
pub mod persist;
pub mod preferences;
pub mod settings;
pub mod store;

pub use cart::{CartAction, CartStore, CartSummary};
pub use config::AppConfig;
pub use error::{ErrorCode, ErrorPayload, StateError};
pub use persist::CartPersistence;
pub use preferences::{PreferencesAction, PreferencesStore};
pub use settings::{save_settings, SettingsAction, SettingsCache, SettingsForm};
pub use store::{Reducer, Store, SubscriptionId};

use souq_core::{Cart, OrderPricing, Settings, ValidationError};
use souq_db::{Database, DbConfig, DbError};
use tokio::runtime::Handle;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `default_filter`
/// (see [`AppConfig::log_filter`]). Returns `false` if a subscriber was
/// already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

// =============================================================================
// Storefront
// =============================================================================

/// Every store of a running storefront, sharing one database.
pub struct Storefront {
    db: Database,
    config: AppConfig,
    settings: SettingsCache,
    cart: CartStore,
    preferences: PreferencesStore,
    persist: CartPersistence,
}

impl Storefront {
    /// Opens the database at `config.db_path` and restores state from it.
    pub async fn open(config: AppConfig) -> Result<Self, StateError> {
        if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        }

        let db = Database::new(DbConfig::new(&config.db_path)).await?;
        Self::with_database(db, config).await
    }

    /// Restores state from an already open database.
    ///
    /// Must run inside a tokio runtime: cart saves are spawned on it.
    pub async fn with_database(db: Database, config: AppConfig) -> Result<Self, StateError> {
        let settings = SettingsCache::load(&db).await?;

        let cart = db.carts().load(&config.cart_id).await?.unwrap_or_default();
        info!(
            cart_id = %config.cart_id,
            lines = cart.line_count(),
            "Cart restored"
        );

        let cart = CartStore::new(cart);
        let persist = CartPersistence::start(
            &cart,
            &Handle::current(),
            db.carts(),
            config.cart_id.clone(),
        );
        let preferences = PreferencesStore::new(settings.clone());

        Ok(Storefront {
            db,
            config,
            settings,
            cart,
            preferences,
            persist,
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn settings(&self) -> &SettingsCache {
        &self.settings
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn preferences(&self) -> &PreferencesStore {
        &self.preferences
    }

    /// What the cart page renders.
    pub fn cart_summary(&self) -> CartSummary {
        let threshold = self.settings.free_shipping_threshold();
        self.cart.with_state(|cart| CartSummary::new(cart, threshold))
    }

    /// Checkout totals for a delivery option, by name.
    ///
    /// `None` uses the store's default delivery option.
    pub fn price_order(&self, delivery: Option<&str>) -> Result<OrderPricing, StateError> {
        let snapshot: Cart = self.cart.get_snapshot();
        let tax = self.config.tax_rate;

        self.settings.with(|s: &Settings| -> Result<OrderPricing, StateError> {
            let option = match delivery {
                Some(name) => Some(s.delivery_dates.find(name).ok_or_else(|| {
                    StateError::invalid(
                        "deliveryDate",
                        ValidationError::NotAllowed {
                            field: "delivery date".to_string(),
                            allowed: s.delivery_dates.discriminators(),
                        },
                    )
                })?),
                None => s.delivery_dates.default_entry(),
            };
            Ok(cart::price_cart(&snapshot, option, tax))
        })
    }

    /// Validates and stores a settings document edited in the admin form.
    pub async fn save_settings(&self, settings: &Settings) -> Result<(), StateError> {
        save_settings(&self.db, &self.settings, settings).await
    }

    /// Writes the last cart change, then closes the database.
    pub async fn close(self) {
        self.persist.stop(&self.cart).await;
        self.db.close().await;
        info!("Storefront closed");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use souq_core::{CartItem, Money, Product};

    fn item(price: i64, stock: i64, qty: i64) -> CartItem {
        let product = Product {
            id: format!("p-{price}"),
            name: "Oud".to_string(),
            slug: "oud".to_string(),
            category: "Perfume".to_string(),
            images: vec!["/images/oud.jpg".to_string()],
            price: Money::from_minor(price),
            count_in_stock: stock,
            colors: vec![],
            sizes: vec![],
            is_published: true,
        };
        CartItem::from_product(&product, qty, None, None)
    }

    async fn storefront() -> Storefront {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Storefront::with_database(db, AppConfig::from_lookup(|_| None))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_storefront() {
        let front = storefront().await;

        let summary = front.cart_summary();
        assert!(summary.is_empty());
        assert_eq!(summary.free_shipping.remaining.minor(), 35_000);
        assert_eq!(front.preferences().get_snapshot().locale, "ar");
    }

    #[tokio::test]
    async fn test_restores_saved_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut cart = Cart::new();
        cart.add_item(item(10_000, 5, 2)).unwrap();
        db.carts().save("local", &cart).await.unwrap();

        let front = Storefront::with_database(db, AppConfig::from_lookup(|_| None))
            .await
            .unwrap();
        assert_eq!(front.cart().get_snapshot(), cart);
        assert_eq!(front.cart_summary().total_items, 2);
    }

    #[tokio::test]
    async fn test_price_order() {
        let front = storefront().await;
        front
            .cart()
            .dispatch(CartAction::Add(item(10_000, 5, 2)))
            .unwrap();

        // Default option "Next 5 Days": 15.00, free from 350.00
        let pricing = front.price_order(None).unwrap();
        assert_eq!(pricing.items_price.minor(), 20_000);
        assert_eq!(pricing.shipping_price.minor(), 1_500);
        assert_eq!(pricing.tax_price.minor(), 3_000);
        assert_eq!(pricing.total_price.minor(), 24_500);

        let pricing = front.price_order(Some("Tomorrow")).unwrap();
        assert_eq!(pricing.shipping_price.minor(), 5_000);

        assert!(matches!(
            front.price_order(Some("Next Year")),
            Err(StateError::Invalid(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_close_keeps_final_cart_for_next_session() {
        let path = std::env::temp_dir().join(format!("souq-close-{}.db", std::process::id()));
        let db_path = path.to_string_lossy().into_owned();
        let config = || {
            let db_path = db_path.clone();
            AppConfig::from_lookup(move |key| (key == "SOUQ_DB_PATH").then(|| db_path.clone()))
        };
        let remove_files = || {
            for suffix in ["", "-wal", "-shm"] {
                let _ = std::fs::remove_file(format!("{}{}", db_path, suffix));
            }
        };
        remove_files();

        let front = Storefront::open(config()).await.unwrap();
        let line = item(3_000, 500, 1);
        let client_id = line.client_id.clone();
        front.cart().dispatch(CartAction::Add(line)).unwrap();
        for _ in 0..150 {
            front
                .cart()
                .dispatch(CartAction::Increment(client_id.clone()))
                .unwrap();
        }
        let expected = front.cart().get_snapshot();
        front.close().await;

        let front = Storefront::open(config()).await.unwrap();
        assert_eq!(front.cart().get_snapshot(), expected);
        assert_eq!(front.cart_summary().total_items, 151);
        front.close().await;
        remove_files();
    }

    #[tokio::test]
    async fn test_save_settings_updates_threshold() {
        let front = storefront().await;
        let mut settings = front.settings().get();
        settings.common.free_shipping_min_price = Money::zero();

        front.save_settings(&settings).await.unwrap();

        let summary = front.cart_summary();
        assert!(summary.free_shipping.qualifies);
        assert_eq!(summary.free_shipping.progress.percent(), 100);
        front.close().await;
    }
}
