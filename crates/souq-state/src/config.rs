//! # Application Configuration
//!
//! Process settings that are not part of the store's settings document.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SOUQ_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Read-only after startup, so no lock.

use std::path::PathBuf;

use directories::ProjectDirs;
use souq_core::{Rate, DEFAULT_TAX_RATE_BPS};

/// Default log filter when neither `RUST_LOG` nor `SOUQ_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,souq=debug,sqlx=warn";

/// Cart id of the device-local cart.
pub const DEFAULT_CART_ID: &str = "local";

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Tax applied at checkout.
    /// Default: 15% (1500 bps)
    pub tax_rate: Rate,

    /// Row the shopper's cart is saved under.
    pub cart_id: String,

    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: default_database_path(),
            tax_rate: Rate::from_bps(DEFAULT_TAX_RATE_BPS),
            cart_id: DEFAULT_CART_ID.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `SOUQ_*` environment variables.
    ///
    /// ## Environment Variables
    /// - `SOUQ_DB_PATH`: database file
    /// - `SOUQ_TAX_RATE`: percentage, e.g. "15" or "8.25"
    /// - `SOUQ_CART_ID`: cart row id
    /// - `SOUQ_LOG`: log filter
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = AppConfig::default();

        if let Some(path) = lookup("SOUQ_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(rate) = lookup("SOUQ_TAX_RATE").and_then(|r| r.trim().parse::<f64>().ok()) {
            if (0.0..=100.0).contains(&rate) {
                config.tax_rate = Rate::from_percentage(rate);
            }
        }

        if let Some(cart_id) = lookup("SOUQ_CART_ID").filter(|c| !c.trim().is_empty()) {
            config.cart_id = cart_id;
        }

        if let Some(filter) = lookup("SOUQ_LOG").filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        config
    }
}

/// Platform data directory for the database file.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.souq.storefront/souq.db`
/// - **Windows**: `%APPDATA%\souq\storefront\data\souq.db`
/// - **Linux**: `~/.local/share/storefront/souq.db`
///
/// Falls back to `./souq.db` when no home directory is known.
pub fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "souq", "storefront")
        .map(|dirs| dirs.data_dir().join("souq.db"))
        .unwrap_or_else(|| PathBuf::from("souq.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.tax_rate.bps(), 1500);
        assert_eq!(config.cart_id, "local");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(config.db_path.ends_with("souq.db"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SOUQ_DB_PATH", "/tmp/souq-test.db"),
            ("SOUQ_TAX_RATE", "8.25"),
            ("SOUQ_CART_ID", "guest-42"),
            ("SOUQ_LOG", "warn"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/tmp/souq-test.db"));
        assert_eq!(config.tax_rate.bps(), 825);
        assert_eq!(config.cart_id, "guest-42");
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SOUQ_TAX_RATE", "fifteen"),
            ("SOUQ_CART_ID", "  "),
        ]));
        assert_eq!(config.tax_rate.bps(), 1500);
        assert_eq!(config.cart_id, "local");

        let config = AppConfig::from_lookup(lookup(&[("SOUQ_TAX_RATE", "150")]));
        assert_eq!(config.tax_rate.bps(), 1500);
    }
}
