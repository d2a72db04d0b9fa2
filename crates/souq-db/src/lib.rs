//! # souq-db: Database Layer for Souq
//!
//! SQLite storage for the two documents the storefront persists: the store
//! settings and the shopper's cart.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Souq Data Flow                                 │
//! │                                                                         │
//! │  souq-state (SettingsCache, cart persistence)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     souq-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│ SettingsRepo   │   │  (embedded)  │   │   │
//! │  │   │  SqlitePool   │    │ CartRepo       │   │ 001_init.sql │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (platform data dir, or SOUQ_DB_PATH)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use souq_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/souq.db")).await?;
//! let settings = db.settings().load().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbLocation};

pub use repository::cart::CartRepository;
pub use repository::settings::SettingsRepository;
