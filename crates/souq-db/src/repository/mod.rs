//! # Repository Module
//!
//! Database repositories for Souq.
//!
//! ## Document Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Both repositories store one JSON document per row:                     │
//! │                                                                         │
//! │  settings (id = 1) ── Settings         ← replaced on every admin save   │
//! │  carts    (id)     ── Cart             ← replaced after every change    │
//! │                                                                         │
//! │  A write replaces the whole document. There is no patching and no      │
//! │  concurrency token: the last write wins.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`settings::SettingsRepository`] - The store settings document
//! - [`cart::CartRepository`] - Carts keyed by id

pub mod cart;
pub mod settings;
