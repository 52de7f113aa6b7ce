//! # checkout-db: Database Layer for the Checkout Cart
//!
//! This crate persists the cart in SQLite and runs every cart mutation inside
//! one transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Data Flow                               │
//! │                                                                         │
//! │  checkout-cli (add-item)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   checkout-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌─────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │   │ CheckoutService │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄──│  gate + tx      │   │  (embedded)  │   │   │
//! │  │   │               │   │       │         │   │              │   │   │
//! │  │   │ SqlitePool    │   │       ▼         │   │ 001_initial  │   │   │
//! │  │   │               │   │ SqliteCartStore │   │              │   │   │
//! │  │   └───────────────┘   └─────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   items • vas_items • item_vas_items (soft delete)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`store`] - `SqliteCartStore`, the store traits over SQLite
//! - [`service`] - `CheckoutService`, the transaction boundary
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_core::CartEngine;
//! use checkout_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./checkout.db")).await?;
//! let service = db.checkout(CartEngine::default());
//!
//! service.remove_item(4).await?;
//! let snapshot = service.display_cart().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};
pub use service::{CheckoutService, Mutation};
pub use store::SqliteCartStore;
