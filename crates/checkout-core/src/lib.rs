//! # checkout-core: Cart Rules & Promotion Pricing
//!
//! This crate is the **heart** of the checkout. It decides whether a cart
//! mutation is allowed and which promotion a cart earns, talking to storage
//! only through traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    checkout-cli                                 │   │
//! │  │    add-item, add-vas-item, remove-item, display, reset          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    checkout-db                                  │   │
//! │  │    CheckoutService: write gate, transaction, SqliteCartStore    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &mut impl CartStore                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ checkout-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  engine   │  │   rules   │  │   │
//! │  │   │   Item    │  │   Money   │  │ CartEngine│  │ predicates│  │   │
//! │  │   │  VasItem  │  │  (cents)  │  │ promotion │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO NETWORK • NO FILES                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Rows, commands and filters
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Cart, validation and store errors
//! - [`validation`] - Input bounds
//! - [`policy`] - Caps, categories and promotion parameters
//! - [`store`] - Store traits the engine is written against
//! - [`memory`] - In-memory store
//! - [`rules`] - Rule predicates
//! - [`engine`] - Mutation engines and the promotion selector
//! - [`snapshot`] - Priced cart view returned by display
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use checkout_core::{AddItem, CartEngine, MemoryStore, Money};
//!
//! let engine = CartEngine::default();
//! let mut store = MemoryStore::new();
//!
//! let cmd = AddItem {
//!     item_id: 1,
//!     category_id: 1001,
//!     seller_id: 10,
//!     price: Money::from_major_minor(360, 0),
//!     quantity: 1,
//! };
//! engine.add_item(&mut store, cmd).await.unwrap();
//!
//! let snapshot = engine.display_cart(&mut store).await.unwrap();
//! assert_eq!(snapshot.total_discount, Money::from_major_minor(250, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod memory;
pub mod money;
pub mod policy;
pub mod rules;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use engine::promotion::{Discount, Promotion};
pub use engine::{CartEngine, Outcome};
pub use error::{CartError, CartResult, ErrorKind, StoreError, StoreResult, ValidationError};
pub use memory::MemoryStore;
pub use money::Money;
pub use policy::{CartPolicy, PriceTier, PromotionPolicy};
pub use snapshot::{CartLine, CartSnapshot, VasLine};
pub use store::{CartStore, ItemStore, ItemVasItemStore, PriceAggregator, VasItemStore};
pub use types::*;
