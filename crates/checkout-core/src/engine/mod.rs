//! # Cart Engine
//!
//! Ordered rule checks for every cart mutation, plus the promotion selector
//! used by display.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutService (checkout-db)                                          │
//! │    begin tx ──► SqliteCartStore::with_tx(&mut tx)                       │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  CartEngine (THIS MODULE)                                        │  │
//! │  │                                                                  │  │
//! │  │  0. validate command bounds                                      │  │
//! │  │  1..n rule checks ── first failure ──► Err(CartError)            │  │
//! │  │  writes                                                          │  │
//! │  │                                            ──► Ok(Outcome)       │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │    Ok  ──► commit        Err ──► rollback                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never opens or closes a transaction. It issues reads and writes
//! through whatever store it is handed, in a fixed order, and stops at the
//! first failure.
//!
//! ## Module Organization
//! - `item` - add / remove base items
//! - `vas` - attach VAS items
//! - `cart` - display / reset
//! - [`promotion`] - discount candidates and selection

mod cart;
mod item;
pub mod promotion;
mod vas;

use std::fmt;

use serde::Serialize;
use tracing::{error, warn};

use crate::error::{CartError, CartResult, StoreResult};
use crate::policy::CartPolicy;

// =============================================================================
// Engine
// =============================================================================

/// Cart rule engine. Holds nothing but the policy; all state lives in the
/// store passed to each call.
#[derive(Debug, Clone, Default)]
pub struct CartEngine {
    policy: CartPolicy,
}

impl CartEngine {
    pub fn new(policy: CartPolicy) -> Self {
        CartEngine { policy }
    }

    pub fn policy(&self) -> &CartPolicy {
        &self.policy
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    ItemAdded,
    ItemRemoved,
    VasItemAdded,
    CartEmptied,
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::ItemAdded => "item added successfully",
            Outcome::ItemRemoved => "item removed successfully",
            Outcome::VasItemAdded => "vas-item added successfully",
            Outcome::CartEmptied => "cart emptied successfully",
        }
    }

    /// 201 for creations, 200 otherwise.
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::ItemAdded | Outcome::VasItemAdded => 201,
            Outcome::ItemRemoved | Outcome::CartEmptied => 200,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Logs a store failure and replaces it with the opaque internal error.
pub(crate) trait OrInternal<T> {
    fn or_internal(self, operation: &'static str) -> CartResult<T>;
}

impl<T> OrInternal<T> for StoreResult<T> {
    fn or_internal(self, operation: &'static str) -> CartResult<T> {
        self.map_err(|err| {
            error!(operation, error = %err, "Store operation failed");
            CartError::Internal
        })
    }
}

/// Logs a rule rejection and returns it.
pub(crate) fn reject<T>(err: CartError) -> CartResult<T> {
    warn!(reason = %err, "Cart request rejected");
    Err(err)
}
