//! # Error Types
//!
//! Domain-specific error types for checkout-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  checkout-core errors (this file)                                      │
//! │  ├── CartError        - What the caller sees (rule, not-found, internal)│
//! │  ├── ValidationError  - Input bound failures                           │
//! │  └── StoreError       - Opaque failure reported by a store             │
//! │                                                                         │
//! │  checkout-db errors (separate crate)                                   │
//! │  └── DbError          - sqlx failures, converted into StoreError       │
//! │                                                                         │
//! │  Flow: DbError → StoreError → (logged) → CartError::Internal → caller  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! 1. A rule violation carries its own human-readable message, returned verbatim.
//! 2. A store failure is logged where it happens and surfaces as
//!    `CartError::Internal`, whose message never contains the store's text.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Cart Error
// =============================================================================

/// Errors returned by the cart engines.
///
/// Only the first violated rule is ever reported; later rules do not run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Input failed its bounds before any rule ran.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// VAS items have their own entry point.
    #[error("cannot add vas-item from this endpoint")]
    VasItemViaItemPath,

    #[error("item with ID {item_id} already exists. Please choose a different item ID")]
    ItemAlreadyExists { item_id: i64 },

    #[error("cannot add a digital item if default item exists in cart")]
    DigitalWithDefaultItems,

    #[error("cannot add a default item if digital item exists in cart")]
    DefaultWithDigitalItems,

    #[error("total number of digital items cannot be over {max}")]
    DigitalItemLimit { max: i64 },

    #[error("total price of cart cannot be over {max}")]
    CartPriceLimit { max: Money },

    #[error("total number of items cannot be over {max}")]
    ItemQuantityLimit { max: i64 },

    #[error("total number of unique items cannot be over {max}")]
    UniqueItemLimit { max: i64 },

    #[error("item already has this vas-item, cannot add same vas-item multiple times to a single item")]
    VasItemAlreadyAttached { item_id: i64, vas_item_id: i64 },

    #[error("cannot add vas-item with category id {category_id}")]
    VasCategoryMismatch { category_id: i64 },

    #[error("cannot add vas-item with seller id {seller_id}")]
    VasSellerMismatch { seller_id: i64 },

    #[error("item category is not suitable to add vas-items")]
    ItemNotSuitableForVas { item_id: i64, category_id: i64 },

    #[error("item {item_id} has already {current} vas-items, cannot add more than {max} vas-items to the same item")]
    VasItemLimit { item_id: i64, current: i64, max: i64 },

    #[error("single vas-item's price cannot be more than single item's price")]
    VasPriceAboveItemPrice { vas_price: Money, item_price: Money },

    /// Item to remove is not in the cart.
    #[error("record not found")]
    ItemNotFound { item_id: i64 },

    /// Item to attach a VAS item to is not in the cart.
    #[error("cannot add vas-item, item {item_id} does not exist")]
    VasTargetNotFound { item_id: i64 },

    /// Store failure. Details were logged; nothing is leaked.
    #[error("internal server error")]
    Internal,
}

/// Coarse classification used for status-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User-correctable: input bounds and business rules.
    Rejected,
    NotFound,
    Internal,
}

impl CartError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::ItemNotFound { .. } | CartError::VasTargetNotFound { .. } => {
                ErrorKind::NotFound
            }
            CartError::Internal => ErrorKind::Internal,
            _ => ErrorKind::Rejected,
        }
    }

    /// HTTP status for callers that expose the engine over HTTP.
    ///
    /// ```text
    /// Rejected → 400    NotFound → 404    Internal → 500
    /// ```
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Rejected => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These run before any store access, mirroring request binding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or zero.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: String, max: String },

    /// Invalid format (e.g., a price with three decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Store Error
// =============================================================================

/// A failure reported by a store implementation.
///
/// The engine never matches on the contents; it logs them and answers
/// `CartError::Internal`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (database, connection, constraint...).
    #[error("store backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Failure injected by the in-memory store.
    #[error("simulated store failure in {operation}")]
    Simulated { operation: &'static str },
}

impl StoreError {
    /// Wraps any backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for engine results.
pub type CartResult<T> = Result<T, CartError>;

/// Convenience type alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CartError::ItemAlreadyExists { item_id: 1 };
        assert_eq!(
            err.to_string(),
            "item with ID 1 already exists. Please choose a different item ID"
        );

        let err = CartError::CartPriceLimit {
            max: Money::from_major_minor(500_000, 0),
        };
        assert_eq!(err.to_string(), "total price of cart cannot be over 500000.00");

        let err = CartError::VasItemLimit {
            item_id: 4,
            current: 2,
            max: 3,
        };
        assert_eq!(
            err.to_string(),
            "item 4 has already 2 vas-items, cannot add more than 3 vas-items to the same item"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CartError::DigitalWithDefaultItems.status_code(), 400);
        assert_eq!(CartError::ItemNotFound { item_id: 1 }.status_code(), 404);
        assert_eq!(CartError::VasTargetNotFound { item_id: 9 }.status_code(), 404);
        assert_eq!(CartError::Internal.status_code(), 500);
    }

    #[test]
    fn test_internal_error_hides_store_details() {
        let store_err = StoreError::Simulated { operation: "count_items" };
        assert!(store_err.to_string().contains("count_items"));
        assert_eq!(CartError::Internal.to_string(), "internal server error");
    }

    #[test]
    fn test_validation_converts_to_cart_error() {
        let validation_err = ValidationError::Required {
            field: "item_id".to_string(),
        };
        let cart_err: CartError = validation_err.into();
        assert!(matches!(cart_err, CartError::Validation(_)));
        assert_eq!(cart_err.status_code(), 400);
        assert_eq!(cart_err.to_string(), "item_id is required");
    }
}
