//! # Validation Module
//!
//! Input bounds checked before any cart rule runs.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command bounds (THIS MODULE)                                 │
//! │  ├── ids present (> 0)                                                 │
//! │  ├── price within [1.00, 500000.00]                                    │
//! │  └── line quantity within [1, 10] (items) or [1, 3] (VAS items)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart rules (engine)                                          │
//! │  └── caps, category mix, VAS eligibility against current cart state    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on price / quantity                             │
//! │  └── partial UNIQUE indexes on live business ids                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use checkout_core::validation::{validate_id, validate_quantity};
//!
//! assert!(validate_id("item_id", 7).is_ok());
//! assert!(validate_quantity(11, 10).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::{Money, BPS_SCALE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Lowest accepted unit price.
pub const MIN_PRICE: Money = Money::from_cents(100);

/// Highest accepted unit price.
pub const MAX_PRICE: Money = Money::from_major_minor(500_000, 0);

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a caller-supplied identifier (item, VAS item, category, seller).
///
/// Zero is treated as "not supplied".
pub fn validate_id(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity against `1..=max`.
///
/// ## Example
/// ```rust
/// use checkout_core::validation::validate_quantity;
///
/// assert!(validate_quantity(3, 3).is_ok());
/// assert!(validate_quantity(0, 3).is_err());
/// assert!(validate_quantity(4, 3).is_err());
/// ```
pub fn validate_quantity(qty: i64, max: i64) -> ValidationResult<()> {
    if !(1..=max).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: "1".to_string(),
            max: max.to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - At least 1.00
/// - At most 500000.00
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price < MIN_PRICE || price > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: MIN_PRICE.to_string(),
            max: MAX_PRICE.to_string(),
        });
    }

    Ok(())
}

/// Validates a percentage in basis points (0 to 10000).
pub fn validate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > BPS_SCALE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: BPS_SCALE.to_string(),
        });
    }

    Ok(())
}

/// Validates that a configured limit is positive.
pub fn validate_positive(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "1".to_string(),
            max: i64::MAX.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
