//! # Cart Policy
//!
//! Every cap, category constant and promotion parameter the engines consult.
//!
//! The policy is a plain value handed to [`CartEngine`](crate::engine::CartEngine)
//! at construction. The CLI may override individual fields from a TOML file;
//! anything not overridden keeps its default.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartPolicy                                                             │
//! │  ├── categories     digital 7889 • vas 3242 • vas-eligible {1001,3004} │
//! │  ├── vas_seller_id  5003                                                │
//! │  ├── caps           digital 5 • quantity 30 • unique 10 • vas/item 3    │
//! │  ├── price ceiling  500000.00                                           │
//! │  └── promotions     same-seller 9909 • category 5676 • total 1232      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_bps, validate_positive, ValidationResult};

/// Promotion ids.
pub const SAME_SELLER_PROMOTION_ID: i64 = 9909;
pub const CATEGORY_PROMOTION_ID: i64 = 5676;
pub const TOTAL_PRICE_PROMOTION_ID: i64 = 1232;

// =============================================================================
// Cart Policy
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartPolicy {
    /// Category of digital items.
    pub digital_category_id: i64,

    /// The only category a VAS item may carry.
    pub vas_category_id: i64,

    /// The only seller a VAS item may come from.
    pub vas_seller_id: i64,

    /// Item categories that accept VAS items (furniture, electronics).
    pub vas_eligible_categories: Vec<i64>,

    pub max_digital_items: i64,

    pub max_total_quantity: i64,

    pub max_unique_items: i64,

    /// Max summed VAS quantity attached to a single item.
    pub max_vas_per_item: i64,

    /// Aggregate cart price ceiling (inclusive).
    pub max_cart_price: Money,

    pub promotions: PromotionPolicy,
}

impl Default for CartPolicy {
    fn default() -> Self {
        CartPolicy {
            digital_category_id: 7889,
            vas_category_id: 3242,
            vas_seller_id: 5003,
            vas_eligible_categories: vec![1001, 3004],
            max_digital_items: 5,
            max_total_quantity: 30,
            max_unique_items: 10,
            max_vas_per_item: 3,
            max_cart_price: Money::from_major_minor(500_000, 0),
            promotions: PromotionPolicy::default(),
        }
    }
}

impl CartPolicy {
    #[inline]
    pub fn is_digital(&self, category_id: i64) -> bool {
        category_id == self.digital_category_id
    }

    #[inline]
    pub fn is_vas_category(&self, category_id: i64) -> bool {
        category_id == self.vas_category_id
    }

    #[inline]
    pub fn accepts_vas(&self, category_id: i64) -> bool {
        self.vas_eligible_categories.contains(&category_id)
    }

    /// Rejects a policy that would make the engine misbehave: non-positive
    /// caps, percentages over 100% or tier bands out of order.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_positive("max_digital_items", self.max_digital_items)?;
        validate_positive("max_total_quantity", self.max_total_quantity)?;
        validate_positive("max_unique_items", self.max_unique_items)?;
        validate_positive("max_vas_per_item", self.max_vas_per_item)?;
        validate_positive("max_cart_price", self.max_cart_price.cents())?;

        if self.is_digital(self.vas_category_id) || self.accepts_vas(self.vas_category_id) {
            return Err(ValidationError::InvalidFormat {
                field: "vas_category_id".to_string(),
                reason: "must differ from the digital and VAS-eligible categories".to_string(),
            });
        }

        self.promotions.validate()
    }
}

// =============================================================================
// Promotion Policy
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionPolicy {
    /// Applied to the whole cart when every item has the same seller.
    pub same_seller_bps: u32,

    /// Category whose items earn the category discount.
    pub category_id: i64,

    pub category_bps: u32,

    /// Ascending `below` bounds; first band the total falls under wins.
    pub tiers: Vec<PriceTier>,

    /// Discount when the total is above every band.
    pub top_tier_discount: Money,
}

/// One band of the total-price promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Exclusive upper bound of the band.
    pub below: Money,
    pub discount: Money,
}

impl Default for PromotionPolicy {
    fn default() -> Self {
        let tier = |below: i64, discount: i64| PriceTier {
            below: Money::from_major_minor(below, 0),
            discount: Money::from_major_minor(discount, 0),
        };

        PromotionPolicy {
            same_seller_bps: 1000,
            category_id: 3003,
            category_bps: 500,
            tiers: vec![tier(5_000, 250), tier(10_000, 500), tier(50_000, 1_000)],
            top_tier_discount: Money::from_major_minor(2_000, 0),
        }
    }
}

impl PromotionPolicy {
    /// Discount of the total-price promotion for `total`, before clamping.
    pub fn tier_discount(&self, total: Money) -> Money {
        self.tiers
            .iter()
            .find(|tier| total < tier.below)
            .map_or(self.top_tier_discount, |tier| tier.discount)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_bps("same_seller_bps", self.same_seller_bps)?;
        validate_bps("category_bps", self.category_bps)?;

        let ascending = self.tiers.windows(2).all(|w| w[0].below < w[1].below);
        if !ascending {
            return Err(ValidationError::InvalidFormat {
                field: "tiers".to_string(),
                reason: "bands must be in ascending order".to_string(),
            });
        }

        let negative = self.tiers.iter().any(|t| t.discount.cents() < 0)
            || self.top_tier_discount.cents() < 0;
        if negative {
            return Err(ValidationError::InvalidFormat {
                field: "tiers".to_string(),
                reason: "discounts cannot be negative".to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
