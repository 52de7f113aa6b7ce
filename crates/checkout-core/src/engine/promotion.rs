//! # Promotion Selector
//!
//! Three independent discount candidates; the largest one is applied.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total_price ──┬──► SameSeller (9909)  one seller?  total × 10%        │
//! │                ├──► Category   (5676)  Σ order_price in 3003 × 5%      │
//! │                └──► TotalPrice (1232)  band lookup, clamped to total   │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                 max(amount), ties → lowest promotion id                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use checkout_core::engine::promotion::{select, Candidates, Promotion};
//! use checkout_core::policy::PromotionPolicy;
//! use checkout_core::Money;
//!
//! let candidates = Candidates {
//!     total_price: Money::from_major_minor(360, 0),
//!     same_seller: false,
//!     category_order_price: Money::zero(),
//! };
//! let best = select(&PromotionPolicy::default(), &candidates);
//! assert_eq!(best.promotion, Promotion::TotalPrice);
//! assert_eq!(best.amount, Money::from_major_minor(250, 0));
//! ```

use serde::Serialize;
use tracing::debug;

use super::{CartEngine, OrInternal};
use crate::error::CartResult;
use crate::money::Money;
use crate::policy::{
    PromotionPolicy, CATEGORY_PROMOTION_ID, SAME_SELLER_PROMOTION_ID, TOTAL_PRICE_PROMOTION_ID,
};
use crate::rules;
use crate::store::CartStore;
use crate::types::ItemFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Promotion {
    SameSeller,
    Category,
    TotalPrice,
}

impl Promotion {
    pub const ALL: [Promotion; 3] = [
        Promotion::SameSeller,
        Promotion::Category,
        Promotion::TotalPrice,
    ];

    pub fn id(&self) -> i64 {
        match self {
            Promotion::SameSeller => SAME_SELLER_PROMOTION_ID,
            Promotion::Category => CATEGORY_PROMOTION_ID,
            Promotion::TotalPrice => TOTAL_PRICE_PROMOTION_ID,
        }
    }
}

/// A promotion and the amount it would take off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Discount {
    pub promotion: Promotion,
    pub amount: Money,
}

/// Cart facts the promotions are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidates {
    pub total_price: Money,
    pub same_seller: bool,
    /// Σ order_price of the items in the promotion category.
    pub category_order_price: Money,
}

impl Candidates {
    pub fn discount(&self, policy: &PromotionPolicy, promotion: Promotion) -> Money {
        match promotion {
            Promotion::SameSeller if self.same_seller => {
                self.total_price.percentage(policy.same_seller_bps)
            }
            Promotion::SameSeller => Money::zero(),
            Promotion::Category => self.category_order_price.percentage(policy.category_bps),
            Promotion::TotalPrice => policy.tier_discount(self.total_price).min(self.total_price),
        }
    }
}

/// Picks the largest discount; on a tie the lowest promotion id wins.
pub fn select(policy: &PromotionPolicy, candidates: &Candidates) -> Discount {
    Promotion::ALL
        .iter()
        .map(|&promotion| Discount {
            promotion,
            amount: candidates.discount(policy, promotion),
        })
        .fold(None, |best: Option<Discount>, next| match best {
            Some(best)
                if best.amount > next.amount
                    || (best.amount == next.amount && best.promotion.id() < next.promotion.id()) =>
            {
                Some(best)
            }
            _ => Some(next),
        })
        .unwrap_or(Discount {
            promotion: Promotion::TotalPrice,
            amount: Money::zero(),
        })
}

impl CartEngine {
    /// Gathers the promotion inputs from the store and selects the discount
    /// for `total_price`.
    pub async fn apply_promotion<S>(&self, store: &mut S, total_price: Money) -> CartResult<Discount>
    where
        S: CartStore + ?Sized,
    {
        let promotions = &self.policy.promotions;

        let same_seller = rules::all_items_same_seller(store)
            .await
            .or_internal("all_items_same_seller")?;
        let category_order_price = store
            .sum_item_order_price(&ItemFilter::all().category(promotions.category_id))
            .await
            .or_internal("sum_item_order_price")?;

        let candidates = Candidates {
            total_price,
            same_seller,
            category_order_price,
        };
        let discount = select(promotions, &candidates);

        debug!(
            promotion_id = discount.promotion.id(),
            discount = %discount.amount,
            total_price = %total_price,
            "Promotion selected"
        );
        Ok(discount)
    }
}
