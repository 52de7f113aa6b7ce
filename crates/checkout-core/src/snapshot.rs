//! # Cart Snapshot
//!
//! The priced, read-only view of the cart returned by display.
//!
//! ```text
//! CartSnapshot
//! ├── items: [CartLine]             live items, insertion order
//! │    └── vas_items: [VasLine]     live VAS items linked to the item
//! ├── total_price                   items + attached VAS items − discount
//! ├── applied_promotion_id          winner of the promotion selector
//! └── total_discount
//! ```
//!
//! Keys are snake_case and money is two-decimal text (`"5010.00"`), so the
//! CLI's JSON reads like the checkout API's cart payload. The types are
//! exported to TypeScript with ts-rs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Item, VasItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,

    /// What the customer pays: the cart price after the discount.
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "string")]
    pub total_price: Money,

    /// `None` only when the cart is empty.
    pub applied_promotion_id: Option<i64>,

    #[serde(with = "crate::money::decimal")]
    #[ts(type = "string")]
    pub total_discount: Money,
}

impl CartSnapshot {
    pub fn empty() -> Self {
        CartSnapshot {
            items: Vec::new(),
            total_price: Money::zero(),
            applied_promotion_id: None,
            total_discount: Money::zero(),
        }
    }

    /// Cart price before the discount.
    pub fn gross_price(&self) -> Money {
        self.total_price + self.total_discount
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub item_id: i64,
    pub category_id: i64,
    pub seller_id: i64,
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "string")]
    pub price: Money,
    pub quantity: i64,
    pub vas_items: Vec<VasLine>,
}

impl CartLine {
    pub fn new(item: &Item, vas_items: &[VasItem]) -> Self {
        CartLine {
            item_id: item.item_id,
            category_id: item.category_id,
            seller_id: item.seller_id,
            price: item.price,
            quantity: item.quantity,
            vas_items: vas_items.iter().map(VasLine::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VasLine {
    pub vas_item_id: i64,
    pub category_id: i64,
    pub seller_id: i64,
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "string")]
    pub price: Money,
    pub quantity: i64,
}

impl From<&VasItem> for VasLine {
    fn from(vas_item: &VasItem) -> Self {
        VasLine {
            vas_item_id: vas_item.vas_item_id,
            category_id: vas_item.category_id,
            seller_id: vas_item.seller_id,
            price: vas_item.price,
            quantity: vas_item.quantity,
        }
    }
}
