//! # Domain Types
//!
//! Rows, commands and filters of the checkout cart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │   ItemVasItem   │   │     VasItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  item_id        │   │  id (UUID)      │       │
//! │  │  item_id        │   │  vas_item_id    │──►│  vas_item_id    │       │
//! │  │  price, qty     │   │  deleted_at     │   │  price, qty     │       │
//! │  │  deleted_at     │   └─────────────────┘   │  deleted_at     │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  One VasItem row is shared by every association naming its id.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every row has:
//! - `id`: UUID v4 - surrogate key, never reused
//! - Business id (`item_id`, `vas_item_id`): caller-supplied, unique among live rows
//!
//! ## Soft Delete
//! Rows are never updated in place. Removal sets `deleted_at`; every store
//! query ignores rows where it is set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_id, validate_price, validate_quantity};

/// Upper bound on a single item line's quantity.
pub const MAX_ITEM_LINE_QUANTITY: i64 = 10;

/// Upper bound on a single VAS attachment's quantity.
pub const MAX_VAS_LINE_QUANTITY: i64 = 3;

// =============================================================================
// Item
// =============================================================================

/// A base item in the cart (digital or default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Surrogate key (UUID v4).
    pub id: String,

    /// Caller-supplied business id.
    pub item_id: i64,

    pub category_id: i64,

    pub seller_id: i64,

    /// Unit price.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,

    pub quantity: i64,

    pub created_at: DateTime<Utc>,

    /// Set when the item is removed or the cart is reset.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Builds a fresh, live row from an add command.
    pub fn from_command(cmd: &AddItem) -> Self {
        Item {
            id: Uuid::new_v4().to_string(),
            item_id: cmd.item_id,
            category_id: cmd.category_id,
            seller_id: cmd.seller_id,
            price: cmd.price,
            quantity: cmd.quantity,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn order_price(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

// =============================================================================
// VAS Item
// =============================================================================

/// A value-added-service catalog entry, shared across the items it is
/// attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VasItem {
    pub id: String,

    pub vas_item_id: i64,

    pub category_id: i64,

    pub seller_id: i64,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,

    pub quantity: i64,

    pub created_at: DateTime<Utc>,

    pub deleted_at: Option<DateTime<Utc>>,
}

impl VasItem {
    /// Builds the catalog row created by the first attach of `vas_item_id`.
    pub fn from_command(cmd: &AddVasItem) -> Self {
        VasItem {
            id: Uuid::new_v4().to_string(),
            vas_item_id: cmd.vas_item_id,
            category_id: cmd.category_id,
            seller_id: cmd.seller_id,
            price: cmd.price,
            quantity: cmd.quantity,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[inline]
    pub fn order_price(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

// =============================================================================
// Item ↔ VAS Item Association
// =============================================================================

/// Links one base item to one VAS item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ItemVasItem {
    pub id: String,

    pub item_id: i64,

    pub vas_item_id: i64,

    pub created_at: DateTime<Utc>,

    pub deleted_at: Option<DateTime<Utc>>,
}

impl ItemVasItem {
    pub fn new(item_id: i64, vas_item_id: i64) -> Self {
        ItemVasItem {
            id: Uuid::new_v4().to_string(),
            item_id,
            vas_item_id,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Request to add a base item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub item_id: i64,
    pub category_id: i64,
    pub seller_id: i64,
    pub price: Money,
    pub quantity: i64,
}

impl AddItem {
    /// Checks input bounds (ids present, price and quantity in range).
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_id("item_id", self.item_id)?;
        validate_id("category_id", self.category_id)?;
        validate_id("seller_id", self.seller_id)?;
        validate_price(self.price)?;
        validate_quantity(self.quantity, MAX_ITEM_LINE_QUANTITY)?;
        Ok(())
    }

    #[inline]
    pub fn order_price(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// Request to attach a VAS item to a base item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddVasItem {
    /// The base item receiving the VAS item.
    pub item_id: i64,
    pub vas_item_id: i64,
    pub category_id: i64,
    pub seller_id: i64,
    pub price: Money,
    pub quantity: i64,
}

impl AddVasItem {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_id("item_id", self.item_id)?;
        validate_id("vas_item_id", self.vas_item_id)?;
        validate_id("category_id", self.category_id)?;
        validate_id("seller_id", self.seller_id)?;
        validate_price(self.price)?;
        validate_quantity(self.quantity, MAX_VAS_LINE_QUANTITY)?;
        Ok(())
    }

    #[inline]
    pub fn order_price(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Filters
// =============================================================================
// Conjunctions over the row fields. `None` means "don't care".

/// Filter over live items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub id: Option<String>,
    pub item_id: Option<i64>,
    pub category_id: Option<i64>,
    pub category_id_not: Option<i64>,
    pub seller_id: Option<i64>,
    pub price: Option<Money>,
    pub quantity: Option<i64>,
}

impl ItemFilter {
    /// Matches every live item.
    pub fn all() -> Self {
        ItemFilter::default()
    }

    pub fn item_id(mut self, item_id: i64) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn category_not(mut self, category_id: i64) -> Self {
        self.category_id_not = Some(category_id);
        self
    }

    pub fn seller(mut self, seller_id: i64) -> Self {
        self.seller_id = Some(seller_id);
        self
    }

    /// True if `item` is live and satisfies every set condition.
    pub fn matches(&self, item: &Item) -> bool {
        item.is_live()
            && self.id.as_ref().map_or(true, |id| *id == item.id)
            && self.item_id.map_or(true, |v| v == item.item_id)
            && self.category_id.map_or(true, |v| v == item.category_id)
            && self.category_id_not.map_or(true, |v| v != item.category_id)
            && self.seller_id.map_or(true, |v| v == item.seller_id)
            && self.price.map_or(true, |v| v == item.price)
            && self.quantity.map_or(true, |v| v == item.quantity)
    }
}

/// Filter over live VAS items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VasItemFilter {
    pub id: Option<String>,
    pub vas_item_id: Option<i64>,
    pub category_id: Option<i64>,
    pub category_id_not: Option<i64>,
    pub seller_id: Option<i64>,
    pub price: Option<Money>,
    pub quantity: Option<i64>,
}

impl VasItemFilter {
    pub fn all() -> Self {
        VasItemFilter::default()
    }

    pub fn vas_item_id(mut self, vas_item_id: i64) -> Self {
        self.vas_item_id = Some(vas_item_id);
        self
    }

    pub fn matches(&self, vas_item: &VasItem) -> bool {
        vas_item.is_live()
            && self.id.as_ref().map_or(true, |id| *id == vas_item.id)
            && self.vas_item_id.map_or(true, |v| v == vas_item.vas_item_id)
            && self.category_id.map_or(true, |v| v == vas_item.category_id)
            && self.category_id_not.map_or(true, |v| v != vas_item.category_id)
            && self.seller_id.map_or(true, |v| v == vas_item.seller_id)
            && self.price.map_or(true, |v| v == vas_item.price)
            && self.quantity.map_or(true, |v| v == vas_item.quantity)
    }
}

/// Filter over live item ↔ VAS item associations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemVasItemFilter {
    pub id: Option<String>,
    pub item_id: Option<i64>,
    pub vas_item_id: Option<i64>,
}

impl ItemVasItemFilter {
    pub fn all() -> Self {
        ItemVasItemFilter::default()
    }

    pub fn item_id(mut self, item_id: i64) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn vas_item_id(mut self, vas_item_id: i64) -> Self {
        self.vas_item_id = Some(vas_item_id);
        self
    }

    /// Exactly one (item, VAS item) pair.
    pub fn pair(item_id: i64, vas_item_id: i64) -> Self {
        ItemVasItemFilter::all().item_id(item_id).vas_item_id(vas_item_id)
    }

    pub fn matches(&self, link: &ItemVasItem) -> bool {
        link.is_live()
            && self.id.as_ref().map_or(true, |id| *id == link.id)
            && self.item_id.map_or(true, |v| v == link.item_id)
            && self.vas_item_id.map_or(true, |v| v == link.vas_item_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
