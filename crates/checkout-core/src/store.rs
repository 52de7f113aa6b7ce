//! # Store Traits
//!
//! The engine reads and writes cart state only through these traits.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           CartStore                                     │
//! │                                                                         │
//! │   ┌────────────┐ ┌──────────────┐ ┌──────────────────┐ ┌─────────────┐ │
//! │   │ ItemStore  │ │ VasItemStore │ │ ItemVasItemStore │ │PriceAggreg. │ │
//! │   └─────┬──────┘ └──────┬───────┘ └────────┬─────────┘ └──────┬──────┘ │
//! │         └───────────────┴──────────────────┴──────────────────┘        │
//! │                                   │                                     │
//! │            ┌──────────────────────┴───────────────────────┐            │
//! │            ▼                                              ▼            │
//! │   MemoryStore (checkout-core)              SqliteCartStore (checkout-db)│
//! │   Vec-backed, fault injection              &mut SqliteConnection, either│
//! │                                            pooled or inside a tx       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods take `&mut self`: a store is a handle on one connection (or one
//! open transaction), so every call made through it belongs to the same
//! unit of work. Only live rows (`deleted_at IS NULL`) are ever returned,
//! counted or summed.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::money::Money;
use crate::types::{Item, ItemFilter, ItemVasItem, ItemVasItemFilter, VasItem, VasItemFilter};

// =============================================================================
// Items
// =============================================================================

#[async_trait]
pub trait ItemStore: Send {
    async fn create_item(&mut self, item: &Item) -> StoreResult<()>;

    /// First match in insertion order.
    async fn get_item(&mut self, filter: &ItemFilter) -> StoreResult<Option<Item>>;

    /// All matches in insertion order.
    async fn find_items(&mut self, filter: &ItemFilter) -> StoreResult<Vec<Item>>;

    async fn count_items(&mut self, filter: &ItemFilter) -> StoreResult<i64>;

    async fn item_exists(&mut self, filter: &ItemFilter) -> StoreResult<bool> {
        Ok(self.count_items(filter).await? > 0)
    }

    /// Σ quantity over matches, 0 when nothing matches.
    async fn sum_item_quantity(&mut self, filter: &ItemFilter) -> StoreResult<i64>;

    /// Σ price × quantity over matches.
    async fn sum_item_order_price(&mut self, filter: &ItemFilter) -> StoreResult<Money>;

    /// Number of distinct seller ids over matches.
    async fn count_item_sellers(&mut self, filter: &ItemFilter) -> StoreResult<i64>;

    /// Soft-deletes matches, returning how many rows were affected.
    async fn delete_items(&mut self, filter: &ItemFilter) -> StoreResult<u64>;

    async fn delete_all_items(&mut self) -> StoreResult<u64> {
        self.delete_items(&ItemFilter::all()).await
    }
}

// =============================================================================
// VAS Items
// =============================================================================

#[async_trait]
pub trait VasItemStore: Send {
    async fn create_vas_item(&mut self, vas_item: &VasItem) -> StoreResult<()>;

    async fn get_vas_item(&mut self, filter: &VasItemFilter) -> StoreResult<Option<VasItem>>;

    async fn find_vas_items(&mut self, filter: &VasItemFilter) -> StoreResult<Vec<VasItem>>;

    async fn count_vas_items(&mut self, filter: &VasItemFilter) -> StoreResult<i64>;

    async fn vas_item_exists(&mut self, filter: &VasItemFilter) -> StoreResult<bool> {
        Ok(self.count_vas_items(filter).await? > 0)
    }

    async fn delete_vas_items(&mut self, filter: &VasItemFilter) -> StoreResult<u64>;

    async fn delete_all_vas_items(&mut self) -> StoreResult<u64> {
        self.delete_vas_items(&VasItemFilter::all()).await
    }
}

// =============================================================================
// Item ↔ VAS Item Associations
// =============================================================================

#[async_trait]
pub trait ItemVasItemStore: Send {
    async fn create_link(&mut self, link: &ItemVasItem) -> StoreResult<()>;

    async fn find_links(&mut self, filter: &ItemVasItemFilter) -> StoreResult<Vec<ItemVasItem>>;

    async fn count_links(&mut self, filter: &ItemVasItemFilter) -> StoreResult<i64>;

    async fn link_exists(&mut self, filter: &ItemVasItemFilter) -> StoreResult<bool> {
        Ok(self.count_links(filter).await? > 0)
    }

    /// Live VAS items reached through the live links matching `filter`,
    /// one entry per link, in link order.
    async fn linked_vas_items(&mut self, filter: &ItemVasItemFilter) -> StoreResult<Vec<VasItem>>;

    async fn delete_links(&mut self, filter: &ItemVasItemFilter) -> StoreResult<u64>;

    async fn delete_all_links(&mut self) -> StoreResult<u64> {
        self.delete_links(&ItemVasItemFilter::all()).await
    }
}

// =============================================================================
// Price Aggregation
// =============================================================================

#[async_trait]
pub trait PriceAggregator: Send {
    /// Σ item order prices + Σ VAS order prices, the latter once per live
    /// link whose VAS item is live.
    async fn total_cart_price(&mut self) -> StoreResult<Money>;

    /// Σ quantity of the live VAS items linked to `item_id`.
    async fn total_vas_quantity_on_item(&mut self, item_id: i64) -> StoreResult<i64>;
}

/// Everything the engine needs from a backend.
pub trait CartStore: ItemStore + VasItemStore + ItemVasItemStore + PriceAggregator {}

impl<T> CartStore for T where T: ItemStore + VasItemStore + ItemVasItemStore + PriceAggregator {}
