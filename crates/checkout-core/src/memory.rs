//! # In-Memory Store
//!
//! A `Vec`-backed [`CartStore`](crate::store::CartStore) used by the engine
//! tests and by anything that wants a cart without a database.
//!
//! Rows are soft-deleted exactly like the SQLite store does it, so deleted
//! rows stay in the vectors and can be inspected by tests.
//!
//! ## Fault Injection
//! ```text
//! let mut store = MemoryStore::new().fail_on("total_cart_price");
//!
//! engine.add_item(&mut store, cmd).await  ──►  Err(CartError::Internal)
//! ```
//! Every trait method checks its own operation name before touching state.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;

use crate::error::{StoreError, StoreResult};
use crate::money::Money;
use crate::store::{ItemStore, ItemVasItemStore, PriceAggregator, VasItemStore};
use crate::types::{Item, ItemFilter, ItemVasItem, ItemVasItemFilter, VasItem, VasItemFilter};

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub items: Vec<Item>,
    pub vas_items: Vec<VasItem>,
    pub links: Vec<ItemVasItem>,
    fail_on: Option<&'static str>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Makes the named store operation fail with [`StoreError::Simulated`].
    pub fn fail_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    /// Stops injecting failures.
    pub fn heal(&mut self) {
        self.fail_on = None;
    }

    /// Counts every row including soft-deleted ones: (items, vas_items, links).
    pub fn row_counts(&self) -> (usize, usize, usize) {
        (self.items.len(), self.vas_items.len(), self.links.len())
    }

    fn check(&self, operation: &'static str) -> StoreResult<()> {
        match self.fail_on {
            Some(failing) if failing == operation => Err(StoreError::Simulated { operation }),
            _ => Ok(()),
        }
    }

    fn live_vas_item(&self, vas_item_id: i64) -> Option<&VasItem> {
        self.vas_items
            .iter()
            .find(|v| v.is_live() && v.vas_item_id == vas_item_id)
    }
}

// =============================================================================
// Items
// =============================================================================

#[async_trait]
impl ItemStore for MemoryStore {
    async fn create_item(&mut self, item: &Item) -> StoreResult<()> {
        self.check("create_item")?;
        self.items.push(item.clone());
        Ok(())
    }

    async fn get_item(&mut self, filter: &ItemFilter) -> StoreResult<Option<Item>> {
        self.check("get_item")?;
        Ok(self.items.iter().find(|i| filter.matches(i)).cloned())
    }

    async fn find_items(&mut self, filter: &ItemFilter) -> StoreResult<Vec<Item>> {
        self.check("find_items")?;
        Ok(self.items.iter().filter(|i| filter.matches(i)).cloned().collect())
    }

    async fn count_items(&mut self, filter: &ItemFilter) -> StoreResult<i64> {
        self.check("count_items")?;
        Ok(self.items.iter().filter(|i| filter.matches(i)).count() as i64)
    }

    async fn sum_item_quantity(&mut self, filter: &ItemFilter) -> StoreResult<i64> {
        self.check("sum_item_quantity")?;
        Ok(self
            .items
            .iter()
            .filter(|i| filter.matches(i))
            .map(|i| i.quantity)
            .sum())
    }

    async fn sum_item_order_price(&mut self, filter: &ItemFilter) -> StoreResult<Money> {
        self.check("sum_item_order_price")?;
        Ok(self
            .items
            .iter()
            .filter(|i| filter.matches(i))
            .map(Item::order_price)
            .sum())
    }

    async fn count_item_sellers(&mut self, filter: &ItemFilter) -> StoreResult<i64> {
        self.check("count_item_sellers")?;
        let sellers: HashSet<i64> = self
            .items
            .iter()
            .filter(|i| filter.matches(i))
            .map(|i| i.seller_id)
            .collect();
        Ok(sellers.len() as i64)
    }

    async fn delete_items(&mut self, filter: &ItemFilter) -> StoreResult<u64> {
        self.check("delete_items")?;
        let now = Utc::now();
        let mut affected = 0;
        for item in self.items.iter_mut().filter(|i| filter.matches(i)) {
            item.deleted_at = Some(now);
            affected += 1;
        }
        Ok(affected)
    }
}

// =============================================================================
// VAS Items
// =============================================================================

#[async_trait]
impl VasItemStore for MemoryStore {
    async fn create_vas_item(&mut self, vas_item: &VasItem) -> StoreResult<()> {
        self.check("create_vas_item")?;
        self.vas_items.push(vas_item.clone());
        Ok(())
    }

    async fn get_vas_item(&mut self, filter: &VasItemFilter) -> StoreResult<Option<VasItem>> {
        self.check("get_vas_item")?;
        Ok(self.vas_items.iter().find(|v| filter.matches(v)).cloned())
    }

    async fn find_vas_items(&mut self, filter: &VasItemFilter) -> StoreResult<Vec<VasItem>> {
        self.check("find_vas_items")?;
        Ok(self
            .vas_items
            .iter()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect())
    }

    async fn count_vas_items(&mut self, filter: &VasItemFilter) -> StoreResult<i64> {
        self.check("count_vas_items")?;
        Ok(self.vas_items.iter().filter(|v| filter.matches(v)).count() as i64)
    }

    async fn delete_vas_items(&mut self, filter: &VasItemFilter) -> StoreResult<u64> {
        self.check("delete_vas_items")?;
        let now = Utc::now();
        let mut affected = 0;
        for vas_item in self.vas_items.iter_mut().filter(|v| filter.matches(v)) {
            vas_item.deleted_at = Some(now);
            affected += 1;
        }
        Ok(affected)
    }
}

// =============================================================================
// Links
// =============================================================================

#[async_trait]
impl ItemVasItemStore for MemoryStore {
    async fn create_link(&mut self, link: &ItemVasItem) -> StoreResult<()> {
        self.check("create_link")?;
        self.links.push(link.clone());
        Ok(())
    }

    async fn find_links(&mut self, filter: &ItemVasItemFilter) -> StoreResult<Vec<ItemVasItem>> {
        self.check("find_links")?;
        Ok(self.links.iter().filter(|l| filter.matches(l)).cloned().collect())
    }

    async fn count_links(&mut self, filter: &ItemVasItemFilter) -> StoreResult<i64> {
        self.check("count_links")?;
        Ok(self.links.iter().filter(|l| filter.matches(l)).count() as i64)
    }

    async fn linked_vas_items(&mut self, filter: &ItemVasItemFilter) -> StoreResult<Vec<VasItem>> {
        self.check("linked_vas_items")?;
        Ok(self
            .links
            .iter()
            .filter(|l| filter.matches(l))
            .filter_map(|l| self.live_vas_item(l.vas_item_id).cloned())
            .collect())
    }

    async fn delete_links(&mut self, filter: &ItemVasItemFilter) -> StoreResult<u64> {
        self.check("delete_links")?;
        let now = Utc::now();
        let mut affected = 0;
        for link in self.links.iter_mut().filter(|l| filter.matches(l)) {
            link.deleted_at = Some(now);
            affected += 1;
        }
        Ok(affected)
    }
}

// =============================================================================
// Aggregates
// =============================================================================

#[async_trait]
impl PriceAggregator for MemoryStore {
    async fn total_cart_price(&mut self) -> StoreResult<Money> {
        self.check("total_cart_price")?;

        let items: Money = self
            .items
            .iter()
            .filter(|i| i.is_live())
            .map(Item::order_price)
            .sum();

        let vas_items: Money = self
            .links
            .iter()
            .filter(|l| l.is_live())
            .filter_map(|l| self.live_vas_item(l.vas_item_id))
            .map(VasItem::order_price)
            .sum();

        Ok(items + vas_items)
    }

    async fn total_vas_quantity_on_item(&mut self, item_id: i64) -> StoreResult<i64> {
        self.check("total_vas_quantity_on_item")?;
        let filter = ItemVasItemFilter::all().item_id(item_id);
        Ok(self
            .links
            .iter()
            .filter(|l| filter.matches(l))
            .filter_map(|l| self.live_vas_item(l.vas_item_id))
            .map(|v| v.quantity)
            .sum())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddItem, AddVasItem};

    fn item(item_id: i64, category_id: i64, seller_id: i64, cents: i64, quantity: i64) -> Item {
        Item::from_command(&AddItem {
            item_id,
            category_id,
            seller_id,
            price: Money::from_cents(cents),
            quantity,
        })
    }

    fn vas_item(vas_item_id: i64, cents: i64, quantity: i64) -> VasItem {
        VasItem::from_command(&AddVasItem {
            item_id: 1,
            vas_item_id,
            category_id: 3242,
            seller_id: 5003,
            price: Money::from_cents(cents),
            quantity,
        })
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_are_invisible() {
        let mut store = MemoryStore::new();
        store.create_item(&item(1, 1001, 1, 1000, 2)).await.unwrap();
        store.create_item(&item(2, 1001, 1, 500, 1)).await.unwrap();

        let removed = store
            .delete_items(&ItemFilter::all().item_id(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);

        assert_eq!(store.count_items(&ItemFilter::all()).await.unwrap(), 1);
        assert!(!store.item_exists(&ItemFilter::all().item_id(1)).await.unwrap());
        assert_eq!(store.row_counts().0, 2);
    }

    #[tokio::test]
    async fn test_total_cart_price_counts_vas_once_per_live_link() {
        let mut store = MemoryStore::new();
        store.create_item(&item(1, 1001, 1, 10_000, 1)).await.unwrap();
        store.create_item(&item(2, 3004, 1, 20_000, 2)).await.unwrap();
        store.create_vas_item(&vas_item(9, 1_000, 2)).await.unwrap();
        store.create_link(&ItemVasItem::new(1, 9)).await.unwrap();
        store.create_link(&ItemVasItem::new(2, 9)).await.unwrap();

        // 100.00 + 400.00 + 2 × 20.00
        assert_eq!(store.total_cart_price().await.unwrap().cents(), 54_000);
        assert_eq!(store.total_vas_quantity_on_item(1).await.unwrap(), 2);

        store
            .delete_links(&ItemVasItemFilter::all().item_id(1))
            .await
            .unwrap();
        assert_eq!(store.total_cart_price().await.unwrap().cents(), 52_000);
        assert_eq!(store.total_vas_quantity_on_item(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seller_count() {
        let mut store = MemoryStore::new();
        assert_eq!(store.count_item_sellers(&ItemFilter::all()).await.unwrap(), 0);

        store.create_item(&item(1, 1001, 7, 1000, 1)).await.unwrap();
        store.create_item(&item(2, 1001, 7, 1000, 1)).await.unwrap();
        assert_eq!(store.count_item_sellers(&ItemFilter::all()).await.unwrap(), 1);

        store.create_item(&item(3, 1001, 8, 1000, 1)).await.unwrap();
        assert_eq!(store.count_item_sellers(&ItemFilter::all()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fail_on_only_affects_named_operation() {
        let mut store = MemoryStore::new().fail_on("count_items");

        let err = store.count_items(&ItemFilter::all()).await.unwrap_err();
        assert!(matches!(err, StoreError::Simulated { operation: "count_items" }));
        assert!(store.find_items(&ItemFilter::all()).await.is_ok());

        store.heal();
        assert_eq!(store.count_items(&ItemFilter::all()).await.unwrap(), 0);
    }
}
