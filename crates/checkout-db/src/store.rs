//! # SQLite Cart Store
//!
//! [`CartStore`](checkout_core::CartStore) over one borrowed SQLite connection.
//!
//! ## Connection Scoping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  let mut tx = db.begin().await?;                                       │
//! │  let mut store = SqliteCartStore::with_tx(&mut tx);  ── mutation       │
//! │                                                                         │
//! │  let mut conn = db.acquire().await?;                                   │
//! │  let mut store = SqliteCartStore::new(&mut conn);    ── display        │
//! │                                                                         │
//! │  Either way the store only holds `&mut SqliteConnection`, so every     │
//! │  query it issues runs on that connection, inside that transaction.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are assembled with `QueryBuilder` because filters are optional
//! conjunctions. Every statement carries `deleted_at IS NULL`; every delete
//! is an `UPDATE ... SET deleted_at`. Rows come back in insertion order
//! (`rowid`).

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, Transaction};
use tracing::debug;

use checkout_core::{
    Item, ItemFilter, ItemStore, ItemVasItem, ItemVasItemFilter, ItemVasItemStore, Money,
    PriceAggregator, StoreError, StoreResult, VasItem, VasItemFilter, VasItemStore,
};

use crate::error::DbError;

const ITEM_COLUMNS: &str =
    "id, item_id, category_id, seller_id, price_cents, quantity, created_at, deleted_at";

const VAS_ITEM_COLUMNS: &str = "v.id AS id, v.vas_item_id AS vas_item_id, \
    v.category_id AS category_id, v.seller_id AS seller_id, v.price_cents AS price_cents, \
    v.quantity AS quantity, v.created_at AS created_at, v.deleted_at AS deleted_at";

const LINK_COLUMNS: &str = "id, item_id, vas_item_id, created_at, deleted_at";

/// Cart store bound to one connection (pooled or transactional).
pub struct SqliteCartStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteCartStore<'c> {
    /// Wraps a live connection, e.g. a `PoolConnection` via deref.
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        SqliteCartStore { conn }
    }

    /// Wraps an open transaction. Nothing is visible to other connections
    /// until the caller commits.
    pub fn with_tx(tx: &'c mut Transaction<'_, Sqlite>) -> Self {
        SqliteCartStore { conn: &mut **tx }
    }
}

fn store_err(err: sqlx::Error) -> StoreError {
    DbError::from(err).into()
}

// =============================================================================
// Filter Rendering
// =============================================================================

fn push_item_filter(qb: &mut QueryBuilder<'static, Sqlite>, filter: &ItemFilter) {
    qb.push(" WHERE deleted_at IS NULL");
    if let Some(id) = &filter.id {
        qb.push(" AND id = ").push_bind(id.clone());
    }
    if let Some(item_id) = filter.item_id {
        qb.push(" AND item_id = ").push_bind(item_id);
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(category_id) = filter.category_id_not {
        qb.push(" AND category_id <> ").push_bind(category_id);
    }
    if let Some(seller_id) = filter.seller_id {
        qb.push(" AND seller_id = ").push_bind(seller_id);
    }
    if let Some(price) = filter.price {
        qb.push(" AND price_cents = ").push_bind(price.cents());
    }
    if let Some(quantity) = filter.quantity {
        qb.push(" AND quantity = ").push_bind(quantity);
    }
}

/// `prefix` is the table alias with its dot (`"v."`) or empty.
fn push_vas_item_filter(qb: &mut QueryBuilder<'static, Sqlite>, filter: &VasItemFilter, prefix: &str) {
    qb.push(format!(" WHERE {prefix}deleted_at IS NULL"));
    if let Some(id) = &filter.id {
        qb.push(format!(" AND {prefix}id = ")).push_bind(id.clone());
    }
    if let Some(vas_item_id) = filter.vas_item_id {
        qb.push(format!(" AND {prefix}vas_item_id = ")).push_bind(vas_item_id);
    }
    if let Some(category_id) = filter.category_id {
        qb.push(format!(" AND {prefix}category_id = ")).push_bind(category_id);
    }
    if let Some(category_id) = filter.category_id_not {
        qb.push(format!(" AND {prefix}category_id <> ")).push_bind(category_id);
    }
    if let Some(seller_id) = filter.seller_id {
        qb.push(format!(" AND {prefix}seller_id = ")).push_bind(seller_id);
    }
    if let Some(price) = filter.price {
        qb.push(format!(" AND {prefix}price_cents = ")).push_bind(price.cents());
    }
    if let Some(quantity) = filter.quantity {
        qb.push(format!(" AND {prefix}quantity = ")).push_bind(quantity);
    }
}

fn push_link_filter(qb: &mut QueryBuilder<'static, Sqlite>, filter: &ItemVasItemFilter, prefix: &str) {
    qb.push(format!(" WHERE {prefix}deleted_at IS NULL"));
    if let Some(id) = &filter.id {
        qb.push(format!(" AND {prefix}id = ")).push_bind(id.clone());
    }
    if let Some(item_id) = filter.item_id {
        qb.push(format!(" AND {prefix}item_id = ")).push_bind(item_id);
    }
    if let Some(vas_item_id) = filter.vas_item_id {
        qb.push(format!(" AND {prefix}vas_item_id = ")).push_bind(vas_item_id);
    }
}

// =============================================================================
// Items
// =============================================================================

#[async_trait]
impl<'c> ItemStore for SqliteCartStore<'c> {
    async fn create_item(&mut self, item: &Item) -> StoreResult<()> {
        debug!(item_id = item.item_id, "store: create_item");

        sqlx::query(
            r#"
            INSERT INTO items (id, item_id, category_id, seller_id, price_cents, quantity, created_at, deleted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(item.item_id)
        .bind(item.category_id)
        .bind(item.seller_id)
        .bind(item.price.cents())
        .bind(item.quantity)
        .bind(item.created_at)
        .bind(item.deleted_at)
        .execute(&mut *self.conn)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn get_item(&mut self, filter: &ItemFilter) -> StoreResult<Option<Item>> {
        debug!(?filter, "store: get_item");

        let mut qb = QueryBuilder::new(format!("SELECT {ITEM_COLUMNS} FROM items"));
        push_item_filter(&mut qb, filter);
        qb.push(" ORDER BY rowid LIMIT 1");

        qb.build_query_as::<Item>()
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn find_items(&mut self, filter: &ItemFilter) -> StoreResult<Vec<Item>> {
        debug!(?filter, "store: find_items");

        let mut qb = QueryBuilder::new(format!("SELECT {ITEM_COLUMNS} FROM items"));
        push_item_filter(&mut qb, filter);
        qb.push(" ORDER BY rowid");

        qb.build_query_as::<Item>()
            .fetch_all(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn count_items(&mut self, filter: &ItemFilter) -> StoreResult<i64> {
        debug!(?filter, "store: count_items");

        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM items");
        push_item_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn sum_item_quantity(&mut self, filter: &ItemFilter) -> StoreResult<i64> {
        debug!(?filter, "store: sum_item_quantity");

        let mut qb = QueryBuilder::new("SELECT COALESCE(SUM(quantity), 0) FROM items");
        push_item_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn sum_item_order_price(&mut self, filter: &ItemFilter) -> StoreResult<Money> {
        debug!(?filter, "store: sum_item_order_price");

        let mut qb = QueryBuilder::new("SELECT COALESCE(SUM(price_cents * quantity), 0) FROM items");
        push_item_filter(&mut qb, filter);

        let cents = qb
            .build_query_scalar::<i64>()
            .fetch_one(&mut *self.conn)
            .await
            .map_err(store_err)?;
        Ok(Money::from_cents(cents))
    }

    async fn count_item_sellers(&mut self, filter: &ItemFilter) -> StoreResult<i64> {
        debug!(?filter, "store: count_item_sellers");

        let mut qb = QueryBuilder::new("SELECT COUNT(DISTINCT seller_id) FROM items");
        push_item_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn delete_items(&mut self, filter: &ItemFilter) -> StoreResult<u64> {
        debug!(?filter, "store: delete_items");

        let mut qb = QueryBuilder::new("UPDATE items SET deleted_at = ");
        qb.push_bind(Utc::now());
        push_item_filter(&mut qb, filter);

        let result = qb
            .build()
            .execute(&mut *self.conn)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// VAS Items
// =============================================================================

#[async_trait]
impl<'c> VasItemStore for SqliteCartStore<'c> {
    async fn create_vas_item(&mut self, vas_item: &VasItem) -> StoreResult<()> {
        debug!(vas_item_id = vas_item.vas_item_id, "store: create_vas_item");

        sqlx::query(
            r#"
            INSERT INTO vas_items (id, vas_item_id, category_id, seller_id, price_cents, quantity, created_at, deleted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&vas_item.id)
        .bind(vas_item.vas_item_id)
        .bind(vas_item.category_id)
        .bind(vas_item.seller_id)
        .bind(vas_item.price.cents())
        .bind(vas_item.quantity)
        .bind(vas_item.created_at)
        .bind(vas_item.deleted_at)
        .execute(&mut *self.conn)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn get_vas_item(&mut self, filter: &VasItemFilter) -> StoreResult<Option<VasItem>> {
        debug!(?filter, "store: get_vas_item");

        let mut qb = QueryBuilder::new(format!("SELECT {VAS_ITEM_COLUMNS} FROM vas_items v"));
        push_vas_item_filter(&mut qb, filter, "v.");
        qb.push(" ORDER BY v.rowid LIMIT 1");

        qb.build_query_as::<VasItem>()
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn find_vas_items(&mut self, filter: &VasItemFilter) -> StoreResult<Vec<VasItem>> {
        debug!(?filter, "store: find_vas_items");

        let mut qb = QueryBuilder::new(format!("SELECT {VAS_ITEM_COLUMNS} FROM vas_items v"));
        push_vas_item_filter(&mut qb, filter, "v.");
        qb.push(" ORDER BY v.rowid");

        qb.build_query_as::<VasItem>()
            .fetch_all(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn count_vas_items(&mut self, filter: &VasItemFilter) -> StoreResult<i64> {
        debug!(?filter, "store: count_vas_items");

        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM vas_items");
        push_vas_item_filter(&mut qb, filter, "");

        qb.build_query_scalar::<i64>()
            .fetch_one(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn delete_vas_items(&mut self, filter: &VasItemFilter) -> StoreResult<u64> {
        debug!(?filter, "store: delete_vas_items");

        let mut qb = QueryBuilder::new("UPDATE vas_items SET deleted_at = ");
        qb.push_bind(Utc::now());
        push_vas_item_filter(&mut qb, filter, "");

        let result = qb
            .build()
            .execute(&mut *self.conn)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Links
// =============================================================================

#[async_trait]
impl<'c> ItemVasItemStore for SqliteCartStore<'c> {
    async fn create_link(&mut self, link: &ItemVasItem) -> StoreResult<()> {
        debug!(
            item_id = link.item_id,
            vas_item_id = link.vas_item_id,
            "store: create_link"
        );

        sqlx::query(
            r#"
            INSERT INTO item_vas_items (id, item_id, vas_item_id, created_at, deleted_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&link.id)
        .bind(link.item_id)
        .bind(link.vas_item_id)
        .bind(link.created_at)
        .bind(link.deleted_at)
        .execute(&mut *self.conn)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn find_links(&mut self, filter: &ItemVasItemFilter) -> StoreResult<Vec<ItemVasItem>> {
        debug!(?filter, "store: find_links");

        let mut qb = QueryBuilder::new(format!("SELECT {LINK_COLUMNS} FROM item_vas_items"));
        push_link_filter(&mut qb, filter, "");
        qb.push(" ORDER BY rowid");

        qb.build_query_as::<ItemVasItem>()
            .fetch_all(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn count_links(&mut self, filter: &ItemVasItemFilter) -> StoreResult<i64> {
        debug!(?filter, "store: count_links");

        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM item_vas_items");
        push_link_filter(&mut qb, filter, "");

        qb.build_query_scalar::<i64>()
            .fetch_one(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn linked_vas_items(&mut self, filter: &ItemVasItemFilter) -> StoreResult<Vec<VasItem>> {
        debug!(?filter, "store: linked_vas_items");

        let mut qb = QueryBuilder::new(format!(
            "SELECT {VAS_ITEM_COLUMNS} FROM item_vas_items l \
             JOIN vas_items v ON v.vas_item_id = l.vas_item_id AND v.deleted_at IS NULL"
        ));
        push_link_filter(&mut qb, filter, "l.");
        qb.push(" ORDER BY l.rowid");

        qb.build_query_as::<VasItem>()
            .fetch_all(&mut *self.conn)
            .await
            .map_err(store_err)
    }

    async fn delete_links(&mut self, filter: &ItemVasItemFilter) -> StoreResult<u64> {
        debug!(?filter, "store: delete_links");

        let mut qb = QueryBuilder::new("UPDATE item_vas_items SET deleted_at = ");
        qb.push_bind(Utc::now());
        push_link_filter(&mut qb, filter, "");

        let result = qb
            .build()
            .execute(&mut *self.conn)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Aggregates
// =============================================================================

#[async_trait]
impl<'c> PriceAggregator for SqliteCartStore<'c> {
    async fn total_cart_price(&mut self) -> StoreResult<Money> {
        debug!("store: total_cart_price");

        let cents: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COALESCE(SUM(price_cents * quantity), 0)
                   FROM items
                  WHERE deleted_at IS NULL)
              + (SELECT COALESCE(SUM(v.price_cents * v.quantity), 0)
                   FROM item_vas_items l
                   JOIN vas_items v ON v.vas_item_id = l.vas_item_id
                  WHERE l.deleted_at IS NULL AND v.deleted_at IS NULL)
            "#,
        )
        .fetch_one(&mut *self.conn)
        .await
        .map_err(store_err)?;

        Ok(Money::from_cents(cents))
    }

    async fn total_vas_quantity_on_item(&mut self, item_id: i64) -> StoreResult<i64> {
        debug!(item_id, "store: total_vas_quantity_on_item");

        sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(v.quantity), 0)
              FROM item_vas_items l
              JOIN vas_items v ON v.vas_item_id = l.vas_item_id
             WHERE l.item_id = ?1
               AND l.deleted_at IS NULL
               AND v.deleted_at IS NULL
            "#,
        )
        .bind(item_id)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(store_err)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use checkout_core::{AddItem, AddVasItem};

    fn item(item_id: i64, category_id: i64, seller_id: i64, cents: i64, quantity: i64) -> Item {
        Item::from_command(&AddItem {
            item_id,
            category_id,
            seller_id,
            price: Money::from_cents(cents),
            quantity,
        })
    }

    #[tokio::test]
    async fn test_item_round_trip_and_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = SqliteCartStore::new(&mut conn);

        let first = item(1, 1001, 10, 2045, 1);
        store.create_item(&first).await.unwrap();
        store.create_item(&item(2, 7889, 11, 350, 3)).await.unwrap();

        let found = store
            .get_item(&ItemFilter::all().item_id(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.price, Money::from_cents(2045));
        assert!(found.deleted_at.is_none());

        let non_digital = ItemFilter::all().category_not(7889);
        assert_eq!(store.count_items(&non_digital).await.unwrap(), 1);
        assert_eq!(store.sum_item_quantity(&ItemFilter::all()).await.unwrap(), 4);
        assert_eq!(store.count_item_sellers(&ItemFilter::all()).await.unwrap(), 2);
        assert_eq!(
            store.sum_item_order_price(&ItemFilter::all()).await.unwrap(),
            Money::from_cents(2045 + 1050)
        );

        let ids: Vec<i64> = store
            .find_items(&ItemFilter::all())
            .await
            .unwrap()
            .iter()
            .map(|i| i.item_id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_soft_delete_frees_business_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = SqliteCartStore::new(&mut conn);

        store.create_item(&item(1, 1001, 10, 100, 1)).await.unwrap();
        let err = store.create_item(&item(1, 1001, 10, 100, 1)).await;
        assert!(err.is_err());

        assert_eq!(store.delete_all_items().await.unwrap(), 1);
        assert!(!store.item_exists(&ItemFilter::all()).await.unwrap());
        store.create_item(&item(1, 1001, 10, 100, 1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_aggregates_join_live_rows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = SqliteCartStore::new(&mut conn);

        store.create_item(&item(1, 1001, 10, 10_000, 1)).await.unwrap();
        store.create_item(&item(2, 3004, 10, 20_000, 1)).await.unwrap();
        let vas = VasItem::from_command(&AddVasItem {
            item_id: 1,
            vas_item_id: 9,
            category_id: 3242,
            seller_id: 5003,
            price: Money::from_cents(1_000),
            quantity: 2,
        });
        store.create_vas_item(&vas).await.unwrap();
        store.create_link(&ItemVasItem::new(1, 9)).await.unwrap();
        store.create_link(&ItemVasItem::new(2, 9)).await.unwrap();

        assert_eq!(store.total_cart_price().await.unwrap().cents(), 34_000);
        assert_eq!(store.total_vas_quantity_on_item(2).await.unwrap(), 2);

        let linked = store
            .linked_vas_items(&ItemVasItemFilter::all().item_id(1))
            .await
            .unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].vas_item_id, 9);

        store
            .delete_links(&ItemVasItemFilter::pair(2, 9))
            .await
            .unwrap();
        assert_eq!(store.total_cart_price().await.unwrap().cents(), 32_000);
        assert_eq!(store.find_links(&ItemVasItemFilter::all()).await.unwrap().len(), 1);
    }
}
