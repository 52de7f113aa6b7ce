//! # Rule Predicates
//!
//! Reads of current cart state that the engines decide on. Each predicate is
//! a single question asked of the store; none of them writes or caches.

use crate::error::StoreResult;
use crate::money::Money;
use crate::policy::CartPolicy;
use crate::store::CartStore;
use crate::types::{ItemFilter, ItemVasItemFilter};

pub async fn item_exists<S>(store: &mut S, item_id: i64) -> StoreResult<bool>
where
    S: CartStore + ?Sized,
{
    store.item_exists(&ItemFilter::all().item_id(item_id)).await
}

pub async fn vas_item_attached_to_item<S>(
    store: &mut S,
    item_id: i64,
    vas_item_id: i64,
) -> StoreResult<bool>
where
    S: CartStore + ?Sized,
{
    store
        .link_exists(&ItemVasItemFilter::pair(item_id, vas_item_id))
        .await
}

/// Any live item outside the digital category.
pub async fn any_non_digital_item_exists<S>(store: &mut S, policy: &CartPolicy) -> StoreResult<bool>
where
    S: CartStore + ?Sized,
{
    store
        .item_exists(&ItemFilter::all().category_not(policy.digital_category_id))
        .await
}

pub async fn any_digital_item_exists<S>(store: &mut S, policy: &CartPolicy) -> StoreResult<bool>
where
    S: CartStore + ?Sized,
{
    store
        .item_exists(&ItemFilter::all().category(policy.digital_category_id))
        .await
}

/// Summed quantity of live items, optionally restricted to one category.
pub async fn total_quantity<S>(store: &mut S, category_id: Option<i64>) -> StoreResult<i64>
where
    S: CartStore + ?Sized,
{
    let filter = ItemFilter {
        category_id,
        ..ItemFilter::all()
    };
    store.sum_item_quantity(&filter).await
}

pub async fn unique_item_count<S>(store: &mut S) -> StoreResult<i64>
where
    S: CartStore + ?Sized,
{
    store.count_items(&ItemFilter::all()).await
}

pub async fn total_cart_price<S>(store: &mut S) -> StoreResult<Money>
where
    S: CartStore + ?Sized,
{
    store.total_cart_price().await
}

pub async fn total_vas_quantity_on_item<S>(store: &mut S, item_id: i64) -> StoreResult<i64>
where
    S: CartStore + ?Sized,
{
    store.total_vas_quantity_on_item(item_id).await
}

/// At most one distinct seller among live items. An empty cart qualifies.
pub async fn all_items_same_seller<S>(store: &mut S) -> StoreResult<bool>
where
    S: CartStore + ?Sized,
{
    Ok(store.count_item_sellers(&ItemFilter::all()).await? <= 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::ItemStore;
    use crate::types::{AddItem, Item};

    async fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        for (item_id, category_id, seller_id, quantity) in
            [(1, 1001, 10, 2), (2, 3004, 10, 3), (3, 1001, 11, 1)]
        {
            let item = Item::from_command(&AddItem {
                item_id,
                category_id,
                seller_id,
                price: Money::from_cents(1000),
                quantity,
            });
            store.create_item(&item).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_quantities_and_counts() {
        let mut store = seeded().await;
        assert_eq!(total_quantity(&mut store, None).await.unwrap(), 6);
        assert_eq!(total_quantity(&mut store, Some(1001)).await.unwrap(), 3);
        assert_eq!(total_quantity(&mut store, Some(7889)).await.unwrap(), 0);
        assert_eq!(unique_item_count(&mut store).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_digital_mix_predicates() {
        let policy = CartPolicy::default();
        let mut store = seeded().await;
        assert!(any_non_digital_item_exists(&mut store, &policy).await.unwrap());
        assert!(!any_digital_item_exists(&mut store, &policy).await.unwrap());

        let mut empty = MemoryStore::new();
        assert!(!any_non_digital_item_exists(&mut empty, &policy).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_seller() {
        let mut store = seeded().await;
        assert!(!all_items_same_seller(&mut store).await.unwrap());

        let mut empty = MemoryStore::new();
        assert!(all_items_same_seller(&mut empty).await.unwrap());
    }
}
