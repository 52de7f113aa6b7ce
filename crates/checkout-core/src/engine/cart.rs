//! Display and reset the whole cart.

use tracing::{debug, info};

use super::{CartEngine, OrInternal, Outcome};
use crate::error::CartResult;
use crate::rules;
use crate::snapshot::{CartLine, CartSnapshot};
use crate::store::CartStore;
use crate::types::{ItemFilter, ItemVasItemFilter};

impl CartEngine {
    /// Reads the live cart, prices it and applies the best promotion.
    ///
    /// `total_price` in the snapshot is net of the discount.
    pub async fn display_cart<S>(&self, store: &mut S) -> CartResult<CartSnapshot>
    where
        S: CartStore + ?Sized,
    {
        let items = store
            .find_items(&ItemFilter::all())
            .await
            .or_internal("find_items")?;
        if items.is_empty() {
            debug!("Cart is empty");
            return Ok(CartSnapshot::empty());
        }

        let mut lines = Vec::with_capacity(items.len());
        for item in &items {
            let vas_items = store
                .linked_vas_items(&ItemVasItemFilter::all().item_id(item.item_id))
                .await
                .or_internal("linked_vas_items")?;
            lines.push(CartLine::new(item, &vas_items));
        }

        let cart_price = rules::total_cart_price(store)
            .await
            .or_internal("total_cart_price")?;
        let discount = self.apply_promotion(store, cart_price).await?;

        Ok(CartSnapshot {
            items: lines,
            total_price: cart_price - discount.amount,
            applied_promotion_id: Some(discount.promotion.id()),
            total_discount: discount.amount,
        })
    }

    /// Soft-deletes every link, item and VAS item.
    pub async fn reset_cart<S>(&self, store: &mut S) -> CartResult<Outcome>
    where
        S: CartStore + ?Sized,
    {
        let links = store.delete_all_links().await.or_internal("delete_all_links")?;
        let items = store.delete_all_items().await.or_internal("delete_all_items")?;
        let vas_items = store
            .delete_all_vas_items()
            .await
            .or_internal("delete_all_vas_items")?;

        info!(items, vas_items, links, "Cart emptied");
        Ok(Outcome::CartEmptied)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{CartEngine, Outcome};
    use crate::error::CartError;
    use crate::memory::MemoryStore;
    use crate::money::Money;
    use crate::snapshot::CartSnapshot;
    use crate::types::{AddItem, AddVasItem};

    fn item(item_id: i64, category_id: i64, seller_id: i64, price: &str, quantity: i64) -> AddItem {
        AddItem {
            item_id,
            category_id,
            seller_id,
            price: price.parse().unwrap(),
            quantity,
        }
    }

    async fn seeded(engine: &CartEngine) -> MemoryStore {
        let mut store = MemoryStore::new();
        engine
            .add_item(&mut store, item(1, 1001, 10, "2000", 1))
            .await
            .unwrap();
        engine
            .add_item(&mut store, item(2, 3004, 10, "1000", 1))
            .await
            .unwrap();
        engine
            .add_vas_item(
                &mut store,
                AddVasItem {
                    item_id: 1,
                    vas_item_id: 20,
                    category_id: 3242,
                    seller_id: 5003,
                    price: "500".parse().unwrap(),
                    quantity: 2,
                },
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_display_cart() {
        let engine = CartEngine::default();
        let mut store = seeded(&engine).await;

        let snapshot = engine.display_cart(&mut store).await.unwrap();

        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.items[0].item_id, 1);
        assert_eq!(snapshot.items[0].vas_items.len(), 1);
        assert_eq!(snapshot.items[0].vas_items[0].vas_item_id, 20);
        assert!(snapshot.items[1].vas_items.is_empty());

        // 2000 + 1000 + 2 × 500, one seller → 10%
        assert_eq!(snapshot.gross_price(), Money::from_major_minor(4000, 0));
        assert_eq!(snapshot.applied_promotion_id, Some(9909));
        assert_eq!(snapshot.total_discount, Money::from_major_minor(400, 0));
        assert_eq!(snapshot.total_price, Money::from_major_minor(3600, 0));
    }

    #[tokio::test]
    async fn test_display_drops_removed_item_and_its_vas_price() {
        let engine = CartEngine::default();
        let mut store = seeded(&engine).await;
        engine.remove_item(&mut store, 1).await.unwrap();

        let snapshot = engine.display_cart(&mut store).await.unwrap();
        assert_eq!(snapshot.items.len(), 1);
        // 1000 alone: 10% same-seller (100) loses to the 250 tier
        assert_eq!(snapshot.gross_price(), Money::from_major_minor(1000, 0));
        assert_eq!(snapshot.total_price, Money::from_major_minor(750, 0));
        assert_eq!(store.vas_items.iter().filter(|v| v.is_live()).count(), 1);
    }

    #[tokio::test]
    async fn test_reset_then_display_is_empty() {
        let engine = CartEngine::default();
        let mut store = seeded(&engine).await;

        assert_eq!(engine.reset_cart(&mut store).await, Ok(Outcome::CartEmptied));
        assert!(store.items.iter().all(|i| !i.is_live()));
        assert!(store.vas_items.iter().all(|v| !v.is_live()));
        assert!(store.links.iter().all(|l| !l.is_live()));

        let snapshot = engine.display_cart(&mut store).await.unwrap();
        assert_eq!(snapshot, CartSnapshot::empty());
        assert!(snapshot.total_price.is_zero());
        assert!(snapshot.total_discount.is_zero());
    }

    #[tokio::test]
    async fn test_item_ids_are_reusable_after_reset() {
        let engine = CartEngine::default();
        let mut store = seeded(&engine).await;
        engine.reset_cart(&mut store).await.unwrap();

        assert!(engine
            .add_item(&mut store, item(1, 7889, 10, "5", 1))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_display_store_failure() {
        let engine = CartEngine::default();
        let store = seeded(&engine).await;
        let mut store = store.fail_on("linked_vas_items");

        let err = engine.display_cart(&mut store).await.unwrap_err();
        assert_eq!(err, CartError::Internal);
    }
}
