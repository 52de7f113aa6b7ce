//! Add and remove base items.

use tracing::{debug, info};

use super::{reject, CartEngine, OrInternal, Outcome};
use crate::error::{CartError, CartResult};
use crate::rules;
use crate::store::CartStore;
use crate::types::{AddItem, Item, ItemFilter, ItemVasItemFilter};

impl CartEngine {
    /// Adds a base item after running the item rules in order.
    ///
    /// ## Rule Order
    /// ```text
    /// 0. command bounds
    /// 1. not the VAS category
    /// 2. item_id not already in the cart
    /// 3. digital:     no default items, digital quantity cap
    ///    non-digital: no digital items
    /// 4. cart price ceiling
    /// 5. total quantity cap, unique item cap
    /// 6. insert
    /// ```
    pub async fn add_item<S>(&self, store: &mut S, cmd: AddItem) -> CartResult<Outcome>
    where
        S: CartStore + ?Sized,
    {
        debug!(item_id = cmd.item_id, category_id = cmd.category_id, "Adding item");
        let policy = &self.policy;

        if let Err(err) = cmd.validate() {
            return reject(err.into());
        }

        if policy.is_vas_category(cmd.category_id) {
            return reject(CartError::VasItemViaItemPath);
        }

        if rules::item_exists(store, cmd.item_id).await.or_internal("item_exists")? {
            return reject(CartError::ItemAlreadyExists { item_id: cmd.item_id });
        }

        if policy.is_digital(cmd.category_id) {
            if rules::any_non_digital_item_exists(store, policy)
                .await
                .or_internal("any_non_digital_item_exists")?
            {
                return reject(CartError::DigitalWithDefaultItems);
            }

            let digital_quantity = rules::total_quantity(store, Some(policy.digital_category_id))
                .await
                .or_internal("total_quantity")?;
            if digital_quantity + cmd.quantity > policy.max_digital_items {
                return reject(CartError::DigitalItemLimit {
                    max: policy.max_digital_items,
                });
            }
        } else if rules::any_digital_item_exists(store, policy)
            .await
            .or_internal("any_digital_item_exists")?
        {
            return reject(CartError::DefaultWithDigitalItems);
        }

        let cart_price = rules::total_cart_price(store)
            .await
            .or_internal("total_cart_price")?;
        if cart_price + cmd.order_price() > policy.max_cart_price {
            return reject(CartError::CartPriceLimit {
                max: policy.max_cart_price,
            });
        }

        let quantity = rules::total_quantity(store, None)
            .await
            .or_internal("total_quantity")?;
        if quantity + cmd.quantity > policy.max_total_quantity {
            return reject(CartError::ItemQuantityLimit {
                max: policy.max_total_quantity,
            });
        }

        let unique = rules::unique_item_count(store)
            .await
            .or_internal("unique_item_count")?;
        if unique >= policy.max_unique_items {
            return reject(CartError::UniqueItemLimit {
                max: policy.max_unique_items,
            });
        }

        let item = Item::from_command(&cmd);
        store.create_item(&item).await.or_internal("create_item")?;

        info!(item_id = item.item_id, id = %item.id, "Item added");
        Ok(Outcome::ItemAdded)
    }

    /// Removes a base item and detaches its VAS items.
    ///
    /// The VAS catalog rows stay; other items may still reference them.
    pub async fn remove_item<S>(&self, store: &mut S, item_id: i64) -> CartResult<Outcome>
    where
        S: CartStore + ?Sized,
    {
        debug!(item_id, "Removing item");

        if !rules::item_exists(store, item_id).await.or_internal("item_exists")? {
            return reject(CartError::ItemNotFound { item_id });
        }

        let detached = store
            .delete_links(&ItemVasItemFilter::all().item_id(item_id))
            .await
            .or_internal("delete_links")?;

        store
            .delete_items(&ItemFilter::all().item_id(item_id))
            .await
            .or_internal("delete_items")?;

        info!(item_id, detached, "Item removed");
        Ok(Outcome::ItemRemoved)
    }
}
