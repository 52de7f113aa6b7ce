//! Attach VAS items to base items.

use tracing::{debug, info};

use super::{reject, CartEngine, OrInternal, Outcome};
use crate::error::{CartError, CartResult};
use crate::rules;
use crate::store::CartStore;
use crate::types::{AddVasItem, ItemFilter, ItemVasItem, VasItem, VasItemFilter};

impl CartEngine {
    /// Attaches a VAS item to a base item.
    ///
    /// ## Rule Order
    /// ```text
    /// 0. command bounds
    /// 1. pair not already attached
    /// 2. VAS category, then VAS seller
    /// 3. target item exists and accepts VAS items
    /// 4. VAS quantity cap on the item
    /// 5. cart price ceiling, then VAS unit price ≤ item unit price
    /// 6. create the VAS catalog row unless a live one exists
    /// 7. create the link
    /// ```
    ///
    /// A live catalog row for `vas_item_id` is shared, and the cart prices the
    /// link with the row's stored price and quantity. Steps 4 and 5 therefore
    /// check those stored values when the row exists and the command's
    /// values otherwise.
    pub async fn add_vas_item<S>(&self, store: &mut S, cmd: AddVasItem) -> CartResult<Outcome>
    where
        S: CartStore + ?Sized,
    {
        debug!(
            item_id = cmd.item_id,
            vas_item_id = cmd.vas_item_id,
            "Adding vas-item"
        );
        let policy = &self.policy;

        if let Err(err) = cmd.validate() {
            return reject(err.into());
        }

        if rules::vas_item_attached_to_item(store, cmd.item_id, cmd.vas_item_id)
            .await
            .or_internal("vas_item_attached_to_item")?
        {
            return reject(CartError::VasItemAlreadyAttached {
                item_id: cmd.item_id,
                vas_item_id: cmd.vas_item_id,
            });
        }

        if !policy.is_vas_category(cmd.category_id) {
            return reject(CartError::VasCategoryMismatch {
                category_id: cmd.category_id,
            });
        }
        if cmd.seller_id != policy.vas_seller_id {
            return reject(CartError::VasSellerMismatch {
                seller_id: cmd.seller_id,
            });
        }

        let item = match store
            .get_item(&ItemFilter::all().item_id(cmd.item_id))
            .await
            .or_internal("get_item")?
        {
            Some(item) => item,
            None => return reject(CartError::VasTargetNotFound { item_id: cmd.item_id }),
        };
        if !policy.accepts_vas(item.category_id) {
            return reject(CartError::ItemNotSuitableForVas {
                item_id: item.item_id,
                category_id: item.category_id,
            });
        }

        let catalog_filter = VasItemFilter::all().vas_item_id(cmd.vas_item_id);
        let existing = store
            .get_vas_item(&catalog_filter)
            .await
            .or_internal("get_vas_item")?;
        let (price, quantity) = match &existing {
            Some(row) => (row.price, row.quantity),
            None => (cmd.price, cmd.quantity),
        };

        let attached = rules::total_vas_quantity_on_item(store, item.item_id)
            .await
            .or_internal("total_vas_quantity_on_item")?;
        if attached + quantity > policy.max_vas_per_item {
            return reject(CartError::VasItemLimit {
                item_id: item.item_id,
                current: attached,
                max: policy.max_vas_per_item,
            });
        }

        let cart_price = rules::total_cart_price(store)
            .await
            .or_internal("total_cart_price")?;
        if cart_price + price * quantity > policy.max_cart_price {
            return reject(CartError::CartPriceLimit {
                max: policy.max_cart_price,
            });
        }
        if price > item.price {
            return reject(CartError::VasPriceAboveItemPrice {
                vas_price: price,
                item_price: item.price,
            });
        }

        if existing.is_none() {
            let vas_item = VasItem::from_command(&cmd);
            store
                .create_vas_item(&vas_item)
                .await
                .or_internal("create_vas_item")?;
            debug!(vas_item_id = vas_item.vas_item_id, id = %vas_item.id, "Vas-item created");
        }

        let link = ItemVasItem::new(cmd.item_id, cmd.vas_item_id);
        store.create_link(&link).await.or_internal("create_link")?;

        info!(
            item_id = cmd.item_id,
            vas_item_id = cmd.vas_item_id,
            "Vas-item added"
        );
        Ok(Outcome::VasItemAdded)
    }
}
