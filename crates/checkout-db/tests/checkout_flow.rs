//! End-to-end cart scenarios against an in-memory SQLite database.

use checkout_core::{AddItem, AddVasItem, CartEngine, CartError, CartPolicy, Money, Outcome};
use checkout_db::{CheckoutService, Database, DbConfig, ServiceError};

async fn service_with(policy: CartPolicy) -> (Database, CheckoutService) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let service = db.checkout(CartEngine::new(policy));
    (db, service)
}

async fn service() -> (Database, CheckoutService) {
    service_with(CartPolicy::default()).await
}

fn item(item_id: i64, category_id: i64, seller_id: i64, price: &str, quantity: i64) -> AddItem {
    AddItem {
        item_id,
        category_id,
        seller_id,
        price: price.parse().unwrap(),
        quantity,
    }
}

fn vas(item_id: i64, vas_item_id: i64, price: &str, quantity: i64) -> AddVasItem {
    AddVasItem {
        item_id,
        vas_item_id,
        category_id: 3242,
        seller_id: 5003,
        price: price.parse().unwrap(),
        quantity,
    }
}

async fn count(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .unwrap()
}

async fn count_live(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table} WHERE deleted_at IS NULL"
    ))
    .fetch_one(db.pool())
    .await
    .unwrap()
}

fn cart_error(err: ServiceError) -> CartError {
    match err {
        ServiceError::Cart(err) => err,
        ServiceError::Db(err) => panic!("unexpected database error: {err}"),
    }
}

// =============================================================================
// Add Item
// =============================================================================

#[tokio::test]
async fn add_item_then_display() {
    let (_db, service) = service().await;

    let outcome = service
        .add_item(item(1, 1001, 10, "16.34", 3))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::ItemAdded);
    assert_eq!(outcome.message(), "item added successfully");

    let snapshot = service.display_cart().await.unwrap();
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].price, Money::from_cents(1634));
    assert_eq!(snapshot.gross_price(), Money::from_cents(4902));
    // the 250.00 tier clamps to the whole 49.02
    assert_eq!(snapshot.total_discount, Money::from_cents(4902));
    assert!(snapshot.total_price.is_zero());
}

#[tokio::test]
async fn duplicate_item_is_rejected() {
    let (db, service) = service().await;
    service.add_item(item(1, 1001, 10, "10", 1)).await.unwrap();

    let err = cart_error(service.add_item(item(1, 1001, 10, "10", 1)).await.unwrap_err());
    assert_eq!(err, CartError::ItemAlreadyExists { item_id: 1 });
    assert_eq!(count(&db, "items").await, 1);
}

#[tokio::test]
async fn digital_and_default_items_do_not_mix() {
    let (_db, service) = service().await;
    service.add_item(item(1, 7889, 10, "10", 1)).await.unwrap();

    let err = service
        .add_item(item(2, 1001, 10, "10", 1))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(
        err.public_message(),
        "cannot add a default item if digital item exists in cart"
    );
}

#[tokio::test]
async fn caps_hold_after_many_adds() {
    let (db, service) = service().await;

    let mut accepted = 0;
    for item_id in 1..=15 {
        if service
            .add_item(item(item_id, 1001, 10, "1", 4))
            .await
            .is_ok()
        {
            accepted += 1;
        }
    }

    // 7 × 4 = 28, an eighth line would make 32 > 30
    assert_eq!(accepted, 7);
    assert!(count_live(&db, "items").await <= 10);
    let quantity: i64 =
        sqlx::query_scalar("SELECT SUM(quantity) FROM items WHERE deleted_at IS NULL")
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert!(quantity <= 30);
}

#[tokio::test]
async fn concurrent_adds_respect_unique_cap() {
    let policy = CartPolicy {
        max_unique_items: 1,
        ..CartPolicy::default()
    };
    let (db, service) = service_with(policy).await;

    let a = service.clone();
    let b = service.clone();
    let (first, second) = tokio::join!(
        a.add_item(item(1, 1001, 10, "10", 1)),
        b.add_item(item(2, 1001, 10, "10", 1)),
    );

    assert_eq!(
        [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
        1
    );
    assert_eq!(count_live(&db, "items").await, 1);
}

// =============================================================================
// Add VAS Item
// =============================================================================

#[tokio::test]
async fn vas_catalog_row_is_created_once() {
    let (db, service) = service().await;
    service.add_item(item(1, 1001, 10, "100", 1)).await.unwrap();
    service.add_item(item(2, 3004, 10, "100", 1)).await.unwrap();

    let outcome = service.add_vas_item(vas(1, 20, "10", 1)).await.unwrap();
    assert_eq!(outcome.message(), "vas-item added successfully");
    service.add_vas_item(vas(2, 20, "10", 1)).await.unwrap();

    assert_eq!(count(&db, "vas_items").await, 1);
    assert_eq!(count(&db, "item_vas_items").await, 2);

    let err = cart_error(service.add_vas_item(vas(1, 20, "10", 1)).await.unwrap_err());
    assert!(matches!(err, CartError::VasItemAlreadyAttached { .. }));
    assert_eq!(count(&db, "item_vas_items").await, 2);
}

#[tokio::test]
async fn vas_item_for_missing_item_is_not_found() {
    let (_db, service) = service().await;

    let err = service.add_vas_item(vas(5, 20, "10", 1)).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert_eq!(
        err.public_message(),
        "cannot add vas-item, item 5 does not exist"
    );
}

#[tokio::test]
async fn failed_link_write_rolls_back_catalog_row() {
    let (db, service) = service().await;
    service.add_item(item(1, 1001, 10, "100", 1)).await.unwrap();

    sqlx::query(
        "CREATE TRIGGER reject_links BEFORE INSERT ON item_vas_items \
         BEGIN SELECT RAISE(ABORT, 'links disabled'); END",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let err = service.add_vas_item(vas(1, 20, "10", 1)).await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.public_message(), "internal server error");

    assert_eq!(count(&db, "vas_items").await, 0);
    assert_eq!(count(&db, "item_vas_items").await, 0);
}

#[tokio::test]
async fn shared_vas_row_cannot_push_cart_over_ceiling() {
    let (db, service) = service().await;
    service.add_item(item(1, 1001, 10, "200000", 1)).await.unwrap();
    service.add_vas_item(vas(1, 20, "50000", 3)).await.unwrap();
    service.add_item(item(2, 3004, 10, "100000", 1)).await.unwrap();

    let err = cart_error(service.add_vas_item(vas(2, 20, "1", 1)).await.unwrap_err());
    assert!(matches!(err, CartError::CartPriceLimit { .. }));
    assert_eq!(count(&db, "item_vas_items").await, 1);

    let snapshot = service.display_cart().await.unwrap();
    assert_eq!(snapshot.gross_price(), Money::from_major_minor(450_000, 0));
}

// =============================================================================
// Remove Item
// =============================================================================

#[tokio::test]
async fn remove_item_keeps_shared_vas_row() {
    let (db, service) = service().await;
    service.add_item(item(1, 1001, 10, "100", 1)).await.unwrap();
    service.add_item(item(2, 1001, 10, "200", 1)).await.unwrap();
    service.add_vas_item(vas(1, 20, "10", 2)).await.unwrap();
    service.add_vas_item(vas(2, 20, "10", 2)).await.unwrap();

    let before = service.display_cart().await.unwrap();
    assert_eq!(before.gross_price(), Money::from_major_minor(340, 0));

    let outcome = service.remove_item(1).await.unwrap();
    assert_eq!(outcome.message(), "item removed successfully");

    let after = service.display_cart().await.unwrap();
    assert_eq!(after.items.len(), 1);
    assert_eq!(after.gross_price(), Money::from_major_minor(220, 0));
    assert_eq!(count_live(&db, "vas_items").await, 1);
    assert_eq!(count_live(&db, "item_vas_items").await, 1);
}

#[tokio::test]
async fn remove_missing_item_changes_nothing() {
    let (db, service) = service().await;
    service.add_item(item(1, 1001, 10, "100", 1)).await.unwrap();

    let err = cart_error(service.remove_item(99).await.unwrap_err());
    assert_eq!(err, CartError::ItemNotFound { item_id: 99 });
    assert_eq!(err.to_string(), "record not found");

    assert_eq!(count(&db, "items").await, 1);
    assert_eq!(count_live(&db, "items").await, 1);
}

// =============================================================================
// Display & Promotions
// =============================================================================

#[tokio::test]
async fn single_seller_cart_earns_ten_percent() {
    let (_db, service) = service().await;
    service.add_item(item(1, 1001, 10, "2000", 2)).await.unwrap();

    let snapshot = service.display_cart().await.unwrap();
    assert_eq!(snapshot.gross_price(), Money::from_major_minor(4000, 0));
    assert_eq!(snapshot.applied_promotion_id, Some(9909));
    assert_eq!(snapshot.total_discount, Money::from_major_minor(400, 0));
    assert_eq!(snapshot.total_price, Money::from_major_minor(3600, 0));
}

#[tokio::test]
async fn small_mixed_seller_cart_earns_tier_discount() {
    let (_db, service) = service().await;
    service.add_item(item(1, 1001, 10, "160", 1)).await.unwrap();
    service.add_item(item(2, 1001, 11, "200", 1)).await.unwrap();

    let snapshot = service.display_cart().await.unwrap();
    assert_eq!(snapshot.gross_price(), Money::from_major_minor(360, 0));
    assert_eq!(snapshot.applied_promotion_id, Some(1232));
    assert_eq!(snapshot.total_discount, Money::from_major_minor(250, 0));
    assert_eq!(snapshot.total_price, Money::from_major_minor(110, 0));
}

#[tokio::test]
async fn category_discount_beats_tier() {
    let (_db, service) = service().await;
    service.add_item(item(1, 3003, 10, "22000", 2)).await.unwrap();
    service.add_item(item(2, 1001, 11, "1", 1)).await.unwrap();

    let snapshot = service.display_cart().await.unwrap();
    assert_eq!(snapshot.gross_price(), Money::from_cents(4_400_100));
    assert_eq!(snapshot.applied_promotion_id, Some(5676));
    assert_eq!(snapshot.total_discount, Money::from_major_minor(2200, 0));
    assert_eq!(snapshot.total_price, Money::from_cents(4_180_100));
}

// =============================================================================
// Reset
// =============================================================================

#[tokio::test]
async fn reset_empties_everything() {
    let (db, service) = service().await;
    service.add_item(item(1, 1001, 10, "100", 1)).await.unwrap();
    service.add_vas_item(vas(1, 20, "10", 1)).await.unwrap();

    let outcome = service.reset_cart().await.unwrap();
    assert_eq!(outcome.message(), "cart emptied successfully");

    assert_eq!(count_live(&db, "items").await, 0);
    assert_eq!(count_live(&db, "vas_items").await, 0);
    assert_eq!(count_live(&db, "item_vas_items").await, 0);
    assert_eq!(count(&db, "items").await, 1);

    let snapshot = service.display_cart().await.unwrap();
    assert!(snapshot.items.is_empty());
    assert!(snapshot.total_price.is_zero());
    assert!(snapshot.total_discount.is_zero());

    // Business ids are free again
    service.add_item(item(1, 1001, 10, "100", 1)).await.unwrap();
    service.add_vas_item(vas(1, 20, "10", 1)).await.unwrap();
}
