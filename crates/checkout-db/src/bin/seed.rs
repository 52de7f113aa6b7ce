//! # Demonstration Cart Seeder
//!
//! Fills an empty database with a small cart for trying out `display`.
//!
//! ## Usage
//! ```bash
//! # Seed ./checkout.db
//! cargo run -p checkout-db --bin seed
//!
//! # Specify database path
//! cargo run -p checkout-db --bin seed -- --db ./data/checkout.db
//! ```
//!
//! ## Seeded Cart
//! Four furniture/electronics items from seller 6, one shared VAS item and
//! two single-use ones. Every row goes through the cart rules, so the result
//! is a cart the engine itself would have produced.

use std::env;

use checkout_core::{AddItem, AddVasItem, CartEngine, CartPolicy, Money};
use checkout_db::{Database, DbConfig};

/// (item_id, category_id, price, quantity)
const ITEMS: &[(i64, i64, &str, i64)] = &[
    (1, 1001, "120.45", 1),
    (2, 1001, "30.50", 6),
    (3, 3004, "35.50", 1),
    (4, 1001, "1000", 2),
];

/// (item_id, vas_item_id, price, quantity)
const VAS_ITEMS: &[(i64, i64, &str, i64)] = &[
    (1, 1, "50", 2),
    (2, 2, "20.20", 2),
    (2, 3, "10.50", 1),
    (3, 3, "10.50", 1),
];

const SELLER_ID: i64 = 6;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./checkout.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Checkout Demonstration Cart Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./checkout.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Checkout Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let policy = CartPolicy::default();
    let service = db.checkout(CartEngine::new(policy.clone()));

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = service.display_cart().await?;
    if !existing.items.is_empty() {
        println!("⚠ Cart already has {} items", existing.items.len());
        println!("  Skipping seed. Run `checkout-cli reset` to start over.");
        return Ok(());
    }

    for &(item_id, category_id, price, quantity) in ITEMS {
        let cmd = AddItem {
            item_id,
            category_id,
            seller_id: SELLER_ID,
            price: price.parse::<Money>()?,
            quantity,
        };
        let outcome = service.add_item(cmd).await?;
        println!("  item {item_id}: {outcome}");
    }

    for &(item_id, vas_item_id, price, quantity) in VAS_ITEMS {
        let cmd = AddVasItem {
            item_id,
            vas_item_id,
            category_id: policy.vas_category_id,
            seller_id: policy.vas_seller_id,
            price: price.parse::<Money>()?,
            quantity,
        };
        let outcome = service.add_vas_item(cmd).await?;
        println!("  vas-item {vas_item_id} → item {item_id}: {outcome}");
    }

    let snapshot = service.display_cart().await?;

    println!();
    println!("✅ Seed complete!");
    println!("   Items:     {}", snapshot.items.len());
    println!("   Gross:     {}", snapshot.gross_price());
    println!(
        "   Promotion: {} (-{})",
        snapshot.applied_promotion_id.unwrap_or_default(),
        snapshot.total_discount
    );
    println!("   Payable:   {}", snapshot.total_price);

    db.close().await;
    Ok(())
}
