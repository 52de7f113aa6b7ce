//! # Checkout Service
//!
//! Owns the transaction boundary around every cart mutation.
//!
//! ## Mutation Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item / add_vas_item / remove_item / reset_cart                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write_gate.lock()        one in-process mutation at a time            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.begin()                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartEngine::<op>(&mut SqliteCartStore::with_tx(&mut tx))               │
//! │       │                                                                 │
//! │       ├── Ok  ──► tx.commit()                                          │
//! │       └── Err ──► tx.rollback()  (failure logged, original error kept) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  gate released                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Display takes neither the gate nor a transaction; it reads through a
//! live pool connection.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use checkout_core::{AddItem, AddVasItem, CartEngine, CartResult, CartSnapshot, Outcome};

use crate::error::{DbError, ServiceResult};
use crate::pool::Database;
use crate::store::SqliteCartStore;

/// One cart mutation, run inside its own transaction.
#[derive(Debug, Clone)]
pub enum Mutation {
    AddItem(AddItem),
    AddVasItem(AddVasItem),
    RemoveItem { item_id: i64 },
    ResetCart,
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddItem(_) => "add_item",
            Mutation::AddVasItem(_) => "add_vas_item",
            Mutation::RemoveItem { .. } => "remove_item",
            Mutation::ResetCart => "reset_cart",
        }
    }
}

/// Cart operations over a SQLite database.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./checkout.db")).await?;
/// let service = db.checkout(CartEngine::new(policy));
///
/// service.add_item(cmd).await?;
/// let snapshot = service.display_cart().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    engine: CartEngine,
    write_gate: Arc<Mutex<()>>,
}

impl CheckoutService {
    pub fn new(db: Database, engine: CartEngine) -> Self {
        CheckoutService {
            db,
            engine,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn engine(&self) -> &CartEngine {
        &self.engine
    }

    pub async fn add_item(&self, cmd: AddItem) -> ServiceResult<Outcome> {
        self.run(Mutation::AddItem(cmd)).await
    }

    pub async fn add_vas_item(&self, cmd: AddVasItem) -> ServiceResult<Outcome> {
        self.run(Mutation::AddVasItem(cmd)).await
    }

    pub async fn remove_item(&self, item_id: i64) -> ServiceResult<Outcome> {
        self.run(Mutation::RemoveItem { item_id }).await
    }

    pub async fn reset_cart(&self) -> ServiceResult<Outcome> {
        self.run(Mutation::ResetCart).await
    }

    /// Priced snapshot of the live cart.
    pub async fn display_cart(&self) -> ServiceResult<CartSnapshot> {
        let mut conn = self.db.acquire().await?;
        let mut store = SqliteCartStore::new(&mut conn);
        Ok(self.engine.display_cart(&mut store).await?)
    }

    /// Runs one mutation in its own transaction under the write gate.
    pub async fn run(&self, mutation: Mutation) -> ServiceResult<Outcome> {
        let operation = mutation.name();
        let _gate = self.write_gate.lock().await;
        debug!(operation, "Write gate acquired");

        let mut tx = self.db.begin().await?;

        let result: CartResult<Outcome> = {
            let mut store = SqliteCartStore::with_tx(&mut tx);
            match mutation {
                Mutation::AddItem(cmd) => self.engine.add_item(&mut store, cmd).await,
                Mutation::AddVasItem(cmd) => self.engine.add_vas_item(&mut store, cmd).await,
                Mutation::RemoveItem { item_id } => {
                    self.engine.remove_item(&mut store, item_id).await
                }
                Mutation::ResetCart => self.engine.reset_cart(&mut store).await,
            }
        };

        match result {
            Ok(outcome) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
                info!(operation, "Transaction committed");
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(operation, error = %rollback_err, "Rollback failed");
                } else {
                    debug!(operation, "Transaction rolled back");
                }
                Err(err.into())
            }
        }
    }
}
