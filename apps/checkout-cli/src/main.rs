//! # checkout-cli
//!
//! Command-line front end for the single-cart checkout engine.
//!
//! Every cart command prints `{"result": bool, "message": ...}` on stdout and
//! logs to stderr. The process exits with 0 on success, 2 when a cart rule
//! rejects the request, 3 when a record is missing and 1 otherwise.
//!
//! ## Usage
//! ```bash
//! checkout-cli add-item --item-id 1 --category-id 1001 --seller-id 6 --price 120.45 --quantity 1
//! checkout-cli add-vas-item --item-id 1 --vas-item-id 20 --category-id 3242 \
//!     --seller-id 5003 --price 50 --quantity 2
//! checkout-cli display
//! checkout-cli remove-item --item-id 1
//! checkout-cli reset
//! checkout-cli migrate
//! ```
//!
//! ## Environment
//! - `CHECKOUT_DATABASE_PATH` - database file (default `./checkout.db`)
//! - `CHECKOUT_MAX_CONNECTIONS` - pool size (default 5)
//! - `CHECKOUT_POLICY_FILE` - TOML file overriding cart policy fields
//! - `CHECKOUT_LOG` / `RUST_LOG` - log filter

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use checkout_core::{AddItem, AddVasItem, CartEngine, Money};
use checkout_db::{Database, Mutation};

use crate::commands::CartCommand;
use crate::config::{CheckoutConfig, DEFAULT_LOG_FILTER};

#[derive(Parser)]
#[command(name = "checkout-cli")]
#[command(about = "Single-cart checkout with promotion pricing", long_about = None)]
struct Cli {
    /// Database file, overrides CHECKOUT_DATABASE_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a base item to the cart
    AddItem {
        #[arg(long)]
        item_id: i64,

        #[arg(long)]
        category_id: i64,

        #[arg(long)]
        seller_id: i64,

        /// Unit price, at most two decimals (e.g. 120.45)
        #[arg(long)]
        price: Money,

        #[arg(long)]
        quantity: i64,
    },

    /// Attach a VAS item to an item already in the cart
    AddVasItem {
        /// Item the VAS item is attached to
        #[arg(long)]
        item_id: i64,

        #[arg(long)]
        vas_item_id: i64,

        #[arg(long)]
        category_id: i64,

        #[arg(long)]
        seller_id: i64,

        #[arg(long)]
        price: Money,

        #[arg(long)]
        quantity: i64,
    },

    /// Remove an item and its VAS attachments
    RemoveItem {
        #[arg(long)]
        item_id: i64,
    },

    /// Show the cart with totals and the applied promotion
    Display,

    /// Empty the cart
    Reset,

    /// Apply pending database migrations and report their status
    Migrate,
}

impl Commands {
    fn into_cart_command(self) -> Option<CartCommand> {
        let command = match self {
            Commands::AddItem {
                item_id,
                category_id,
                seller_id,
                price,
                quantity,
            } => CartCommand::Mutate(Mutation::AddItem(AddItem {
                item_id,
                category_id,
                seller_id,
                price,
                quantity,
            })),
            Commands::AddVasItem {
                item_id,
                vas_item_id,
                category_id,
                seller_id,
                price,
                quantity,
            } => CartCommand::Mutate(Mutation::AddVasItem(AddVasItem {
                item_id,
                vas_item_id,
                category_id,
                seller_id,
                price,
                quantity,
            })),
            Commands::RemoveItem { item_id } => {
                CartCommand::Mutate(Mutation::RemoveItem { item_id })
            }
            Commands::Display => CartCommand::Display,
            Commands::Reset => CartCommand::Mutate(Mutation::ResetCart),
            Commands::Migrate => return None,
        };
        Some(command)
    }
}

fn init_tracing(filter: Option<&str>) {
    let filter = filter
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "checkout-cli failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = CheckoutConfig::load().context("Failed to load configuration")?;
    if let Some(path) = cli.db {
        config.database_path = path;
    }

    init_tracing(config.log_filter.as_deref());

    let policy = config.policy().context("Failed to load cart policy")?;
    let db = Database::new(config.db_config())
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    let code = match cli.command.into_cart_command() {
        Some(command) => {
            let service = db.checkout(CartEngine::new(policy));
            let reply = commands::execute(&service, command).await;
            println!("{}", reply.to_json());
            reply.exit_code()
        }
        None => {
            db.run_migrations().await.context("Failed to run migrations")?;
            let status = db.migration_status().await?;
            info!(applied = status.applied, total = status.total, "Migrations checked");
            println!("Migrations: {status}");
            if status.is_current() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    };

    db.close().await;
    Ok(code)
}
