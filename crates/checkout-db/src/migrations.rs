//! # Schema Migrations
//!
//! The cart schema ships inside the binary via `sqlx::migrate!`.
//!
//! ```text
//! crates/checkout-db/migrations/
//! └── 001_initial_schema.sql    items, vas_items, item_vas_items
//!                               + partial unique indexes on live rows
//!
//! Database::new ──(run_migrations = true)──► MIGRATOR.run(pool)
//! checkout-cli migrate ─────────────────────► MIGRATOR.run(pool) + status
//! ```
//!
//! New schema changes go in a new `NNN_description.sql` file; applied files
//! are checksummed by sqlx and must not be edited.

use std::fmt;

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// How far the database schema is from the embedded migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Migrations embedded in this build.
    pub total: usize,
    /// Migrations recorded in `_sqlx_migrations`.
    pub applied: usize,
}

impl MigrationStatus {
    pub fn pending(&self) -> usize {
        self.total.saturating_sub(self.applied)
    }

    pub fn is_current(&self) -> bool {
        self.pending() == 0
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} applied", self.applied, self.total)
    }
}

/// Applies every pending migration. Already-applied ones are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = migration_status(pool).await?;
    debug!(pending = before.pending(), "Running migrations");

    MIGRATOR.run(pool).await?;

    info!(total = before.total, "Schema up to date");
    Ok(())
}

/// Reads the migration bookkeeping table.
///
/// A database that has never been migrated has no bookkeeping table and
/// reports zero applied; any other query failure is returned.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let total = MIGRATOR.migrations.len();

    let has_table: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;

    if !has_table {
        return Ok(MigrationStatus { total, applied: 0 });
    }

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;

    Ok(MigrationStatus {
        total,
        applied: usize::try_from(applied).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_fresh_database_reports_pending() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        let status = migration_status(db.pool()).await.unwrap();
        assert_eq!(status.applied, 0);
        assert_eq!(status.pending(), status.total);
        assert!(!status.is_current());

        run_migrations(db.pool()).await.unwrap();
        let status = migration_status(db.pool()).await.unwrap();
        assert!(status.is_current());
        assert_eq!(status.applied, 1);
        assert_eq!(status.to_string(), "1/1 applied");
    }

    #[tokio::test]
    async fn test_broken_bookkeeping_is_an_error() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        // a table by that name without the expected columns
        sqlx::query("CREATE TABLE _sqlx_migrations (version INTEGER)")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(migration_status(db.pool()).await.is_err());
    }

    #[tokio::test]
    async fn test_rerun_is_harmless() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        run_migrations(db.pool()).await.unwrap();

        let status = migration_status(db.pool()).await.unwrap();
        assert_eq!(status, MigrationStatus { total: 1, applied: 1 });
    }
}
