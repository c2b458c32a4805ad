//! Database engine trait.
//!
//! The core needs exactly this surface from a dialect adapter: connection
//! check, idempotent ledger creation, ledger listing, and the two
//! transactional operations that execute a statement batch and the
//! matching ledger write together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// One entry of the applied-migrations ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// Dialect adapter for one database engine.
///
/// `apply_migration` and `revert_migration` execute the statement batch
/// and the ledger write inside a single transaction with guaranteed
/// rollback on failure, so the ledger never reflects a migration that did
/// not fully apply. With `fake` set, statement execution is skipped but
/// the ledger is still written; this reconciles environments that already
/// carry the change by other means.
#[async_trait]
pub trait DatabaseEngine: Send + Sync {
    /// Engine name for logging.
    fn engine_name(&self) -> &'static str;

    /// Open a connection and run a trivial round trip.
    async fn test_connection(&self) -> Result<()>;

    /// Create the applied-migrations ledger if it does not exist.
    async fn ensure_ledger(&self) -> Result<()>;

    /// Ledger entries in application order.
    async fn applied_migrations(&self) -> Result<Vec<AppliedMigration>>;

    /// Execute the apply statements and record the ledger entry.
    async fn apply_migration(&self, name: &str, statements: &str, fake: bool) -> Result<()>;

    /// Execute the revert statements and delete the ledger entry.
    async fn revert_migration(&self, name: &str, statements: &str, fake: bool) -> Result<()>;
}
