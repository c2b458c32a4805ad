//! MySQL engine adapter.
//!
//! MySQL has no separate schema namespace inside a database, so the
//! ledger is a `sqlweave_migrations` table in the configured database.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use mysql_async::prelude::*;
use mysql_async::{Opts, OptsBuilder, Pool, TxOpts};
use tracing::debug;

use super::backend::{AppliedMigration, DatabaseEngine};
use crate::config::ConnectionConfig;
use crate::error::{Result, WeaveError};

const DEFAULT_PORT: u16 = 3306;

pub struct MysqlEngine {
    pool: Pool,
}

impl MysqlEngine {
    pub fn new(config: &ConnectionConfig) -> Self {
        let opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port.unwrap_or(DEFAULT_PORT))
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.name.clone()));
        Self {
            pool: Pool::new(Opts::from(opts)),
        }
    }

    async fn conn(&self) -> Result<mysql_async::Conn> {
        self.pool
            .get_conn()
            .await
            .map_err(|e| WeaveError::pool(e.to_string(), "acquiring MySQL connection"))
    }
}

#[async_trait]
impl DatabaseEngine for MysqlEngine {
    fn engine_name(&self) -> &'static str {
        "mysql"
    }

    async fn test_connection(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        conn.query_drop("SELECT 1").await?;
        Ok(())
    }

    async fn ensure_ledger(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        conn.query_drop(
            "CREATE TABLE IF NOT EXISTS sqlweave_migrations (
                 id INT AUTO_INCREMENT PRIMARY KEY,
                 migration TEXT NOT NULL,
                 applied_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)
             ) ENGINE=InnoDB",
        )
        .await?;
        Ok(())
    }

    async fn applied_migrations(&self) -> Result<Vec<AppliedMigration>> {
        let mut conn = self.conn().await?;
        let rows: Vec<(String, String)> = conn
            .query(
                "SELECT migration, CAST(applied_at AS CHAR)
                 FROM sqlweave_migrations ORDER BY applied_at",
            )
            .await?;
        rows.into_iter()
            .map(|(name, applied_at)| {
                let parsed = NaiveDateTime::parse_from_str(&applied_at, "%Y-%m-%d %H:%M:%S%.f")
                    .map_err(|e| {
                        WeaveError::pool(e.to_string(), "parsing ledger timestamp")
                    })?;
                Ok(AppliedMigration {
                    name,
                    applied_at: parsed.and_utc(),
                })
            })
            .collect()
    }

    async fn apply_migration(&self, name: &str, statements: &str, fake: bool) -> Result<()> {
        let mut conn = self.conn().await?;
        let mut tx = conn.start_transaction(TxOpts::default()).await?;
        if !fake && !statements.trim().is_empty() {
            if let Err(e) = tx.query_drop(statements).await {
                tx.rollback().await?;
                return Err(WeaveError::statement(name, e.to_string()));
            }
        }
        tx.exec_drop(
            "INSERT INTO sqlweave_migrations (migration) VALUES (?)",
            (name,),
        )
        .await?;
        tx.commit().await?;
        debug!("recorded {} in ledger", name);
        Ok(())
    }

    async fn revert_migration(&self, name: &str, statements: &str, fake: bool) -> Result<()> {
        let mut conn = self.conn().await?;
        let mut tx = conn.start_transaction(TxOpts::default()).await?;
        if !fake && !statements.trim().is_empty() {
            if let Err(e) = tx.query_drop(statements).await {
                tx.rollback().await?;
                return Err(WeaveError::statement(name, e.to_string()));
            }
        }
        tx.exec_drop(
            "DELETE FROM sqlweave_migrations WHERE migration = ?",
            (name,),
        )
        .await?;
        tx.commit().await?;
        debug!("removed {} from ledger", name);
        Ok(())
    }
}
