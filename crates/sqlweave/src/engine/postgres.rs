//! PostgreSQL engine adapter.
//!
//! The ledger lives in a dedicated `sqlweave` schema so it never collides
//! with managed objects.

use async_trait::async_trait;
use deadpool_postgres::{Pool, Runtime};
use tokio_postgres::NoTls;
use tracing::debug;

use super::backend::{AppliedMigration, DatabaseEngine};
use crate::config::ConnectionConfig;
use crate::error::{Result, WeaveError};

const DEFAULT_PORT: u16 = 5432;

pub struct PostgresEngine {
    pool: Pool,
}

impl PostgresEngine {
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let mut pool_config = deadpool_postgres::Config::new();
        pool_config.host = Some(config.host.clone());
        pool_config.port = Some(config.port.unwrap_or(DEFAULT_PORT));
        pool_config.dbname = Some(config.name.clone());
        pool_config.user = Some(config.user.clone());
        pool_config.password = Some(config.password.clone());

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| WeaveError::pool(e.to_string(), "creating PostgreSQL pool"))?;
        Ok(Self { pool })
    }

    async fn client(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| WeaveError::pool(e.to_string(), "acquiring PostgreSQL connection"))
    }
}

#[async_trait]
impl DatabaseEngine for PostgresEngine {
    fn engine_name(&self) -> &'static str {
        "pg"
    }

    async fn test_connection(&self) -> Result<()> {
        let client = self.client().await?;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }

    async fn ensure_ledger(&self) -> Result<()> {
        let client = self.client().await?;
        client
            .batch_execute(
                "CREATE SCHEMA IF NOT EXISTS sqlweave;
                 CREATE TABLE IF NOT EXISTS sqlweave.migrations (
                     id SERIAL PRIMARY KEY,
                     migration TEXT NOT NULL,
                     applied_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
                 );",
            )
            .await?;
        Ok(())
    }

    async fn applied_migrations(&self) -> Result<Vec<AppliedMigration>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT migration, applied_at FROM sqlweave.migrations ORDER BY applied_at",
                &[],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|row| AppliedMigration {
                name: row.get(0),
                applied_at: row.get(1),
            })
            .collect())
    }

    async fn apply_migration(&self, name: &str, statements: &str, fake: bool) -> Result<()> {
        let mut client = self.client().await?;
        // Dropping the transaction without commit rolls it back.
        let tx = client.transaction().await?;
        if !fake && !statements.trim().is_empty() {
            tx.batch_execute(statements)
                .await
                .map_err(|e| WeaveError::statement(name, e.to_string()))?;
        }
        tx.execute(
            "INSERT INTO sqlweave.migrations (migration) VALUES ($1)",
            &[&name],
        )
        .await?;
        tx.commit().await?;
        debug!("recorded {} in ledger", name);
        Ok(())
    }

    async fn revert_migration(&self, name: &str, statements: &str, fake: bool) -> Result<()> {
        let mut client = self.client().await?;
        let tx = client.transaction().await?;
        if !fake && !statements.trim().is_empty() {
            tx.batch_execute(statements)
                .await
                .map_err(|e| WeaveError::statement(name, e.to_string()))?;
        }
        tx.execute(
            "DELETE FROM sqlweave.migrations WHERE migration = $1",
            &[&name],
        )
        .await?;
        tx.commit().await?;
        debug!("removed {} from ledger", name);
        Ok(())
    }
}
