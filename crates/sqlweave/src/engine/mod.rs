//! Database engine adapters.
//!
//! Dialect selection is a configuration-driven factory: the config's
//! `engine` field picks the adapter, and the rest of the system only sees
//! the [`DatabaseEngine`] trait.

mod backend;
mod mysql;
mod postgres;

pub use backend::{AppliedMigration, DatabaseEngine};
pub use mysql::MysqlEngine;
pub use postgres::PostgresEngine;

use crate::config::{ConnectionConfig, ENGINE_MYSQL, ENGINE_POSTGRES};
use crate::error::{Result, WeaveError};

/// Build the engine adapter selected by the connection profile.
pub fn create_engine(config: &ConnectionConfig) -> Result<Box<dyn DatabaseEngine>> {
    match config.engine.as_str() {
        ENGINE_POSTGRES => Ok(Box::new(PostgresEngine::new(config)?)),
        ENGINE_MYSQL => Ok(Box::new(MysqlEngine::new(config))),
        other => Err(WeaveError::Config(format!(
            "unknown engine '{}' (must be one of {}, {})",
            other, ENGINE_POSTGRES, ENGINE_MYSQL
        ))),
    }
}
