//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Database engine identifiers accepted in the `engine` config field.
pub const ENGINE_POSTGRES: &str = "pg";
pub const ENGINE_MYSQL: &str = "mysql";

/// One named connection profile from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database engine: "pg" or "mysql".
    pub engine: String,

    /// Database name.
    pub name: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Database host (default: 127.0.0.1).
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port. Engine default is used when not set
    /// (5432 for PostgreSQL, 3306 for MySQL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// The config file maps profile names to connection profiles.
///
/// ```yaml
/// default:
///   engine: pg
///   name: appdb
///   user: app
///   password: secret
/// staging:
///   engine: mysql
///   name: appdb
///   user: app
/// ```
pub type ConfigFile = BTreeMap<String, ConnectionConfig>;

fn default_host() -> String {
    "127.0.0.1".to_string()
}
