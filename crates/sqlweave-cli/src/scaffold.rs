//! Project scaffolding for `sqlweave init`.

use std::io;
use std::path::Path;

const SCHEMA_DIRS: &[&str] = &[
    "schema",
    "schema/tables",
    "schema/views",
    "schema/functions",
    "schema/triggers",
    "schema/indexes",
    "schema/types",
    "schema/constraints",
    "migrations",
];

const DEFAULT_CONFIG: &str = "\
---
default:
  engine: pg
#  engine: mysql
  name: <database_name>
  user: <username>
  password: <password>
#  host: 127.0.0.1
#  port: 5432
";

/// Create the schema/migrations directory structure and a starter config
/// file. Existing directories and an existing config file are left alone.
pub fn run(config_file: &Path) -> io::Result<()> {
    for dir in SCHEMA_DIRS {
        if !Path::new(dir).is_dir() {
            std::fs::create_dir(dir)?;
        }
    }
    if !config_file.exists() {
        std::fs::write(config_file, DEFAULT_CONFIG)?;
    }
    Ok(())
}
