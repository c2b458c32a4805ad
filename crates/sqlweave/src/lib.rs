//! # sqlweave
//!
//! Dependency-graph schema migrations for PostgreSQL and MySQL.
//!
//! Schema objects (tables, views, functions, triggers, indexes, types,
//! constraints) live as annotated definition files, one per object. Each
//! file declares what it depends on; sqlweave assembles the files into a
//! validated dependency graph, diffs it against the snapshot recorded by
//! the last migration, and generates an ordered, reversible migration:
//!
//! - **Change detection** via content hashes of the apply statements
//! - **Cascading rebuilds**: dependents of a changed object are torn down
//!   and recreated even when their own text is unchanged
//! - **Topological ordering** by a cumulative dependency metric, so
//!   dependencies always apply before dependents
//! - **Transactional apply/revert** with a database-resident ledger of
//!   applied migrations
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use sqlweave::{generate, load_schema, MigrationRepository};
//!
//! fn main() -> sqlweave::Result<()> {
//!     let current = load_schema(Path::new("schema"))?;
//!     let repo = MigrationRepository::new("migrations");
//!     let previous = repo.load_latest_snapshot()?;
//!     let plan = generate(&previous, &current);
//!     if !plan.is_empty() {
//!         repo.save(&current, &plan, "auto")?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod apply;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod plan;
pub mod repo;
pub mod schema;

// Re-exports for convenient access
pub use apply::{MigrateOptions, MigrateReport, MigrationStatus, Migrator};
pub use config::ConnectionConfig;
pub use diff::{propagate, SchemaDiff};
pub use engine::{create_engine, AppliedMigration, DatabaseEngine, MysqlEngine, PostgresEngine};
pub use error::{Result, WeaveError};
pub use plan::{generate, MigrationPlan, PlanSummary, MANUAL_EDIT_MARKER};
pub use repo::{Migration, MigrationRepository};
pub use schema::{load_schema, Schema, SchemaUnit};
