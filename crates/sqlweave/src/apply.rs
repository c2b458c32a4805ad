//! Migration application engine.
//!
//! Drives the apply/revert state machine against a [`DatabaseEngine`].
//! Migrations are applied strictly in ascending sequence order, one
//! transaction each; a statement failure stops the run and leaves every
//! previously committed migration in place. Only the ledger's last entry
//! is eligible for revert.

use tracing::{info, warn};

use crate::engine::{AppliedMigration, DatabaseEngine};
use crate::error::{Result, WeaveError};
use crate::repo::{Migration, MigrationRepository};

/// Options for one `migrate` run.
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    /// Record ledger entries without executing statements.
    pub fake: bool,
    /// Report what would run without touching the database.
    pub dry_run: bool,
    /// Halt the run successfully after applying a migration whose name
    /// starts with this prefix (a bare sequence number works).
    pub stop_at: Option<String>,
    /// Revert the last applied migration instead of applying.
    pub revert: bool,
}

/// What one run did, for the operator summary.
#[derive(Debug, Clone, Default)]
pub struct MigrateReport {
    pub applied: Vec<String>,
    pub reverted: Vec<String>,
    /// Pending migrations listed but not executed (dry run).
    pub skipped: Vec<String>,
}

/// One on-disk migration with its ledger state, for `status` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub name: String,
    pub applied: bool,
}

/// Applies and reverts migrations from a repository against an engine.
pub struct Migrator<'a> {
    repo: &'a MigrationRepository,
    engine: &'a dyn DatabaseEngine,
}

impl<'a> Migrator<'a> {
    pub fn new(repo: &'a MigrationRepository, engine: &'a dyn DatabaseEngine) -> Self {
        Self { repo, engine }
    }

    /// Run one `migrate` invocation.
    pub async fn run(&self, opts: &MigrateOptions) -> Result<MigrateReport> {
        if opts.revert {
            self.revert(opts).await
        } else {
            self.apply(opts).await
        }
    }

    async fn apply(&self, opts: &MigrateOptions) -> Result<MigrateReport> {
        let on_disk = self.repo.list()?;
        let applied = self.engine.applied_migrations().await?;
        let pending = pending_migrations(&on_disk, &applied);

        let mut report = MigrateReport::default();
        if opts.dry_run {
            report.skipped = pending.iter().map(|m| m.name.clone()).collect();
            return Ok(report);
        }

        for migration in pending {
            let statements = self.repo.load_up(&migration.name)?;
            info!(
                "applying migration {}{}",
                migration.name,
                if opts.fake { " (fake)" } else { "" }
            );
            self.engine
                .apply_migration(&migration.name, &statements, opts.fake)
                .await?;
            report.applied.push(migration.name.clone());

            if let Some(stop) = &opts.stop_at {
                if migration.name.starts_with(stop.as_str()) {
                    info!("stopping after {}", migration.name);
                    break;
                }
            }
        }
        Ok(report)
    }

    async fn revert(&self, opts: &MigrateOptions) -> Result<MigrateReport> {
        let applied = self.engine.applied_migrations().await?;
        let last = applied.last().ok_or_else(|| {
            WeaveError::Irreversible("no applied migrations to revert".to_string())
        })?;

        let statements = self.repo.load_down(&last.name)?.ok_or_else(|| {
            WeaveError::Irreversible(format!(
                "migration {} does not have down.sql - reverting impossible",
                last.name
            ))
        })?;

        let mut report = MigrateReport::default();
        if opts.dry_run {
            report.skipped.push(last.name.clone());
            return Ok(report);
        }

        info!(
            "un-applying migration {}{}",
            last.name,
            if opts.fake { " (fake)" } else { "" }
        );
        self.engine
            .revert_migration(&last.name, &statements, opts.fake)
            .await?;
        report.reverted.push(last.name.clone());
        Ok(report)
    }

    /// Each on-disk migration with its applied flag, in sequence order.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>> {
        let applied = self.engine.applied_migrations().await?;
        let applied_names: Vec<&str> = applied.iter().map(|m| m.name.as_str()).collect();
        Ok(self
            .repo
            .list()?
            .into_iter()
            .map(|m| MigrationStatus {
                applied: applied_names.contains(&m.name.as_str()),
                name: m.name,
            })
            .collect())
    }
}

/// On-disk migrations not yet in the ledger, by name set difference.
/// Ledger entries without an on-disk counterpart are reported, not
/// silently skipped: they usually come from a migration created on a
/// different branch.
fn pending_migrations<'m>(
    on_disk: &'m [Migration],
    applied: &[AppliedMigration],
) -> Vec<&'m Migration> {
    for entry in applied {
        if !on_disk.iter().any(|m| m.name == entry.name) {
            warn!(
                "migration {} is not in the created migration list, probably this DB is from another branch",
                entry.name
            );
        }
    }
    on_disk
        .iter()
        .filter(|m| !applied.iter().any(|entry| entry.name == m.name))
        .collect()
}
