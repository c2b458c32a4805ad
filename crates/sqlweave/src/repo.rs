//! On-disk migration repository.
//!
//! Each migration is a directory `<NNNN>-<suffix>` containing the schema
//! snapshot (`schema.json`) and the two statement sequences (`up.sql`,
//! `down.sql`). Migrations are totally ordered by their 4-digit sequence
//! number; this is both creation order and application order.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::plan::MigrationPlan;
use crate::schema::Schema;

const SNAPSHOT_FILE: &str = "schema.json";
const UP_FILE: &str = "up.sql";
const DOWN_FILE: &str = "down.sql";

/// One migration directory on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub sequence: u32,
    pub name: String,
    pub path: PathBuf,
}

/// Enumerates and persists migrations under one `migrations/` directory.
#[derive(Debug, Clone)]
pub struct MigrationRepository {
    root: PathBuf,
}

impl MigrationRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All migrations in ascending sequence order. A missing migrations
    /// directory reads as an empty repository.
    pub fn list(&self) -> Result<Vec<Migration>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut migrations = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match name.get(..4).and_then(|s| s.parse::<u32>().ok()) {
                Some(sequence) => migrations.push(Migration {
                    sequence,
                    name,
                    path: entry.path(),
                }),
                None => warn!("ignoring non-migration directory {}", name),
            }
        }
        migrations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(migrations)
    }

    /// Sequence number for the next migration: count of existing
    /// migrations + 1.
    pub fn next_sequence_number(&self) -> Result<u32> {
        Ok(self.list()?.len() as u32 + 1)
    }

    /// Persist a new migration: snapshot plus the two statement files.
    pub fn save(&self, schema: &Schema, plan: &MigrationPlan, suffix: &str) -> Result<Migration> {
        let sequence = self.next_sequence_number()?;
        let name = format!("{:04}-{}", sequence, suffix);
        let path = self.root.join(&name);

        info!("creating migration {}", name);
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir(&path)?;

        let snapshot = serde_json::to_string_pretty(schema)?;
        std::fs::write(path.join(SNAPSHOT_FILE), snapshot)?;
        std::fs::write(path.join(UP_FILE), render_blocks(&plan.up))?;
        std::fs::write(path.join(DOWN_FILE), render_blocks(&plan.down))?;

        Ok(Migration {
            sequence,
            name,
            path,
        })
    }

    /// Schema snapshot of the highest-sequence migration, or an empty
    /// schema if no migrations exist.
    pub fn load_latest_snapshot(&self) -> Result<Schema> {
        match self.list()?.last() {
            Some(migration) => {
                let content = std::fs::read_to_string(migration.path.join(SNAPSHOT_FILE))?;
                Ok(serde_json::from_str(&content)?)
            }
            None => Ok(Schema::empty()),
        }
    }

    /// Apply statements of one migration.
    pub fn load_up(&self, name: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.root.join(name).join(UP_FILE))?)
    }

    /// Revert statements of one migration; `None` when no down.sql was
    /// recorded, which makes the migration irreversible.
    pub fn load_down(&self, name: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.root.join(name).join(DOWN_FILE)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Frame each contributing unit's statements for human readability and
/// diffability.
fn render_blocks(blocks: &[Vec<String>]) -> String {
    let mut out = String::new();
    for block in blocks {
        out.push_str("-- begin --\n");
        out.push_str(block.join("\n").trim());
        out.push('\n');
        out.push_str("-- end --\n\n");
    }
    out
}
