//! Schema unit parsing.
//!
//! One definition file describes one schema object. The file is free text
//! with three recognized markers:
//!
//! ```sql
//! --REQ tables/users
//! --UP
//! CREATE VIEW active_users AS SELECT * FROM users WHERE active;
//! --DOWN
//! DROP VIEW active_users;
//! ```
//!
//! Lines before `--UP` are documentation; `--REQ` markers are only honored
//! there. Everything between `--UP` and `--DOWN` becomes the apply
//! statements, everything after `--DOWN` the revert statements. A missing
//! section yields an empty statement list, not an error.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::Result;

/// One dependency-annotated schema object definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaUnit {
    /// Stable identifier: path relative to the schema root, `/`-joined,
    /// `.sql` extension stripped.
    pub name: String,

    /// Names this unit depends on, in declaration order.
    pub requires: Vec<String>,

    /// Reverse edges, computed at graph build time.
    #[serde(default)]
    pub required_by: Vec<String>,

    /// Statements applied to create or update the object.
    pub up: Vec<String>,

    /// Statements applied to remove the object.
    pub down: Vec<String>,

    /// Digest of the whitespace-normalized apply statements. Used for
    /// change detection only, never for identity.
    pub hash: String,

    /// Cumulative dependency metric, computed at graph build time.
    #[serde(default)]
    pub degree: u32,
}

impl SchemaUnit {
    /// Parse a definition file's content into a unit with the given name.
    pub fn parse(name: impl Into<String>, content: &str) -> Self {
        enum Section {
            Preamble,
            Up,
            Down,
        }

        let mut requires = Vec::new();
        let mut up = Vec::new();
        let mut down = Vec::new();
        let mut section = Section::Preamble;

        for line in content.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("--UP") {
                section = Section::Up;
                continue;
            }
            if trimmed.starts_with("--DOWN") {
                section = Section::Down;
                continue;
            }
            match section {
                Section::Preamble => {
                    if let Some(rest) = trimmed.strip_prefix("--REQ") {
                        if let Some(requirement) = rest.split_whitespace().next() {
                            requires.push(requirement.to_string());
                        }
                    }
                }
                Section::Up => up.push(line.trim_end().to_string()),
                Section::Down => down.push(line.trim_end().to_string()),
            }
        }

        let hash = content_hash(&up);
        SchemaUnit {
            name: name.into(),
            requires,
            required_by: Vec::new(),
            up,
            down,
            hash,
            degree: 0,
        }
    }

    /// Read and parse one definition file. The unit name is derived from
    /// the file's path relative to the schema root.
    pub fn read(schema_root: &Path, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(unit_name(schema_root, path), &content))
    }
}

/// Derive a unit name from a definition file path: directory segments
/// relative to the schema root plus the file stem, joined with `/`.
pub fn unit_name(schema_root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(schema_root).unwrap_or(path);
    let mut segments: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    if let Some(stem) = relative.file_stem() {
        segments.push(stem.to_string_lossy().into_owned());
    }
    segments.join("/")
}

/// Hash the apply statements with runs of 2+ whitespace characters removed,
/// so reformatting inconsequential whitespace does not register as a change.
fn content_hash(up: &[String]) -> String {
    let normalized = strip_whitespace_runs(&up.concat());
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn strip_whitespace_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<char> = None;
    let mut run = 0usize;
    for c in text.chars() {
        if c.is_whitespace() {
            run += 1;
            if run == 1 {
                pending = Some(c);
            } else {
                pending = None;
            }
        } else {
            if let Some(p) = pending.take() {
                out.push(p);
            }
            run = 0;
            out.push(c);
        }
    }
    if let Some(p) = pending {
        out.push(p);
    }
    out
}
