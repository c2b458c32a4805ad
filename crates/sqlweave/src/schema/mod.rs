//! Schema assembly: parsing the source tree into a validated,
//! degree-annotated dependency graph.

mod graph;
mod unit;

pub use unit::{unit_name, SchemaUnit};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// A validated mapping of unit name to schema unit.
///
/// Built fresh from the source tree on every planning invocation, or
/// deserialized from a migration's snapshot. Immutable after build;
/// planning never mutates units in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    units: BTreeMap<String, SchemaUnit>,
}

impl Schema {
    /// An empty schema, used when no migration has been recorded yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a schema from parsed units: populate reverse edges,
    /// validate references and acyclicity, and compute degrees.
    pub fn build(units: Vec<SchemaUnit>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for mut unit in units {
            unit.required_by.clear();
            unit.degree = 0;
            map.insert(unit.name.clone(), unit);
        }
        graph::link_required_by(&mut map)?;
        graph::validate_acyclic(&map)?;
        graph::compute_degrees(&mut map);
        Ok(Self { units: map })
    }

    pub fn get(&self, name: &str) -> Option<&SchemaUnit> {
        self.units.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.units.keys()
    }

    pub fn units(&self) -> impl Iterator<Item = &SchemaUnit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Load every `*.sql` definition file under the schema root and build the
/// validated schema.
pub fn load_schema(root: &Path) -> Result<Schema> {
    let mut units = Vec::new();
    collect_units(root, root, &mut units)?;
    debug!("parsed {} schema units from {}", units.len(), root.display());
    Schema::build(units)
}

fn collect_units(root: &Path, dir: &Path, units: &mut Vec<SchemaUnit>) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_units(root, &path, units)?;
        } else if path.extension().is_some_and(|ext| ext == "sql") {
            units.push(SchemaUnit::read(root, &path)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_schema_from_source_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("schema");
        fs::create_dir_all(root.join("tables")).unwrap();
        fs::create_dir_all(root.join("views")).unwrap();
        fs::write(
            root.join("tables/users.sql"),
            "--UP\nCREATE TABLE users (id INT);\n--DOWN\nDROP TABLE users;\n",
        )
        .unwrap();
        fs::write(
            root.join("views/active.sql"),
            "--REQ tables/users\n--UP\nCREATE VIEW active AS SELECT 1;\n--DOWN\nDROP VIEW active;\n",
        )
        .unwrap();
        fs::write(root.join("README.txt"), "not a definition file\n").unwrap();

        let schema = load_schema(&root).unwrap();
        assert_eq!(schema.len(), 2);
        assert!(schema.contains("tables/users"));
        assert!(schema.contains("views/active"));
        assert_eq!(schema.get("views/active").unwrap().degree, 1);
        assert_eq!(
            schema.get("tables/users").unwrap().required_by,
            vec!["views/active"]
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let schema = Schema::build(vec![
            SchemaUnit::parse("tables/users", "--UP\nCREATE TABLE users (id INT);\n"),
            SchemaUnit::parse(
                "views/active",
                "--REQ tables/users\n--UP\nCREATE VIEW active AS SELECT 1;\n",
            ),
        ])
        .unwrap();

        let json = serde_json::to_string_pretty(&schema).unwrap();
        let restored: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 2);
        let unit = restored.get("views/active").unwrap();
        assert_eq!(unit.requires, vec!["tables/users"]);
        assert_eq!(unit.degree, 1);
        assert_eq!(
            unit.hash,
            schema.get("views/active").unwrap().hash
        );
    }
}
