//! Schema comparison and change propagation.

use std::collections::BTreeSet;

use crate::schema::Schema;

/// Names added, removed, or changed between two schemas. No order is
/// implied here; the plan generator orders by degree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl SchemaDiff {
    /// Compare two schemas by name presence and content hash.
    pub fn compare(previous: &Schema, current: &Schema) -> SchemaDiff {
        let added = current
            .names()
            .filter(|name| !previous.contains(name))
            .cloned()
            .collect();
        let removed = previous
            .names()
            .filter(|name| !current.contains(name))
            .cloned()
            .collect();
        let changed = current
            .units()
            .filter(|unit| {
                previous
                    .get(&unit.name)
                    .is_some_and(|prev| prev.hash != unit.hash)
            })
            .map(|unit| unit.name.clone())
            .collect();
        SchemaDiff {
            added,
            removed,
            changed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Reachability closure over the reverse-dependency edges: every dependent
/// of a changed unit (and their dependents, transitively) must be torn
/// down and rebuilt, even if its own text is unchanged. Returns a fresh
/// set; the schema is not mutated.
pub fn propagate(schema: &Schema, changed: &[String]) -> BTreeSet<String> {
    let mut marked = BTreeSet::new();
    let mut stack: Vec<&str> = changed.iter().map(String::as_str).collect();
    while let Some(name) = stack.pop() {
        if !marked.insert(name.to_string()) {
            continue;
        }
        if let Some(unit) = schema.get(name) {
            for dependent in &unit.required_by {
                stack.push(dependent);
            }
        }
    }
    marked
}
