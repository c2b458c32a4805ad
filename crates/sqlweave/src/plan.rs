//! Migration plan generation.
//!
//! Consumes the differ output plus the graph's degree ordering and emits
//! the ordered apply/revert statement sequences. Sections run in a fixed
//! order: removed units (most-dependent first), added units
//! (least-dependent first), then the changed closure in a drop pass over
//! the previous definitions followed by a create pass over the current
//! ones. The revert plan is emitted in the mirror order of the apply plan.

use std::collections::BTreeSet;

use crate::diff::{propagate, SchemaDiff};
use crate::schema::{Schema, SchemaUnit};

/// Placeholder written into the apply plan when a changed unit's previous
/// form recorded no revert statements: the operator must supply the drop
/// statement by hand before the migration is usable.
pub const MANUAL_EDIT_MARKER: &str = "-- ==== Add your statements here ====";

/// Ordered apply/revert statement sequences, one block per contributing
/// unit, plus the human-readable action summary.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    /// Apply blocks, in execution order.
    pub up: Vec<Vec<String>>,
    /// Revert blocks, in execution order (already reversed).
    pub down: Vec<Vec<String>>,
    pub summary: PlanSummary,
}

/// Which units contributed to the plan, per section, in plan order.
#[derive(Debug, Clone, Default)]
pub struct PlanSummary {
    pub created: Vec<String>,
    pub dropped: Vec<String>,
    pub recreated: Vec<String>,
    pub removed: Vec<String>,
    /// Changed units whose previous form has no revert statements; the
    /// plan carries a manual-edit marker in their place.
    pub manual_edits: Vec<String>,
}

impl MigrationPlan {
    /// The scaffold plan for a fully handwritten migration.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }

    pub fn needs_manual_edit(&self) -> bool {
        !self.summary.manual_edits.is_empty()
    }
}

/// Generate the migration plan taking the schema from `previous` to
/// `current`. Both schemas must already be validated and degree-annotated.
pub fn generate(previous: &Schema, current: &Schema) -> MigrationPlan {
    let diff = SchemaDiff::compare(previous, current);
    let mut plan = MigrationPlan::default();
    let mut up = Vec::new();
    let mut down = Vec::new();

    // Removed units, most-dependent first: removal is an apply-time
    // action, restoration on rollback recreates the object.
    let mut removed: Vec<&SchemaUnit> = diff
        .removed
        .iter()
        .filter_map(|name| previous.get(name))
        .collect();
    sort_by_degree(&mut removed);
    for unit in removed.iter().rev() {
        up.push(unit.down.clone());
        down.push(unit.up.clone());
        plan.summary.removed.push(unit.name.clone());
    }

    // Added units, least-dependent first.
    let mut added: Vec<&SchemaUnit> = diff
        .added
        .iter()
        .filter_map(|name| current.get(name))
        .collect();
    sort_by_degree(&mut added);
    for unit in &added {
        up.push(unit.up.clone());
        down.push(unit.down.clone());
        plan.summary.created.push(unit.name.clone());
    }

    // Changed closure: dependents of a changed unit are rebuilt even when
    // their own text is unchanged. Units that are new in this plan are
    // already covered by the added section above.
    let added_names: BTreeSet<&str> = diff.added.iter().map(String::as_str).collect();
    let mut changed: Vec<&SchemaUnit> = propagate(current, &diff.changed)
        .iter()
        .filter(|name| !added_names.contains(name.as_str()))
        .filter_map(|name| current.get(name))
        .collect();
    sort_by_degree(&mut changed);

    // Drop pass over the previous definitions, dependents first.
    for unit in changed.iter().rev() {
        match previous.get(&unit.name) {
            Some(prev) if !prev.down.is_empty() => {
                up.push(prev.down.clone());
                down.push(prev.up.clone());
                plan.summary.dropped.push(unit.name.clone());
            }
            _ => {
                up.push(vec![MANUAL_EDIT_MARKER.to_string()]);
                plan.summary.manual_edits.push(unit.name.clone());
            }
        }
    }

    // Create pass over the current definitions, dependencies first.
    for unit in &changed {
        up.push(unit.up.clone());
        down.push(unit.down.clone());
        plan.summary.recreated.push(unit.name.clone());
    }

    // Revert replays teardown/recreate steps in the mirror order of apply.
    down.reverse();
    plan.up = up;
    plan.down = down;
    plan
}

fn sort_by_degree(units: &mut [&SchemaUnit]) {
    units.sort_by(|a, b| a.degree.cmp(&b.degree).then_with(|| a.name.cmp(&b.name)));
}
