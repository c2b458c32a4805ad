//! Dependency graph validation and ordering.
//!
//! After the units are assembled into a map, three passes run in order:
//! reference validation + reverse-edge linking, cycle detection, and
//! degree computation. Degrees are memoized per build; the acyclic
//! invariant (validated first) guarantees termination.

use std::collections::BTreeMap;

use super::unit::SchemaUnit;
use crate::error::{Result, WeaveError};

/// Validate that every `requires` entry names an existing unit, and
/// populate the reverse `required_by` edges.
pub(crate) fn link_required_by(units: &mut BTreeMap<String, SchemaUnit>) -> Result<()> {
    let mut edges: Vec<(String, String)> = Vec::new();
    for (name, unit) in units.iter() {
        for requirement in &unit.requires {
            if !units.contains_key(requirement) {
                return Err(WeaveError::UnknownDependency {
                    requirement: requirement.clone(),
                    declared_by: name.clone(),
                });
            }
            edges.push((requirement.clone(), name.clone()));
        }
    }
    for (requirement, dependent) in edges {
        if let Some(unit) = units.get_mut(&requirement) {
            unit.required_by.push(dependent);
        }
    }
    Ok(())
}

/// Depth-first walk from every unit, tracking the active path. A unit
/// reappearing in its own path is reported with the full cycle chain,
/// starting and ending at the repeated unit.
pub(crate) fn validate_acyclic(units: &BTreeMap<String, SchemaUnit>) -> Result<()> {
    for name in units.keys() {
        let mut stack = Vec::new();
        visit(units, name, &mut stack)?;
    }
    Ok(())
}

fn visit(
    units: &BTreeMap<String, SchemaUnit>,
    name: &str,
    stack: &mut Vec<String>,
) -> Result<()> {
    if let Some(pos) = stack.iter().position(|n| n == name) {
        let mut path: Vec<String> = stack[pos..].to_vec();
        path.push(name.to_string());
        return Err(WeaveError::CircularDependency { path });
    }
    stack.push(name.to_string());
    if let Some(unit) = units.get(name) {
        for requirement in &unit.requires {
            visit(units, requirement, stack)?;
        }
    }
    stack.pop();
    Ok(())
}

/// Compute `degree = |requires| + Σ degree(r)` for every unit, memoized.
/// For every edge `A requires B` this guarantees `degree(B) < degree(A)`,
/// so ascending degree is a valid topological order.
pub(crate) fn compute_degrees(units: &mut BTreeMap<String, SchemaUnit>) {
    let mut memo: BTreeMap<String, u32> = BTreeMap::new();
    let names: Vec<String> = units.keys().cloned().collect();
    for name in &names {
        degree_of(units, name, &mut memo);
    }
    for name in &names {
        if let Some(degree) = memo.get(name).copied() {
            if let Some(unit) = units.get_mut(name) {
                unit.degree = degree;
            }
        }
    }
}

fn degree_of(
    units: &BTreeMap<String, SchemaUnit>,
    name: &str,
    memo: &mut BTreeMap<String, u32>,
) -> u32 {
    if let Some(degree) = memo.get(name) {
        return *degree;
    }
    let Some(unit) = units.get(name) else {
        return 0;
    };
    let mut degree = unit.requires.len() as u32;
    let requires = unit.requires.clone();
    for requirement in &requires {
        degree += degree_of(units, requirement, memo);
    }
    memo.insert(name.to_string(), degree);
    degree
}
