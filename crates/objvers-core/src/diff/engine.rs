//! Graph diff engine.
//!
//! [`DiffEngine::compare`] matches the nodes of two flattened graphs by
//! global id and compares matched nodes property by property, in declaration
//! order.
//!
//! Emission order: nodes of the left graph in discovery order (changed or
//! removed), then right-only nodes in right discovery order.

use super::list::{compare_lists, compare_maps, compare_sets, ListCompareAlgorithm};
use super::model::{Change, ChangeKind, Diff};
use crate::errors::Result;
use crate::graph::{default_value, Cdo, LiveGraph, PropertyValue};
use crate::metamodel::{CollectionShape, MappedType, TypeRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static NULL: PropertyValue = PropertyValue::Null;
static EMPTY_MAP: BTreeMap<String, PropertyValue> = BTreeMap::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    #[serde(default)]
    pub list_compare: ListCompareAlgorithm,
}

pub struct DiffEngine<'r> {
    registry: &'r TypeRegistry,
    options: DiffOptions,
}

impl<'r> DiffEngine<'r> {
    pub fn new(registry: &'r TypeRegistry, options: DiffOptions) -> Self {
        Self { registry, options }
    }

    /// Compare two graphs
    ///
    /// - `(None, None)`: empty diff
    /// - `(None, right)`: every right node as a new object with its initial values
    /// - `(left, None)`: `ObjectRemoved` for every left node, no property detail
    pub fn compare(&self, left: Option<&LiveGraph>, right: Option<&LiveGraph>) -> Result<Diff> {
        let mut changes = Vec::new();
        match (left, right) {
            (None, None) => {}
            (Some(left), None) => {
                for cdo in left.nodes() {
                    changes.push(Change::object_removed(cdo.global_id.clone()));
                }
            }
            (None, Some(right)) => {
                for cdo in right.nodes() {
                    changes.extend(self.initial_changes(cdo)?);
                }
            }
            (Some(left), Some(right)) => {
                for cdo in left.nodes() {
                    match right.get(&cdo.global_id) {
                        Some(current) => changes.extend(self.compare_cdo(cdo, current)?),
                        None => changes.push(Change::object_removed(cdo.global_id.clone())),
                    }
                }
                for cdo in right.nodes() {
                    if !left.contains(&cdo.global_id) {
                        changes.extend(self.initial_changes(cdo)?);
                    }
                }
            }
        }
        Ok(Diff::new(changes))
    }

    pub fn initial(&self, graph: &LiveGraph) -> Result<Diff> {
        self.compare(None, Some(graph))
    }

    /// `NewObject` followed by a change for every property that differs from
    /// its default value
    pub fn initial_changes(&self, cdo: &Cdo) -> Result<Vec<Change>> {
        let defaults = self.default_state(&cdo.type_name)?;
        let mut kinds = Vec::new();
        self.compare_state(None, &cdo.type_name, &defaults, &cdo.state, &mut kinds)?;

        let mut changes = Vec::with_capacity(kinds.len() + 1);
        changes.push(Change::new_object(cdo.global_id.clone()));
        changes.extend(kinds.into_iter().map(|kind| Change::new(cdo.global_id.clone(), kind)));
        Ok(changes)
    }

    /// Property-level changes between two states of the same node
    pub fn compare_cdo(&self, left: &Cdo, right: &Cdo) -> Result<Vec<Change>> {
        let mut kinds = Vec::new();
        self.compare_state(None, &right.type_name, &left.state, &right.state, &mut kinds)?;
        Ok(kinds
            .into_iter()
            .map(|kind| Change::new(right.global_id.clone(), kind))
            .collect())
    }

    /// Top-level property names touched by a list of changes, deduplicated in
    /// first-seen order
    pub fn changed_properties(changes: &[Change]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for change in changes {
            if let Some(path) = change.property() {
                let top = path.split(['.', '/']).next().unwrap_or(path);
                if !names.iter().any(|n| n == top) {
                    names.push(top.to_string());
                }
            }
        }
        names
    }

    fn default_state(&self, type_name: &str) -> Result<BTreeMap<String, PropertyValue>> {
        let mut state = BTreeMap::new();
        for property in self.registry.properties(type_name)?.iter() {
            if property.ignored {
                continue;
            }
            let mapped = self.registry.classify(&property.declared_type)?;
            state.insert(property.name.clone(), default_value(&mapped));
        }
        Ok(state)
    }

    fn compare_state(
        &self,
        prefix: Option<&str>,
        type_name: &str,
        left: &BTreeMap<String, PropertyValue>,
        right: &BTreeMap<String, PropertyValue>,
        out: &mut Vec<ChangeKind>,
    ) -> Result<()> {
        for property in self.registry.properties(type_name)?.iter() {
            if property.ignored {
                continue;
            }
            let l = left.get(&property.name).unwrap_or(&NULL);
            let r = right.get(&property.name).unwrap_or(&NULL);
            if l.same_as(r) {
                continue;
            }

            let path = match prefix {
                Some(prefix) => format!("{}.{}", prefix, property.name),
                None => property.name.clone(),
            };
            let mapped = self.registry.classify(&property.declared_type)?;
            self.compare_values(path, &mapped, l, r, out)?;
        }
        Ok(())
    }

    fn compare_values(
        &self,
        property: String,
        mapped: &MappedType,
        left: &PropertyValue,
        right: &PropertyValue,
        out: &mut Vec<ChangeKind>,
    ) -> Result<()> {
        match mapped {
            MappedType::Collection {
                shape: CollectionShape::List,
                ..
            }
            | MappedType::Array { .. } => {
                let elements = compare_lists(
                    left.elements(),
                    right.elements(),
                    self.options.list_compare,
                );
                if !elements.is_empty() {
                    out.push(ChangeKind::ListChange { property, elements });
                }
            }
            MappedType::Collection {
                shape: CollectionShape::Set,
                ..
            } => {
                let (added, removed) = compare_sets(left.elements(), right.elements());
                if !added.is_empty() || !removed.is_empty() {
                    out.push(ChangeKind::SetChange {
                        property,
                        added,
                        removed,
                    });
                }
            }
            MappedType::Collection {
                shape: CollectionShape::Map,
                ..
            } => {
                let entries = compare_maps(entries(left), entries(right));
                if !entries.is_empty() {
                    out.push(ChangeKind::MapChange { property, entries });
                }
            }
            _ => match (left, right) {
                (PropertyValue::ValueObject(l), PropertyValue::ValueObject(r))
                    if l.type_name == r.type_name =>
                {
                    self.compare_state(Some(&property), &r.type_name, &l.state, &r.state, out)?;
                }
                (
                    PropertyValue::Reference(_) | PropertyValue::Null,
                    PropertyValue::Reference(_) | PropertyValue::Null,
                ) => out.push(ChangeKind::ReferenceChanged {
                    property,
                    left: left.as_reference().cloned(),
                    right: right.as_reference().cloned(),
                }),
                _ => out.push(ChangeKind::ValueChanged {
                    property,
                    left: left.clone(),
                    right: right.clone(),
                }),
            },
        }
        Ok(())
    }
}

fn entries(value: &PropertyValue) -> &BTreeMap<String, PropertyValue> {
    match value {
        PropertyValue::Map(entries) => entries,
        _ => &EMPTY_MAP,
    }
}
