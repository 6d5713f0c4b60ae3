//! Collection comparison
//!
//! The default list algorithm aligns both sequences on their longest common
//! subsequence. Unmatched stretches between two matches form a hunk; inside a
//! hunk a removal and an addition at the same index are reported as one
//! changed element. Moves are never reported.

use super::model::{ElementChange, EntryChange};
use crate::graph::PropertyValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListCompareAlgorithm {
    /// Longest-common-subsequence alignment
    #[default]
    AsAlignedList,
    /// Index-by-index comparison
    Positional,
}

/// Largest alignment table built before falling back to positional pairing
const MAX_LCS_CELLS: usize = 4_000_000;

enum Step {
    Keep,
    Remove(usize),
    Add(usize),
}

pub fn compare_lists(
    left: &[PropertyValue],
    right: &[PropertyValue],
    algorithm: ListCompareAlgorithm,
) -> Vec<ElementChange> {
    match algorithm {
        ListCompareAlgorithm::AsAlignedList => aligned(left, right),
        ListCompareAlgorithm::Positional => positional(left, right),
    }
}

fn positional(left: &[PropertyValue], right: &[PropertyValue]) -> Vec<ElementChange> {
    let mut changes = Vec::new();
    for index in 0..left.len().max(right.len()) {
        match (left.get(index), right.get(index)) {
            (Some(l), Some(r)) if !l.same_as(r) => changes.push(ElementChange::ElementValueChanged {
                index,
                left: l.clone(),
                right: r.clone(),
            }),
            (Some(l), None) => changes.push(ElementChange::ElementRemoved {
                index,
                value: l.clone(),
            }),
            (None, Some(r)) => changes.push(ElementChange::ElementAdded {
                index,
                value: r.clone(),
            }),
            _ => {}
        }
    }
    changes
}

fn aligned(left: &[PropertyValue], right: &[PropertyValue]) -> Vec<ElementChange> {
    let prefix = left
        .iter()
        .zip(right)
        .take_while(|(l, r)| l.same_as(r))
        .count();
    let suffix = left[prefix..]
        .iter()
        .rev()
        .zip(right[prefix..].iter().rev())
        .take_while(|(l, r)| l.same_as(r))
        .count();
    let left_mid = &left[prefix..left.len() - suffix];
    let right_mid = &right[prefix..right.len() - suffix];

    let cells = (left_mid.len() + 1).saturating_mul(right_mid.len() + 1);
    let steps = if cells > MAX_LCS_CELLS {
        positional_steps(left_mid, right_mid)
    } else {
        lcs_steps(left_mid, right_mid)
    };

    let mut changes = Vec::new();
    let mut removed = Vec::new();
    let mut added = Vec::new();
    for step in steps {
        match step {
            Step::Keep => flush_hunk(left, right, &mut removed, &mut added, &mut changes),
            Step::Remove(index) => removed.push(prefix + index),
            Step::Add(index) => added.push(prefix + index),
        }
    }
    flush_hunk(left, right, &mut removed, &mut added, &mut changes);
    changes
}

/// Edit script over the longest common subsequence
fn lcs_steps(left: &[PropertyValue], right: &[PropertyValue]) -> Vec<Step> {
    let (n, m) = (left.len(), right.len());
    let width = m + 1;

    // lcs[i * width + j] = length of the LCS of left[i..] and right[j..]
    let mut lcs = vec![0usize; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if left[i].same_as(&right[j]) {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut steps = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        if i < n && j < m && left[i].same_as(&right[j]) {
            steps.push(Step::Keep);
            i += 1;
            j += 1;
        } else if j == m || (i < n && lcs[(i + 1) * width + j] >= lcs[i * width + j + 1]) {
            steps.push(Step::Remove(i));
            i += 1;
        } else {
            steps.push(Step::Add(j));
            j += 1;
        }
    }
    steps
}

/// Index-by-index edit script, used when the alignment table would be too large
fn positional_steps(left: &[PropertyValue], right: &[PropertyValue]) -> Vec<Step> {
    let mut steps = Vec::with_capacity(left.len().max(right.len()) * 2);
    for index in 0..left.len().max(right.len()) {
        match (left.get(index), right.get(index)) {
            (Some(l), Some(r)) if l.same_as(r) => steps.push(Step::Keep),
            (Some(_), Some(_)) => {
                steps.push(Step::Remove(index));
                steps.push(Step::Add(index));
            }
            (Some(_), None) => steps.push(Step::Remove(index)),
            (None, Some(_)) => steps.push(Step::Add(index)),
            (None, None) => {}
        }
    }
    steps
}

fn flush_hunk(
    left: &[PropertyValue],
    right: &[PropertyValue],
    removed: &mut Vec<usize>,
    added: &mut Vec<usize>,
    out: &mut Vec<ElementChange>,
) {
    // Both index lists are ascending
    let mut unpaired = Vec::with_capacity(added.len());
    let mut pending = added.drain(..).peekable();
    for index in removed.drain(..) {
        while let Some(add) = pending.next_if(|&a| a < index) {
            unpaired.push(add);
        }
        if pending.next_if_eq(&index).is_some() {
            out.push(ElementChange::ElementValueChanged {
                index,
                left: left[index].clone(),
                right: right[index].clone(),
            });
        } else {
            out.push(ElementChange::ElementRemoved {
                index,
                value: left[index].clone(),
            });
        }
    }
    unpaired.extend(pending);
    for index in unpaired {
        out.push(ElementChange::ElementAdded {
            index,
            value: right[index].clone(),
        });
    }
}

/// Membership difference: `(added, removed)`
pub fn compare_sets(
    left: &[PropertyValue],
    right: &[PropertyValue],
) -> (Vec<PropertyValue>, Vec<PropertyValue>) {
    let added = right
        .iter()
        .filter(|r| !left.iter().any(|l| l.same_as(r)))
        .cloned()
        .collect();
    let removed = left
        .iter()
        .filter(|l| !right.iter().any(|r| r.same_as(l)))
        .cloned()
        .collect();
    (added, removed)
}

/// Entry-level difference in key order
pub fn compare_maps(
    left: &BTreeMap<String, PropertyValue>,
    right: &BTreeMap<String, PropertyValue>,
) -> Vec<EntryChange> {
    let mut keys: Vec<&String> = left.keys().chain(right.keys()).collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .filter_map(|key| match (left.get(key), right.get(key)) {
            (Some(l), Some(r)) if !l.same_as(r) => Some(EntryChange::EntryValueChanged {
                key: key.clone(),
                left: l.clone(),
                right: r.clone(),
            }),
            (Some(l), None) => Some(EntryChange::EntryRemoved {
                key: key.clone(),
                value: l.clone(),
            }),
            (None, Some(r)) => Some(EntryChange::EntryAdded {
                key: key.clone(),
                value: r.clone(),
            }),
            _ => None,
        })
        .collect()
}
