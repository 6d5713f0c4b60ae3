//! In-memory repository
//!
//! The whole append runs under one mutex, which serializes commit id
//! allocation checks.

use super::{QueryFilter, Repository};
use crate::commit::{CdoSnapshot, Commit, CommitId};
use crate::errors::{ExError, ExErrorKind, ExResult};
use crate::graph::GlobalId;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    head: Option<CommitId>,
    /// All snapshots in append order
    snapshots: Vec<CdoSnapshot>,
    latest: HashMap<GlobalId, usize>,
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ExResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| {
            ExError::new(ExErrorKind::Repository).with_message("repository lock poisoned")
        })
    }
}

impl Repository for InMemoryRepository {
    fn persist(&self, commit: &Commit) -> ExResult<()> {
        let mut state = self.lock()?;

        let expected = CommitId::after(state.head);
        if commit.id() != expected {
            return Err(ExError::new(ExErrorKind::ConcurrentCommitConflict)
                .with_op("persist")
                .with_commit_id(commit.id().to_string())
                .with_message(format!("expected commit id {}", expected)));
        }
        for snapshot in &commit.snapshots {
            let recorded = state
                .latest
                .get(snapshot.global_id())
                .map_or(0, |&i| state.snapshots[i].version);
            if snapshot.version != recorded + 1 {
                return Err(ExError::new(ExErrorKind::ConcurrentCommitConflict)
                    .with_op("persist")
                    .with_commit_id(commit.id().to_string())
                    .with_global_id(snapshot.global_id().to_string())
                    .with_message(format!(
                        "snapshot version {} does not follow recorded version {}",
                        snapshot.version, recorded
                    )));
            }
        }

        for snapshot in &commit.snapshots {
            let index = state.snapshots.len();
            state.latest.insert(snapshot.global_id().clone(), index);
            state.snapshots.push(snapshot.clone());
        }
        state.head = Some(commit.id());
        tracing::debug!(
            commit_id = %commit.id(),
            snapshot_count = commit.snapshots.len(),
            "commit appended to in-memory repository"
        );
        Ok(())
    }

    fn head_commit_id(&self) -> ExResult<Option<CommitId>> {
        Ok(self.lock()?.head)
    }

    fn latest_snapshot(&self, id: &GlobalId) -> ExResult<Option<CdoSnapshot>> {
        let state = self.lock()?;
        Ok(state.latest.get(id).map(|&i| state.snapshots[i].clone()))
    }

    fn snapshots_matching(&self, filter: &QueryFilter) -> ExResult<Vec<CdoSnapshot>> {
        filter.validate("snapshots_matching")?;
        let state = self.lock()?;

        let mut matching: Vec<(usize, &CdoSnapshot)> = state
            .snapshots
            .iter()
            .enumerate()
            .filter(|(_, s)| filter.matches(s))
            .collect();
        matching.sort_by_key(|(i, s)| (Reverse(s.commit_id()), *i));

        Ok(matching
            .into_iter()
            .take(filter.limit)
            .map(|(_, s)| s.clone())
            .collect())
    }
}
