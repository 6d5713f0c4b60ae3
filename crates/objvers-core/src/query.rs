//! History queries
//!
//! Answers point-in-time and ranged queries by replaying persisted
//! snapshots. Change queries diff each snapshot against the previous version
//! of the same global id.

use crate::commit::{CdoSnapshot, SnapshotType};
use crate::diff::{Change, DiffEngine, DiffOptions};
use crate::errors::{ExError, ExErrorKind, ExResult};
use crate::graph::GlobalId;
use crate::metamodel::TypeRegistry;
use crate::repository::{QueryFilter, Repository};

pub struct QueryRunner<'a> {
    registry: &'a TypeRegistry,
    repository: &'a dyn Repository,
    options: DiffOptions,
}

impl<'a> QueryRunner<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        repository: &'a dyn Repository,
        options: DiffOptions,
    ) -> Self {
        Self {
            registry,
            repository,
            options,
        }
    }

    /// Snapshots matching the filter, newest commit first
    pub fn run_state_query(&self, filter: &QueryFilter) -> ExResult<Vec<CdoSnapshot>> {
        filter.validate("state_history")?;
        self.repository.snapshots_matching(filter)
    }

    /// Changes recorded by the matching snapshots, newest commit first,
    /// truncated to `filter.limit`
    pub fn run_change_query(&self, filter: &QueryFilter) -> ExResult<Vec<Change>> {
        filter.validate("change_history")?;
        let engine = DiffEngine::new(self.registry, self.options);

        let mut changes = Vec::new();
        for snapshot in self.repository.snapshots_matching(filter)? {
            let replayed = match snapshot.snapshot_type {
                SnapshotType::Initial => engine.initial_changes(&snapshot.cdo)?,
                SnapshotType::Terminal => vec![Change::object_removed(snapshot.global_id().clone())],
                SnapshotType::Update => {
                    let previous = self.version(snapshot.global_id(), snapshot.version - 1)?;
                    engine.compare_cdo(&previous.cdo, &snapshot.cdo)?
                }
            };
            changes.extend(
                replayed
                    .into_iter()
                    .map(|change| change.with_commit(snapshot.commit.clone())),
            );
            if changes.len() >= filter.limit {
                break;
            }
        }
        changes.truncate(filter.limit);
        Ok(changes)
    }

    /// Newest non-terminal snapshot. A terminated object still answers with
    /// the state it had before deletion.
    pub fn latest_snapshot(&self, id: &GlobalId) -> ExResult<Option<CdoSnapshot>> {
        match self.repository.latest_snapshot(id)? {
            Some(terminal) if terminal.is_terminal() => {
                if terminal.version <= 1 {
                    return Ok(None);
                }
                self.version(id, terminal.version - 1).map(Some)
            }
            other => Ok(other),
        }
    }

    pub fn is_terminated(&self, id: &GlobalId) -> ExResult<bool> {
        Ok(self
            .repository
            .latest_snapshot(id)?
            .is_some_and(|s| s.is_terminal()))
    }

    fn version(&self, id: &GlobalId, version: u64) -> ExResult<CdoSnapshot> {
        let filter = QueryFilter::for_id(id.clone())
            .with_version(version)
            .with_limit(1);
        self.repository
            .snapshots_matching(&filter)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("replay")
                    .with_global_id(id.to_string())
                    .with_message(format!("snapshot version {} is missing", version))
            })
    }
}
