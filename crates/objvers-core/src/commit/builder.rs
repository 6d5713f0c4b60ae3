//! Commit construction
//!
//! Turns a live graph into snapshots against the latest recorded state of
//! each node, allocates the next commit id and persists through the
//! repository. Nothing is persisted when any step fails.

use super::model::{CdoSnapshot, Commit, CommitId, CommitMetadata, CommitOutcome, SnapshotType};
use crate::diff::{Change, Diff, DiffEngine, DiffOptions};
use crate::errors::{require_non_blank, validation, ExError, ExErrorKind, ExResult};
use crate::graph::{Cdo, GlobalId, GraphBuilder};
use crate::metamodel::TypeRegistry;
use crate::object::Object;
use crate::repository::Repository;
use chrono::Utc;

pub struct CommitBuilder<'a> {
    registry: &'a TypeRegistry,
    repository: &'a dyn Repository,
    options: DiffOptions,
}

/// Snapshot plus the changes that justify it
struct Pending {
    cdo: Cdo,
    snapshot_type: SnapshotType,
    version: u64,
    changes: Vec<Change>,
}

impl<'a> CommitBuilder<'a> {
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

    /// Record every node of the graph that changed since its latest snapshot
    ///
    /// Nodes without history, or whose latest snapshot is terminal, get an
    /// INITIAL snapshot. Returns [`CommitOutcome::Unchanged`] without
    /// allocating an id when no node changed.
    pub fn create(&self, author: &str, root: &Object) -> ExResult<CommitOutcome> {
        require_non_blank("commit", "author", author)?;
        let graph = GraphBuilder::new(self.registry).build(root)?;
        let engine = DiffEngine::new(self.registry, self.options);

        let mut pending = Vec::new();
        for cdo in graph.nodes() {
            let latest = self.repository.latest_snapshot(&cdo.global_id)?;
            match latest {
                Some(previous) if !previous.is_terminal() => {
                    let changes = engine.compare_cdo(&previous.cdo, cdo)?;
                    if changes.is_empty() {
                        continue;
                    }
                    pending.push(Pending {
                        cdo: cdo.clone(),
                        snapshot_type: SnapshotType::Update,
                        version: previous.version + 1,
                        changes,
                    });
                }
                other => pending.push(Pending {
                    cdo: cdo.clone(),
                    snapshot_type: SnapshotType::Initial,
                    version: other.map_or(1, |terminal| terminal.version + 1),
                    changes: engine.initial_changes(cdo)?,
                }),
            }
        }

        if pending.is_empty() {
            return Ok(CommitOutcome::Unchanged);
        }
        self.persist(author, pending).map(CommitOutcome::Committed)
    }

    /// Record an INITIAL snapshot of every node, regardless of history
    pub fn create_initial(&self, author: &str, root: &Object) -> ExResult<Commit> {
        require_non_blank("commit_initial", "author", author)?;
        let graph = GraphBuilder::new(self.registry).build(root)?;
        let engine = DiffEngine::new(self.registry, self.options);

        let mut pending = Vec::with_capacity(graph.len());
        for cdo in graph.nodes() {
            let version = self
                .repository
                .latest_snapshot(&cdo.global_id)?
                .map_or(1, |s| s.version + 1);
            pending.push(Pending {
                cdo: cdo.clone(),
                snapshot_type: SnapshotType::Initial,
                version,
                changes: engine.initial_changes(cdo)?,
            });
        }
        self.persist(author, pending)
    }

    /// Record the deletion of a graph root. Only the root is terminated;
    /// referenced entities keep their history.
    pub fn create_terminal(&self, author: &str, root: &Object) -> ExResult<Commit> {
        require_non_blank("commit_terminal", "author", author)?;
        let id = GraphBuilder::new(self.registry).root_id(root)?;
        self.create_terminal_by_id(author, &id)
    }

    /// # Errors
    ///
    /// `NotFound` if the id has no recorded history, `Validation` if its
    /// latest snapshot is already terminal.
    pub fn create_terminal_by_id(&self, author: &str, id: &GlobalId) -> ExResult<Commit> {
        require_non_blank("commit_terminal", "author", author)?;
        let previous = self.repository.latest_snapshot(id)?.ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op("commit_terminal")
                .with_global_id(id.to_string())
                .with_message("no snapshots recorded for this id")
        })?;
        if previous.is_terminal() {
            return Err(validation("commit_terminal", "object is already terminated")
                .with_global_id(id.to_string()));
        }

        let pending = Pending {
            cdo: Cdo::new(id.clone(), previous.cdo.type_name.clone()),
            snapshot_type: SnapshotType::Terminal,
            version: previous.version + 1,
            changes: vec![Change::object_removed(id.clone())],
        };
        self.persist(author, vec![pending])
    }

    fn persist(&self, author: &str, pending: Vec<Pending>) -> ExResult<Commit> {
        let head = self.repository.head_commit_id()?;
        let metadata = CommitMetadata {
            id: CommitId::after(head),
            author: author.to_string(),
            committed_at: Utc::now(),
        };

        let mut snapshots = Vec::with_capacity(pending.len());
        let mut changes = Vec::new();
        for item in pending {
            snapshots.push(CdoSnapshot {
                changed_properties: DiffEngine::changed_properties(&item.changes),
                cdo: item.cdo,
                commit: metadata.clone(),
                snapshot_type: item.snapshot_type,
                version: item.version,
            });
            changes.extend(
                item.changes
                    .into_iter()
                    .map(|change| change.with_commit(metadata.clone())),
            );
        }

        let commit = Commit {
            metadata,
            snapshots,
            diff: Diff::new(changes),
        };
        self.repository.persist(&commit)?;
        Ok(commit)
    }
}
