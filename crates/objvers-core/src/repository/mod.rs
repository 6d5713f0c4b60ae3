//! Repository contract
//!
//! A repository stores commits append-only and answers snapshot lookups.
//! Implementations serialize id allocation: [`Repository::persist`] must
//! reject a commit whose id is not exactly the successor of the current head
//! and must then persist nothing.

pub mod memory;

pub use memory::InMemoryRepository;

use crate::commit::{CdoSnapshot, Commit, CommitId};
use crate::errors::{validation, ExResult};
use crate::graph::GlobalId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_QUERY_LIMIT: usize = 100;

pub trait Repository: Send + Sync {
    /// Append a commit and its snapshots atomically
    ///
    /// # Errors
    ///
    /// `ConcurrentCommitConflict` when `commit.id()` is not the successor of
    /// the head, or a snapshot version is not the successor of the recorded
    /// version for its global id. `Repository` for storage failures.
    fn persist(&self, commit: &Commit) -> ExResult<()>;

    /// Id of the newest commit, `None` for an empty repository
    fn head_commit_id(&self) -> ExResult<Option<CommitId>>;

    /// Newest snapshot of a global id, terminal snapshots included
    fn latest_snapshot(&self, id: &GlobalId) -> ExResult<Option<CdoSnapshot>>;

    /// Snapshots matching a filter, ordered by commit id descending and by
    /// insertion order within a commit, truncated to `filter.limit`
    fn snapshots_matching(&self, filter: &QueryFilter) -> ExResult<Vec<CdoSnapshot>>;
}

/// Snapshot selection criteria. All set criteria must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub global_id: Option<GlobalId>,
    pub type_name: Option<String>,
    /// Inclusive lower bound
    pub from_commit: Option<CommitId>,
    /// Inclusive upper bound
    pub to_commit: Option<CommitId>,
    pub version: Option<u64>,
    pub limit: usize,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            global_id: None,
            type_name: None,
            from_commit: None,
            to_commit: None,
            version: None,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_id(id: GlobalId) -> Self {
        Self {
            global_id: Some(id),
            ..Self::default()
        }
    }

    pub fn for_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::default()
        }
    }

    pub fn from_commit(mut self, id: CommitId) -> Self {
        self.from_commit = Some(id);
        self
    }

    pub fn to_commit(mut self, id: CommitId) -> Self {
        self.to_commit = Some(id);
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Reject filters that can never be answered
    pub fn validate(&self, op: &str) -> ExResult<()> {
        if self.limit == 0 {
            return Err(validation(op, "query limit must be greater than zero"));
        }
        if let (Some(from), Some(to)) = (self.from_commit, self.to_commit) {
            if from > to {
                return Err(validation(
                    op,
                    format!("commit range {}..={} is empty", from, to),
                ));
            }
        }
        if let Some(type_name) = &self.type_name {
            if type_name.trim().is_empty() {
                return Err(validation(op, "type filter must not be blank"));
            }
        }
        Ok(())
    }

    pub fn matches(&self, snapshot: &CdoSnapshot) -> bool {
        self.global_id
            .as_ref()
            .map_or(true, |id| snapshot.global_id() == id)
            && self
                .type_name
                .as_ref()
                .map_or(true, |t| &snapshot.cdo.type_name == t)
            && self.from_commit.map_or(true, |from| snapshot.commit_id() >= from)
            && self.to_commit.map_or(true, |to| snapshot.commit_id() <= to)
            && self.version.map_or(true, |v| snapshot.version == v)
    }
}
