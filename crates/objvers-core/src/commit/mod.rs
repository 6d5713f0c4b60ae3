//! Commits: identifiers, snapshots and construction

pub mod builder;
pub mod model;

pub use builder::CommitBuilder;
pub use model::{CdoSnapshot, Commit, CommitId, CommitMetadata, CommitOutcome, SnapshotType};
