//! Commit and snapshot types

use crate::diff::Diff;
use crate::graph::{Cdo, GlobalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commit identifier `major.minor`, totally ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId {
    major: u64,
    minor: u32,
}

impl CommitId {
    pub fn new(major: u64, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Id of the first commit in an empty repository
    pub fn first() -> Self {
        Self::new(1, 0)
    }

    /// Successor allocated after this id: `(major + 1).0`
    pub fn next(&self) -> Self {
        Self::new(self.major + 1, 0)
    }

    /// Id to allocate after `head`, or the first id if there is none
    pub fn after(head: Option<CommitId>) -> Self {
        head.map_or_else(Self::first, |h| h.next())
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for CommitId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.split_once('.').unwrap_or((s, "0"));
        let major = major
            .parse()
            .map_err(|_| format!("invalid commit id: {}", s))?;
        let minor = minor
            .parse()
            .map_err(|_| format!("invalid commit id: {}", s))?;
        Ok(Self { major, minor })
    }
}

impl TryFrom<String> for CommitId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMetadata {
    pub id: CommitId,
    pub author: String,
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotType {
    Initial,
    Update,
    Terminal,
}

impl SnapshotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotType::Initial => "INITIAL",
            SnapshotType::Update => "UPDATE",
            SnapshotType::Terminal => "TERMINAL",
        }
    }
}

impl FromStr for SnapshotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(SnapshotType::Initial),
            "UPDATE" => Ok(SnapshotType::Update),
            "TERMINAL" => Ok(SnapshotType::Terminal),
            other => Err(format!("unknown snapshot type: {}", other)),
        }
    }
}

/// Recorded state of one global id at one commit. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdoSnapshot {
    pub cdo: Cdo,
    pub commit: CommitMetadata,
    pub snapshot_type: SnapshotType,
    /// 1-based, incremented per snapshot of the same global id
    pub version: u64,
    pub changed_properties: Vec<String>,
}

impl CdoSnapshot {
    pub fn global_id(&self) -> &GlobalId {
        &self.cdo.global_id
    }

    pub fn commit_id(&self) -> CommitId {
        self.commit.id
    }

    pub fn is_initial(&self) -> bool {
        self.snapshot_type == SnapshotType::Initial
    }

    pub fn is_terminal(&self) -> bool {
        self.snapshot_type == SnapshotType::Terminal
    }
}

/// An immutable unit of recorded change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub metadata: CommitMetadata,
    pub snapshots: Vec<CdoSnapshot>,
    pub diff: Diff,
}

impl Commit {
    pub fn id(&self) -> CommitId {
        self.metadata.id
    }

    pub fn author(&self) -> &str {
        &self.metadata.author
    }
}

/// Result of committing a graph
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed(Commit),
    /// Nothing changed since the last recorded state; no id was allocated
    Unchanged,
}

impl CommitOutcome {
    pub fn commit(&self) -> Option<&Commit> {
        match self {
            CommitOutcome::Committed(commit) => Some(commit),
            CommitOutcome::Unchanged => None,
        }
    }

    pub fn into_commit(self) -> Option<Commit> {
        match self {
            CommitOutcome::Committed(commit) => Some(commit),
            CommitOutcome::Unchanged => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_id_allocation() {
        assert_eq!(CommitId::after(None), CommitId::new(1, 0));
        assert_eq!(CommitId::after(Some(CommitId::new(4, 2))), CommitId::new(5, 0));
    }

    #[test]
    fn test_commit_id_ordering() {
        let mut ids = vec![
            CommitId::new(2, 0),
            CommitId::new(1, 1),
            CommitId::new(10, 0),
            CommitId::new(1, 0),
        ];
        ids.sort();
        let text: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(text, vec!["1.0", "1.1", "2.0", "10.0"]);
    }

    #[test]
    fn test_commit_id_parse() {
        assert_eq!("3.1".parse::<CommitId>().unwrap(), CommitId::new(3, 1));
        assert_eq!("7".parse::<CommitId>().unwrap(), CommitId::new(7, 0));
        assert!("x.1".parse::<CommitId>().is_err());
    }

    #[test]
    fn test_commit_id_serializes_as_string() {
        let json = serde_json::to_string(&CommitId::new(2, 0)).unwrap();
        assert_eq!(json, "\"2.0\"");
    }
}
