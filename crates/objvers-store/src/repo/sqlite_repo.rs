//! SQLite repository implementation
//!
//! Commits are appended inside an `IMMEDIATE` transaction. The head commit
//! id and the recorded snapshot versions are re-read inside that transaction,
//! so a writer in another process that got there first surfaces as
//! `ConcurrentCommitConflict`, never as a gap or a duplicate.

#![allow(clippy::result_large_err)]

use crate::db;
use crate::errors::{column_codec, from_rusqlite, Result};
use crate::migrations::apply_migrations;
use chrono::{DateTime, SecondsFormat, Utc};
use objvers_core::commit::{CdoSnapshot, Commit, CommitId, CommitMetadata, SnapshotType};
use objvers_core::errors::{ExError, ExErrorKind};
use objvers_core::graph::{Cdo, GlobalId};
use objvers_core::repository::{QueryFilter, Repository};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SNAPSHOT_COLUMNS: &str = "c.major, c.minor, c.author, c.committed_at, \
     s.snapshot_type, s.version, s.cdo_json, s.changed_properties_json";

/// SQLite-backed [`Repository`]
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) a database file and bring its schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        Self::from_connection(conn)
    }

    /// Fresh in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            ExError::new(ExErrorKind::Repository).with_message("sqlite connection lock poisoned")
        })
    }

    /// Number of stored snapshots
    pub fn snapshot_count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        from_sql_int(count, "snapshot count")
    }
}

impl std::fmt::Debug for SqliteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRepository").finish_non_exhaustive()
    }
}

impl Repository for SqliteRepository {
    fn persist(&self, commit: &Commit) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        let expected = CommitId::after(query_head(&tx)?);
        if commit.id() != expected {
            return Err(conflict(commit.id())
                .with_message(format!("expected commit id {}", expected)));
        }
        for snapshot in &commit.snapshots {
            let recorded = query_version(&tx, &snapshot.global_id().key())?;
            if snapshot.version != recorded + 1 {
                return Err(conflict(commit.id())
                    .with_global_id(snapshot.global_id().to_string())
                    .with_message(format!(
                        "snapshot version {} does not follow recorded version {}",
                        snapshot.version, recorded
                    )));
            }
        }

        tx.execute(
            "INSERT INTO commits (major, minor, author, committed_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                to_sql_int(commit.id().major(), "commit major")?,
                i64::from(commit.id().minor()),
                commit.metadata.author,
                commit
                    .metadata
                    .committed_at
                    .to_rfc3339_opts(SecondsFormat::Nanos, true),
            ],
        )
        .map_err(|e| unique_or_repository(e, commit.id()))?;
        let commit_seq = tx.last_insert_rowid();

        for snapshot in &commit.snapshots {
            insert_snapshot(&tx, commit_seq, snapshot)?;
        }

        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(
            commit_id = %commit.id(),
            snapshot_count = commit.snapshots.len(),
            "commit appended to sqlite repository"
        );
        Ok(())
    }

    fn head_commit_id(&self) -> Result<Option<CommitId>> {
        let conn = self.lock()?;
        query_head(&conn)
    }

    fn latest_snapshot(&self, id: &GlobalId) -> Result<Option<CdoSnapshot>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM snapshots s JOIN commits c ON c.seq = s.commit_seq \
             WHERE s.global_id = ?1 ORDER BY s.version DESC LIMIT 1",
            SNAPSHOT_COLUMNS
        );
        let raw = conn
            .query_row(&sql, [id.key()], RawSnapshot::from_row)
            .optional()
            .map_err(from_rusqlite)?;
        raw.map(RawSnapshot::into_snapshot).transpose()
    }

    fn snapshots_matching(&self, filter: &QueryFilter) -> Result<Vec<CdoSnapshot>> {
        filter.validate("snapshots_matching")?;

        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<SqlValue> = Vec::new();

        if let Some(id) = &filter.global_id {
            clauses.push("s.global_id = ?");
            params.push(SqlValue::Text(id.key()));
        }
        if let Some(type_name) = &filter.type_name {
            clauses.push("s.type_name = ?");
            params.push(SqlValue::Text(type_name.clone()));
        }
        if let Some(from) = filter.from_commit {
            clauses.push("(c.major > ? OR (c.major = ? AND c.minor >= ?))");
            let major = to_sql_int(from.major(), "commit major")?;
            params.push(SqlValue::Integer(major));
            params.push(SqlValue::Integer(major));
            params.push(SqlValue::Integer(i64::from(from.minor())));
        }
        if let Some(to) = filter.to_commit {
            clauses.push("(c.major < ? OR (c.major = ? AND c.minor <= ?))");
            let major = to_sql_int(to.major(), "commit major")?;
            params.push(SqlValue::Integer(major));
            params.push(SqlValue::Integer(major));
            params.push(SqlValue::Integer(i64::from(to.minor())));
        }
        if let Some(version) = filter.version {
            clauses.push("s.version = ?");
            params.push(SqlValue::Integer(to_sql_int(version, "version")?));
        }
        params.push(SqlValue::Integer(to_sql_int(filter.limit as u64, "limit")?));

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM snapshots s JOIN commits c ON c.seq = s.commit_seq {} \
             ORDER BY c.major DESC, c.minor DESC, s.seq ASC LIMIT ?",
            SNAPSHOT_COLUMNS, where_clause
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), RawSnapshot::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter().map(RawSnapshot::into_snapshot).collect()
    }
}

fn insert_snapshot(tx: &Transaction, commit_seq: i64, snapshot: &CdoSnapshot) -> Result<()> {
    let cdo_json = serde_json::to_string(&snapshot.cdo).map_err(|e| column_codec("cdo_json", e))?;
    let changed = serde_json::to_string(&snapshot.changed_properties)
        .map_err(|e| column_codec("changed_properties_json", e))?;

    tx.execute(
        "INSERT INTO snapshots (
            commit_seq, global_id, type_name, snapshot_type, version, cdo_json,
            changed_properties_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            commit_seq,
            snapshot.global_id().key(),
            snapshot.cdo.type_name,
            snapshot.snapshot_type.as_str(),
            to_sql_int(snapshot.version, "version")?,
            cdo_json,
            changed,
        ],
    )
    .map_err(|e| unique_or_repository(e, snapshot.commit_id()))?;
    Ok(())
}

fn query_head(conn: &Connection) -> Result<Option<CommitId>> {
    let row: Option<(i64, i64)> = conn
        .query_row(
            "SELECT major, minor FROM commits ORDER BY major DESC, minor DESC LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(from_rusqlite)?;
    row.map(|(major, minor)| commit_id(major, minor)).transpose()
}

fn query_version(conn: &Connection, key: &str) -> Result<u64> {
    let version: Option<i64> = conn
        .query_row(
            "SELECT MAX(version) FROM snapshots WHERE global_id = ?1",
            [key],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;
    version.map_or(Ok(0), |v| from_sql_int(v, "version"))
}

/// Columns of one snapshot row before decoding
struct RawSnapshot {
    major: i64,
    minor: i64,
    author: String,
    committed_at: String,
    snapshot_type: String,
    version: i64,
    cdo_json: String,
    changed_properties_json: String,
}

impl RawSnapshot {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            major: row.get(0)?,
            minor: row.get(1)?,
            author: row.get(2)?,
            committed_at: row.get(3)?,
            snapshot_type: row.get(4)?,
            version: row.get(5)?,
            cdo_json: row.get(6)?,
            changed_properties_json: row.get(7)?,
        })
    }

    fn into_snapshot(self) -> Result<CdoSnapshot> {
        let committed_at = DateTime::parse_from_rfc3339(&self.committed_at)
            .map_err(|e| corrupt(format!("committed_at {}: {}", self.committed_at, e)))?
            .with_timezone(&Utc);
        let snapshot_type = self.snapshot_type.parse::<SnapshotType>().map_err(corrupt)?;
        let cdo: Cdo =
            serde_json::from_str(&self.cdo_json).map_err(|e| column_codec("cdo_json", e))?;
        let changed_properties: Vec<String> = serde_json::from_str(&self.changed_properties_json)
            .map_err(|e| column_codec("changed_properties_json", e))?;

        Ok(CdoSnapshot {
            cdo,
            commit: CommitMetadata {
                id: commit_id(self.major, self.minor)?,
                author: self.author,
                committed_at,
            },
            snapshot_type,
            version: from_sql_int(self.version, "version")?,
            changed_properties,
        })
    }
}

fn commit_id(major: i64, minor: i64) -> Result<CommitId> {
    let minor = u32::try_from(minor)
        .map_err(|_| corrupt(format!("commit minor {} out of range", minor)))?;
    Ok(CommitId::new(from_sql_int(major, "commit major")?, minor))
}

fn to_sql_int(value: u64, what: &str) -> Result<i64> {
    i64::try_from(value).map_err(|_| {
        ExError::new(ExErrorKind::Repository)
            .with_op("sqlite_codec")
            .with_message(format!("{} {} does not fit in an integer column", what, value))
    })
}

fn from_sql_int(value: i64, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| corrupt(format!("{} {} is negative", what, value)))
}

fn corrupt(message: String) -> ExError {
    ExError::new(ExErrorKind::Repository)
        .with_op("sqlite_codec")
        .with_message(message)
}

fn conflict(id: CommitId) -> ExError {
    ExError::new(ExErrorKind::ConcurrentCommitConflict)
        .with_op("persist")
        .with_commit_id(id.to_string())
}

/// A unique-constraint failure means another writer allocated the same id
fn unique_or_repository(err: rusqlite::Error, id: CommitId) -> ExError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            conflict(id).with_message(err.to_string())
        }
        _ => from_rusqlite(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objvers_core::diff::Diff;

    fn commit(id: u64, snapshots: &[(i64, u64)]) -> Commit {
        let metadata = CommitMetadata {
            id: CommitId::new(id, 0),
            author: "ann".into(),
            committed_at: Utc::now(),
        };
        Commit {
            snapshots: snapshots
                .iter()
                .map(|&(entity, version)| CdoSnapshot {
                    cdo: Cdo::new(GlobalId::instance("Person", entity), "Person"),
                    commit: metadata.clone(),
                    snapshot_type: if version == 1 {
                        SnapshotType::Initial
                    } else {
                        SnapshotType::Update
                    },
                    version,
                    changed_properties: vec!["name".into()],
                })
                .collect(),
            metadata,
            diff: Diff::empty(),
        }
    }

    #[test]
    fn test_persist_and_read_back() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let first = commit(1, &[(1, 1)]);
        repo.persist(&first).unwrap();

        assert_eq!(repo.head_commit_id().unwrap(), Some(CommitId::new(1, 0)));
        let latest = repo
            .latest_snapshot(&GlobalId::instance("Person", 1))
            .unwrap()
            .unwrap();
        assert_eq!(latest, first.snapshots[0]);
    }

    #[test]
    fn test_gap_rejected_and_nothing_persisted() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.persist(&commit(1, &[(1, 1)])).unwrap();

        let err = repo.persist(&commit(3, &[(2, 1)])).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ConcurrentCommitConflict);
        assert_eq!(err.commit_id(), Some("3.0"));
        assert_eq!(repo.snapshot_count().unwrap(), 1);
    }

    #[test]
    fn test_version_gap_rejected() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.persist(&commit(1, &[(1, 1)])).unwrap();
        let err = repo.persist(&commit(2, &[(1, 3)])).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ConcurrentCommitConflict);
        assert_eq!(err.global_id(), Some("Person/1"));
        assert_eq!(repo.head_commit_id().unwrap(), Some(CommitId::new(1, 0)));
    }

    #[test]
    fn test_snapshots_ordered_newest_first() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.persist(&commit(1, &[(1, 1), (2, 1)])).unwrap();
        repo.persist(&commit(2, &[(1, 2)])).unwrap();

        let all = repo.snapshots_matching(&QueryFilter::new()).unwrap();
        let order: Vec<String> = all
            .iter()
            .map(|s| format!("{}@{}", s.global_id(), s.commit_id()))
            .collect();
        assert_eq!(order, vec!["Person/1@2.0", "Person/1@1.0", "Person/2@1.0"]);
    }

    #[test]
    fn test_filters() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.persist(&commit(1, &[(1, 1), (2, 1)])).unwrap();
        repo.persist(&commit(2, &[(1, 2)])).unwrap();
        repo.persist(&commit(3, &[(1, 3)])).unwrap();

        let person_1 = GlobalId::instance("Person", 1);
        let ranged = repo
            .snapshots_matching(
                &QueryFilter::for_id(person_1.clone())
                    .from_commit(CommitId::new(2, 0))
                    .to_commit(CommitId::new(3, 0)),
            )
            .unwrap();
        assert_eq!(ranged.len(), 2);

        let versioned = repo
            .snapshots_matching(&QueryFilter::for_id(person_1).with_version(1))
            .unwrap();
        assert_eq!(versioned.len(), 1);
        assert_eq!(versioned[0].commit_id(), CommitId::new(1, 0));

        let limited = repo
            .snapshots_matching(&QueryFilter::for_type("Person").with_limit(2))
            .unwrap();
        assert_eq!(limited.len(), 2);

        assert!(repo
            .snapshots_matching(&QueryFilter::for_type("Team"))
            .unwrap()
            .is_empty());
    }
}
