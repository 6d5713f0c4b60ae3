//! Repository layer persisting commits and snapshots to SQLite

pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepository;
