//! objvers store - SQLite persistence and file loaders
//!
//! Provides:
//! - SQLite schema with an embedded, checksummed migrations framework
//! - [`SqliteRepository`], the durable implementation of the core
//!   `Repository` contract
//! - YAML type schema loader
//! - JSON object document loader

pub mod db;
pub mod document;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod schema;

// Re-export key types
pub use errors::Result;
pub use repo::SqliteRepository;
