//! objvers core - object graph versioning kernel
//!
//! This crate provides:
//! - The metamodel: declared types, property descriptors and the type registry
//! - Identity resolution and graph flattening into [`graph::Cdo`] nodes
//! - The graph diff engine and change-log rendering
//! - Commit construction, the repository contract and an in-memory repository
//! - History queries over persisted snapshots
//! - The error facility ([`ExError`]) and the structured logging facility

pub mod commit;
pub mod diff;
pub mod errors;
pub mod graph;
pub mod logging_facility;
pub mod metamodel;
pub mod object;
pub mod query;
pub mod repository;

pub use objvers_core_types;

// Re-export commonly used types
pub use commit::{CdoSnapshot, Commit, CommitBuilder, CommitId, CommitMetadata, CommitOutcome, SnapshotType};
pub use diff::{Change, ChangeKind, Diff, DiffEngine, DiffOptions, ListCompareAlgorithm};
pub use errors::{ExError, ExErrorKind, ExResult, ObjversError, Result};
pub use graph::{Cdo, GlobalId, GraphBuilder, IdValue, LiveGraph, PropertyValue};
pub use metamodel::{DeclaredScanner, DeclaredType, MappedType, PropertyScanner, TypeDescriptor, TypeMapping, TypeRegistry};
pub use object::{Object, Value, Versioned};
pub use query::QueryRunner;
pub use repository::{InMemoryRepository, QueryFilter, Repository};
