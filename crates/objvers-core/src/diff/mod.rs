//! Graph diffing.
//!
//! ## Entry point
//!
//! ```
//! use objvers_core::diff::{DiffEngine, DiffOptions};
//! use objvers_core::graph::GraphBuilder;
//! use objvers_core::metamodel::{DeclaredScanner, TypeDescriptor, TypeRegistry};
//! use objvers_core::object::Object;
//! use std::sync::Arc;
//!
//! let scanner = DeclaredScanner::new()
//!     .with_type(TypeDescriptor::new("Person").id("id", "i64").property("name", "String"));
//! let registry = TypeRegistry::new(Arc::new(scanner));
//! let builder = GraphBuilder::new(&registry);
//!
//! let old = builder.build(&Object::new("Person").with("id", 1).with("name", "Ann")).unwrap();
//! let new = builder.build(&Object::new("Person").with("id", 1).with("name", "Anna")).unwrap();
//! let diff = DiffEngine::new(&registry, DiffOptions::default())
//!     .compare(Some(&old), Some(&new))
//!     .unwrap();
//! assert_eq!(diff.len(), 1);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical change lists.
//! - **Reflexivity**: comparing a graph with itself yields an empty diff.
//! - **No partial diffs**: any classification or identity failure aborts the comparison.

pub mod changelog;
pub mod engine;
pub mod list;
pub mod model;

pub use changelog::{process_change_list, render_change_log, ChangeProcessor, TextChangeLog};
pub use engine::{DiffEngine, DiffOptions};
pub use list::ListCompareAlgorithm;
pub use model::{Change, ChangeKind, Diff, ElementChange, EntryChange};
