//! objvers engine - caller-facing facade
//!
//! [`Objvers`] owns a type registry, diff options and a repository, and
//! exposes compare, commit and history operations. Every operation runs
//! under a fresh request context and is bracketed by canonical
//! start/end/error log events.
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

pub mod builder;
pub mod objvers;

pub use builder::ObjversBuilder;
pub use objvers::Objvers;
