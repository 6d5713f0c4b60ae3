//! Core types shared across objvers facilities
//!
//! This crate provides the small set of types used by both the error
//! facility and the logging facility of `objvers-core`:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
