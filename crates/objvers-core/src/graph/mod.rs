//! Object graphs: global ids, flattened nodes and graph construction

pub mod builder;
pub mod cdo;
pub mod global_id;
pub mod identity;

pub use builder::{default_value, GraphBuilder, LiveGraph};
pub use cdo::{Cdo, PropertyValue};
pub use global_id::{GlobalId, IdValue};
pub use identity::resolve_id;
