//! Type schema files
//!
//! A schema file declares the domain types the engine can version, their
//! properties and any explicit classifications:
//!
//! ```yaml
//! schema_version: 0
//! types:
//!   - name: Person
//!     properties:
//!       - { name: id, type: i64, id: true }
//!       - { name: name, type: String }
//!       - { name: address, type: Option<Address> }
//!       - { name: boss, type: Option<Person>, shallow: true }
//!   - name: Address
//!     properties:
//!       - { name: city, type: String }
//! mappings:
//!   - { type: Address, as: value_object }
//! ```

pub mod format_v0;
pub mod parser;

pub use format_v0::{SchemaMapping, SchemaProperty, SchemaType, SchemaV0};
pub use parser::{parse_schema_file, parse_schema_str, LoadedSchema};
