//! Schema format v0
//!
//! Defines the YAML structure of type schema files

use objvers_core::metamodel::TypeMapping;
use serde::{Deserialize, Serialize};

/// Top-level schema file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    #[serde(default)]
    pub types: Vec<SchemaType>,

    /// Explicit classifications, taking precedence over inference
    #[serde(default)]
    pub mappings: Vec<SchemaMapping>,
}

/// One domain type and its properties, in declaration order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaType {
    pub name: String,

    #[serde(default)]
    pub properties: Vec<SchemaProperty>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaProperty {
    pub name: String,

    /// Declared type expression, e.g. `List<Address>` or `Option<i64>`
    #[serde(rename = "type")]
    pub declared_type: String,

    #[serde(default)]
    pub id: bool,

    #[serde(default)]
    pub ignored: bool,

    #[serde(default)]
    pub shallow: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaMapping {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(flatten)]
    pub mapping: TypeMapping,
}
