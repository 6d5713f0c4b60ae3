//! Schema parser with validation
//!
//! Parses YAML and validates the schema version, name uniqueness, identity
//! declarations and declared-type syntax

#![allow(clippy::result_large_err)]

use crate::errors::{schema_validation, Result};
use crate::schema::format_v0::SchemaV0;
use objvers_core::metamodel::{
    DeclaredScanner, DeclaredType, PropertyDescriptor, PropertyScanner, TypeDescriptor,
    TypeMapping, TypeRegistry,
};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// A validated schema, ready to seed a [`TypeRegistry`]
#[derive(Debug, Clone, Default)]
pub struct LoadedSchema {
    pub scanner: DeclaredScanner,
    pub mappings: Vec<(String, TypeMapping)>,
}

impl LoadedSchema {
    /// Build a registry over the schema's scanner with its mappings applied
    pub fn into_registry(self) -> TypeRegistry {
        let scanner: Arc<dyn PropertyScanner> = Arc::new(self.scanner);
        let mut registry = TypeRegistry::new(scanner);
        for (type_name, mapping) in self.mappings {
            registry.register_mapping(type_name, mapping);
        }
        registry
    }
}

/// Parse a schema file from a path
pub fn parse_schema_file(path: &Path) -> Result<LoadedSchema> {
    let content = fs::read_to_string(path).map_err(|e| {
        schema_validation(&format!(
            "Failed to read schema file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_schema_str(&content)
}

/// Parse a schema from a string
pub fn parse_schema_str(content: &str) -> Result<LoadedSchema> {
    let schema: SchemaV0 = serde_yaml::from_str(content)
        .map_err(|e| schema_validation(&format!("YAML parse error: {}", e)))?;

    build(schema)
}

fn build(schema: SchemaV0) -> Result<LoadedSchema> {
    if schema.schema_version != 0 {
        return Err(schema_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            schema.schema_version
        )));
    }

    let mut loaded = LoadedSchema::default();
    let mut type_names = HashSet::new();

    for ty in schema.types {
        if ty.name.trim().is_empty() {
            return Err(schema_validation("Type name must not be blank"));
        }
        if !type_names.insert(ty.name.clone()) {
            return Err(schema_validation(&format!("Duplicate type {}", ty.name)));
        }

        let mut descriptor = TypeDescriptor::new(ty.name.as_str());
        let mut property_names = HashSet::new();
        let mut id_count = 0;

        for prop in ty.properties {
            if !property_names.insert(prop.name.clone()) {
                return Err(schema_validation(&format!(
                    "Duplicate property {} in type {}",
                    prop.name, ty.name
                )));
            }
            let declared = DeclaredType::parse(&prop.declared_type).map_err(|e| {
                schema_validation(&format!("Property {}.{}: {}", ty.name, prop.name, e))
            })?;

            let mut property = PropertyDescriptor::new(prop.name, declared);
            if prop.id {
                id_count += 1;
                property = property.as_id();
            }
            if prop.ignored {
                property = property.as_ignored();
            }
            if prop.shallow {
                property = property.as_shallow();
            }
            descriptor = descriptor.with(property);
        }

        if id_count > 1 {
            return Err(schema_validation(&format!(
                "Type {} declares {} id properties, at most one is allowed",
                ty.name, id_count
            )));
        }
        loaded.scanner.register(descriptor);
    }

    let mut mapped = HashSet::new();
    for entry in schema.mappings {
        if !mapped.insert(entry.type_name.clone()) {
            return Err(schema_validation(&format!(
                "Duplicate mapping for type {}",
                entry.type_name
            )));
        }
        loaded.mappings.push((entry.type_name, entry.mapping));
    }

    tracing::debug!(
        type_count = loaded.scanner.type_names().len(),
        mapping_count = loaded.mappings.len(),
        "loaded type schema"
    );
    Ok(loaded)
}
