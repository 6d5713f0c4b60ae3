//! Property discovery
//!
//! Rust has no runtime reflection, so the properties of each domain type are
//! supplied by a [`PropertyScanner`]. [`DeclaredScanner`] is a plain
//! descriptor table, built in code or loaded from a schema file.

use super::declared::DeclaredType;
use super::property::PropertyDescriptor;
use std::collections::HashMap;

/// Source of ordered property descriptors per type name
pub trait PropertyScanner: Send + Sync {
    /// Properties of `type_name` in declaration order, or `None` if the
    /// scanner does not know the type
    fn scan(&self, type_name: &str) -> Option<Vec<PropertyDescriptor>>;
}

/// Builder for the descriptor list of a single type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    name: String,
    properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Identity property
    pub fn id(self, name: &str, declared_type: impl Into<DeclaredType>) -> Self {
        self.with(PropertyDescriptor::new(name, declared_type).as_id())
    }

    pub fn property(self, name: &str, declared_type: impl Into<DeclaredType>) -> Self {
        self.with(PropertyDescriptor::new(name, declared_type))
    }

    pub fn shallow(self, name: &str, declared_type: impl Into<DeclaredType>) -> Self {
        self.with(PropertyDescriptor::new(name, declared_type).as_shallow())
    }

    pub fn ignored(self, name: &str, declared_type: impl Into<DeclaredType>) -> Self {
        self.with(PropertyDescriptor::new(name, declared_type).as_ignored())
    }

    pub fn with(mut self, descriptor: PropertyDescriptor) -> Self {
        self.properties.push(descriptor);
        self
    }
}

/// Descriptor-table scanner
#[derive(Debug, Clone, Default)]
pub struct DeclaredScanner {
    types: HashMap<String, Vec<PropertyDescriptor>>,
}

impl DeclaredScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the descriptors of one type
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name, descriptor.properties);
    }

    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PropertyScanner for DeclaredScanner {
    fn scan(&self, type_name: &str) -> Option<Vec<PropertyDescriptor>> {
        self.types.get(type_name).cloned()
    }
}
