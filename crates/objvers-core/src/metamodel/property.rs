use super::declared::DeclaredType;
use serde::{Deserialize, Serialize};

/// A named, typed property of a domain type as reported by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub declared_type: DeclaredType,
    /// Excluded from flattening and diffing entirely
    #[serde(default)]
    pub ignored: bool,
    /// Entity references are recorded by id only and not traversed
    #[serde(default)]
    pub shallow_reference: bool,
    /// Marks the identity property of an entity
    #[serde(default)]
    pub id: bool,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<DeclaredType>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            ignored: false,
            shallow_reference: false,
            id: false,
        }
    }

    pub fn as_id(mut self) -> Self {
        self.id = true;
        self
    }

    pub fn as_ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn as_shallow(mut self) -> Self {
        self.shallow_reference = true;
        self
    }
}
