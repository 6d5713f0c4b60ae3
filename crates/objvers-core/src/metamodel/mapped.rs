//! Semantic type categories
//!
//! Classification result for a declared type. The category decides how
//! values are flattened and how two values of the type are compared.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Bool,
    Int,
    Float,
    Char,
    Text,
}

impl PrimitiveKind {
    /// Recognize a built-in primitive type name
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(PrimitiveKind::Bool),
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "isize" | "usize" => {
                Some(PrimitiveKind::Int)
            }
            "f32" | "f64" => Some(PrimitiveKind::Float),
            "char" => Some(PrimitiveKind::Char),
            "String" | "str" => Some(PrimitiveKind::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionShape {
    List,
    Set,
    Map,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum MappedType {
    Primitive {
        kind: PrimitiveKind,
    },
    /// Optional primitive; absent values stay null instead of defaulting
    PrimitiveBox {
        kind: PrimitiveKind,
    },
    ValueObject {
        type_name: String,
    },
    Entity {
        type_name: String,
        id_property: String,
    },
    Collection {
        shape: CollectionShape,
        element: Box<MappedType>,
    },
    Array {
        element: Box<MappedType>,
    },
}

impl MappedType {
    pub fn category(&self) -> &'static str {
        match self {
            MappedType::Primitive { .. } => "primitive",
            MappedType::PrimitiveBox { .. } => "primitive_box",
            MappedType::ValueObject { .. } => "value_object",
            MappedType::Entity { .. } => "entity",
            MappedType::Collection { .. } => "collection",
            MappedType::Array { .. } => "array",
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, MappedType::Entity { .. })
    }

    /// Entities and value objects are the only types with properties
    pub fn is_managed(&self) -> bool {
        matches!(
            self,
            MappedType::Entity { .. } | MappedType::ValueObject { .. }
        )
    }
}

impl fmt::Display for MappedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappedType::Primitive { kind } => f.write_str(kind.as_str()),
            MappedType::PrimitiveBox { kind } => write!(f, "optional {}", kind.as_str()),
            MappedType::ValueObject { type_name } => write!(f, "value object {}", type_name),
            MappedType::Entity { type_name, .. } => write!(f, "entity {}", type_name),
            MappedType::Collection { shape, element } => {
                let shape = match shape {
                    CollectionShape::List => "list",
                    CollectionShape::Set => "set",
                    CollectionShape::Map => "map",
                };
                write!(f, "{} of {}", shape, element)
            }
            MappedType::Array { element } => write!(f, "array of {}", element),
        }
    }
}

/// Explicit, user-registered classification for a type name. Takes
/// precedence over every inferred rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "as", rename_all = "snake_case")]
pub enum TypeMapping {
    Entity { id_property: String },
    ValueObject,
    Primitive { kind: PrimitiveKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names() {
        assert_eq!(PrimitiveKind::from_type_name("u16"), Some(PrimitiveKind::Int));
        assert_eq!(PrimitiveKind::from_type_name("f32"), Some(PrimitiveKind::Float));
        assert_eq!(PrimitiveKind::from_type_name("str"), Some(PrimitiveKind::Text));
        assert_eq!(PrimitiveKind::from_type_name("Address"), None);
    }

    #[test]
    fn test_display_nested_collection() {
        let mapped = MappedType::Collection {
            shape: CollectionShape::List,
            element: Box::new(MappedType::Entity {
                type_name: "Person".into(),
                id_property: "id".into(),
            }),
        };
        assert_eq!(mapped.to_string(), "list of entity Person");
    }
}
