//! Identity resolution

use super::global_id::{GlobalId, IdValue};
use crate::errors::{ObjversError, Result};
use crate::metamodel::MappedType;
use crate::object::{Object, Value};

/// Derive the global id of a graph root or of an entity reached by reference
///
/// Entities read their identity property. A value object resolved here is a
/// root and gets an unbounded id; value objects nested under an owner are
/// identified by [`GlobalId::value_object`] during flattening.
pub fn resolve_id(object: &Object, mapped: &MappedType) -> Result<GlobalId> {
    match mapped {
        MappedType::Entity {
            type_name,
            id_property,
        } => {
            let id = match object.get(id_property) {
                None | Some(Value::Null) => {
                    return Err(ObjversError::MissingId {
                        type_name: type_name.clone(),
                        id_property: id_property.clone(),
                    })
                }
                Some(Value::Int(v)) => IdValue::Int(*v),
                Some(Value::Text(v)) => IdValue::Text(v.clone()),
                Some(other) => {
                    return Err(ObjversError::InvalidIdValue {
                        type_name: type_name.clone(),
                        found: other.kind_name().to_string(),
                    })
                }
            };
            Ok(GlobalId::Instance {
                type_name: type_name.clone(),
                id,
            })
        }
        MappedType::ValueObject { type_name } => Ok(GlobalId::unbounded(type_name.clone())),
        other => Err(ObjversError::NotVersionable {
            type_name: object.type_name().to_string(),
            category: other.category().to_string(),
        }),
    }
}
