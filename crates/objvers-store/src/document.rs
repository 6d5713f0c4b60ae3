//! Object documents
//!
//! Loads a domain object graph from JSON. A JSON object carrying a `"$type"`
//! key becomes an [`Object`] of that type; any other JSON object is read as
//! a string-keyed map.
//!
//! ```json
//! { "$type": "Person", "id": 1, "name": "Ann",
//!   "address": { "$type": "Address", "city": "Paris" },
//!   "tags": ["a", "b"] }
//! ```

#![allow(clippy::result_large_err)]

use crate::errors::{document_error, Result};
use objvers_core::object::{Object, Value};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Key naming the domain type of a JSON object
pub const TYPE_KEY: &str = "$type";

/// Parse an object document from a path
pub fn parse_object_file(path: &Path) -> Result<Object> {
    let content = fs::read_to_string(path).map_err(|e| {
        document_error(&format!(
            "Failed to read document {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_object_str(&content)
}

/// Parse an object document from a string. The top level must be a typed
/// object.
pub fn parse_object_str(content: &str) -> Result<Object> {
    let json: Json = serde_json::from_str(content)
        .map_err(|e| document_error(&format!("JSON parse error: {}", e)))?;
    match json {
        Json::Object(fields) if fields.contains_key(TYPE_KEY) => to_object(fields, "$"),
        _ => Err(document_error(&format!(
            "Document root must be an object with a \"{}\" key",
            TYPE_KEY
        ))),
    }
}

fn to_object(mut fields: Map<String, Json>, path: &str) -> Result<Object> {
    let type_name = match fields.remove(TYPE_KEY) {
        Some(Json::String(name)) if !name.trim().is_empty() => name,
        _ => {
            return Err(document_error(&format!(
                "{}: \"{}\" must be a non-blank string",
                path, TYPE_KEY
            )))
        }
    };

    let mut object = Object::new(type_name);
    for (name, value) in fields {
        let child = format!("{}.{}", path, name);
        object.set(name, to_value(value, &child)?);
    }
    Ok(object)
}

fn to_value(json: Json, path: &str) -> Result<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None if n.is_u64() => {
                return Err(document_error(&format!(
                    "{}: integer {} is out of range",
                    path, n
                )))
            }
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::Text(s),
        Json::Array(items) => Value::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| to_value(item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>>>()?,
        ),
        Json::Object(fields) if fields.contains_key(TYPE_KEY) => {
            Value::Object(to_object(fields, path)?)
        }
        Json::Object(fields) => Value::Map(
            fields
                .into_iter()
                .map(|(key, item)| {
                    let child = format!("{}.{}", path, key);
                    to_value(item, &child).map(|v| (key, v))
                })
                .collect::<Result<BTreeMap<_, _>>>()?,
        ),
    })
}
