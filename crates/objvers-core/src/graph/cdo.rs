//! Flattened object state
//!
//! A [`Cdo`] is one graph node after flattening: its global id and the value
//! of every non-ignored property. References to other entities are reduced to
//! their [`GlobalId`]; value objects are embedded as nested Cdos.

use super::global_id::GlobalId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(#[serde(with = "float_repr")] f64),
    Text(String),
    Reference(GlobalId),
    ValueObject(Box<Cdo>),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Type-aware equality: integers and floats compare numerically, NaN
    /// equals NaN, value objects compare structurally.
    pub fn same_as(&self, other: &PropertyValue) -> bool {
        use PropertyValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => float_eq(*a, *b),
            (Int(a), Float(b)) | (Float(b), Int(a)) => float_eq(*a as f64, *b),
            (List(a), List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (Map(a), Map(b)) => same_entries(a, b),
            (ValueObject(a), ValueObject(b)) => a.same_state(b),
            _ => self == other,
        }
    }

    pub fn as_reference(&self) -> Option<&GlobalId> {
        match self {
            PropertyValue::Reference(id) => Some(id),
            _ => None,
        }
    }

    /// Elements of a list-like value; null reads as empty
    pub fn elements(&self) -> &[PropertyValue] {
        match self {
            PropertyValue::List(items) => items,
            _ => &[],
        }
    }
}

fn same_entries(a: &BTreeMap<String, PropertyValue>, b: &BTreeMap<String, PropertyValue>) -> bool {
    a.len() == b.len() && a.iter().all(|(k, x)| b.get(k).is_some_and(|y| x.same_as(y)))
}

fn float_eq(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// JSON has no NaN or infinities; those are written as the strings `"NaN"`,
/// `"Infinity"` and `"-Infinity"`.
mod float_repr {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() && *value > 0.0 {
            serializer.serialize_str("Infinity")
        } else if value.is_infinite() {
            serializer.serialize_str("-Infinity")
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Named(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Named(name) => match name.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => Err(de::Error::custom(format!("invalid float `{}`", other))),
            },
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => f.write_str("null"),
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Text(v) => f.write_str(v),
            PropertyValue::Reference(id) => write!(f, "{}", id),
            PropertyValue::ValueObject(cdo) => write!(f, "{}", cdo),
            PropertyValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            PropertyValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A flattened graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cdo {
    pub global_id: GlobalId,
    pub type_name: String,
    pub state: BTreeMap<String, PropertyValue>,
}

impl Cdo {
    pub fn new(global_id: GlobalId, type_name: impl Into<String>) -> Self {
        Self {
            global_id,
            type_name: type_name.into(),
            state: BTreeMap::new(),
        }
    }

    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        self.state.get(property)
    }

    /// Same type and same property values, ignoring the global id
    pub fn same_state(&self, other: &Cdo) -> bool {
        self.type_name == other.type_name && same_entries(&self.state, &other.state)
    }
}

impl fmt::Display for Cdo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.type_name)?;
        for (i, (name, value)) in self.state.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_widening() {
        assert!(PropertyValue::Int(3).same_as(&PropertyValue::Float(3.0)));
        assert!(!PropertyValue::Int(3).same_as(&PropertyValue::Float(3.5)));
        assert!(PropertyValue::Float(f64::NAN).same_as(&PropertyValue::Float(f64::NAN)));
    }

    #[test]
    fn test_null_is_not_zero() {
        assert!(!PropertyValue::Null.same_as(&PropertyValue::Int(0)));
        assert!(PropertyValue::Null.same_as(&PropertyValue::Null));
    }

    #[test]
    fn test_value_objects_compare_structurally() {
        let owner = GlobalId::instance("Person", 1);
        let mut a = Cdo::new(GlobalId::value_object("Address", owner.clone(), "home"), "Address");
        a.state.insert("city".into(), PropertyValue::Text("Paris".into()));
        let mut b = a.clone();
        b.global_id = GlobalId::value_object("Address", owner, "work");

        assert!(PropertyValue::ValueObject(Box::new(a.clone()))
            .same_as(&PropertyValue::ValueObject(Box::new(b.clone()))));

        b.state.insert("city".into(), PropertyValue::Text("Lyon".into()));
        assert!(!a.same_state(&b));
    }

    #[test]
    fn test_non_finite_floats_survive_json() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 2.5] {
            let json = serde_json::to_string(&PropertyValue::Float(value)).unwrap();
            let back: PropertyValue = serde_json::from_str(&json).unwrap();
            assert!(back.same_as(&PropertyValue::Float(value)), "{} read back as {}", json, back);
        }
        let json = serde_json::to_value(PropertyValue::Float(f64::NAN)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "float", "value": "NaN"}));
    }

    #[test]
    fn test_unknown_float_name_rejected() {
        let result: serde_json::Result<PropertyValue> =
            serde_json::from_str(r#"{"type":"float","value":"Huge"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        let value = PropertyValue::List(vec![
            PropertyValue::Text("a".into()),
            PropertyValue::Reference(GlobalId::instance("Person", 2)),
        ]);
        assert_eq!(value.to_string(), "[a, Person/2]");
    }
}
