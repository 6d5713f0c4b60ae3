//! Global identifiers
//!
//! Display forms:
//!
//! - `Person/1` for an entity instance
//! - `Person/1#address` for a value object owned by an entity
//! - `Address/` for a value object passed as a graph root
//!
//! Text ids that would read back as something else (an integer, an empty id,
//! or text containing `#` or a leading `'`) are quoted: `Tag/'7'`.

use crate::errors::{ObjversError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity value read from an entity's id property
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::Int(v) => write!(f, "{}", v),
            IdValue::Text(v) if needs_quotes(v) => write!(f, "'{}'", v),
            IdValue::Text(v) => f.write_str(v),
        }
    }
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty() || text.starts_with('\'') || text.contains('#') || text.parse::<i64>().is_ok()
}

impl FromStr for IdValue {
    type Err = ObjversError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
            return Ok(IdValue::Text(s[1..s.len() - 1].to_string()));
        }
        if s.is_empty() || s.contains('#') || s.starts_with('\'') {
            return Err(ObjversError::InvalidGlobalId {
                input: s.to_string(),
            });
        }
        Ok(s.parse::<i64>()
            .map(IdValue::Int)
            .unwrap_or_else(|_| IdValue::Text(s.to_string())))
    }
}

impl From<i64> for IdValue {
    fn from(v: i64) -> Self {
        IdValue::Int(v)
    }
}

impl From<&str> for IdValue {
    fn from(v: &str) -> Self {
        IdValue::Text(v.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlobalId {
    Instance {
        type_name: String,
        id: IdValue,
    },
    ValueObject {
        type_name: String,
        owner: Box<GlobalId>,
        path: String,
    },
    UnboundedValueObject {
        type_name: String,
    },
}

impl GlobalId {
    pub fn instance(type_name: impl Into<String>, id: impl Into<IdValue>) -> Self {
        GlobalId::Instance {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    pub fn value_object(type_name: impl Into<String>, owner: GlobalId, path: impl Into<String>) -> Self {
        GlobalId::ValueObject {
            type_name: type_name.into(),
            owner: Box::new(owner),
            path: path.into(),
        }
    }

    pub fn unbounded(type_name: impl Into<String>) -> Self {
        GlobalId::UnboundedValueObject {
            type_name: type_name.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            GlobalId::Instance { type_name, .. }
            | GlobalId::ValueObject { type_name, .. }
            | GlobalId::UnboundedValueObject { type_name } => type_name,
        }
    }

    /// Stable string key, equal to the display form
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobalId::Instance { type_name, id } => write!(f, "{}/{}", type_name, id),
            GlobalId::ValueObject { owner, path, .. } => write!(f, "{}#{}", owner, path),
            GlobalId::UnboundedValueObject { type_name } => write!(f, "{}/", type_name),
        }
    }
}

/// Parses the root forms `Type/id` and `Type/`. Unquoted ids that parse as
/// `i64` are integer ids. Owned value-object ids are not parseable because
/// their display form omits the value object's type.
impl FromStr for GlobalId {
    type Err = ObjversError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ObjversError::InvalidGlobalId {
            input: s.to_string(),
        };
        let (type_name, id) = s.split_once('/').ok_or_else(invalid)?;
        if type_name.trim().is_empty() || type_name.contains('#') {
            return Err(invalid());
        }
        if id.is_empty() {
            return Ok(GlobalId::unbounded(type_name));
        }
        let id = id.parse::<IdValue>().map_err(|_| invalid())?;
        Ok(GlobalId::Instance {
            type_name: type_name.to_string(),
            id,
        })
    }
}
