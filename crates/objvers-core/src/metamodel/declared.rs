//! Declared property types
//!
//! A [`DeclaredType`] is what a property says it holds, before classification.
//! The textual syntax is the one used by schema files:
//!
//! | Syntax | Meaning |
//! |---|---|
//! | `Address` | named type |
//! | `Option<i64>` | optional value |
//! | `List<T>` / `Vec<T>` | ordered sequence |
//! | `Set<T>` | unordered membership |
//! | `Map<T>` / `Map<String, T>` | string-keyed map |
//! | `[T]` / `Array<T>` | fixed array |

use crate::errors::{ObjversError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum DeclaredType {
    Named(String),
    Optional(Box<DeclaredType>),
    List(Box<DeclaredType>),
    Set(Box<DeclaredType>),
    Map(Box<DeclaredType>),
    Array(Box<DeclaredType>),
}

impl DeclaredType {
    pub fn named(name: impl Into<String>) -> Self {
        DeclaredType::Named(name.into())
    }

    pub fn optional(inner: DeclaredType) -> Self {
        DeclaredType::Optional(Box::new(inner))
    }

    pub fn list(element: DeclaredType) -> Self {
        DeclaredType::List(Box::new(element))
    }

    pub fn set(element: DeclaredType) -> Self {
        DeclaredType::Set(Box::new(element))
    }

    pub fn map(value: DeclaredType) -> Self {
        DeclaredType::Map(Box::new(value))
    }

    pub fn array(element: DeclaredType) -> Self {
        DeclaredType::Array(Box::new(element))
    }

    /// Parse the textual type syntax
    pub fn parse(input: &str) -> Result<Self> {
        parse_type(input.trim(), input)
    }
}

/// A bare type name. Generic syntax such as `List<T>` is not interpreted here;
/// use [`DeclaredType::parse`] for that.
impl From<&str> for DeclaredType {
    fn from(name: &str) -> Self {
        DeclaredType::Named(name.to_string())
    }
}

impl From<String> for DeclaredType {
    fn from(name: String) -> Self {
        DeclaredType::Named(name)
    }
}

impl FromStr for DeclaredType {
    type Err = ObjversError;

    fn from_str(s: &str) -> Result<Self> {
        DeclaredType::parse(s)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Named(name) => f.write_str(name),
            DeclaredType::Optional(inner) => write!(f, "Option<{}>", inner),
            DeclaredType::List(element) => write!(f, "List<{}>", element),
            DeclaredType::Set(element) => write!(f, "Set<{}>", element),
            DeclaredType::Map(value) => write!(f, "Map<{}>", value),
            DeclaredType::Array(element) => write!(f, "[{}]", element),
        }
    }
}

fn invalid(input: &str, reason: impl Into<String>) -> ObjversError {
    ObjversError::InvalidDeclaredType {
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn parse_type(s: &str, whole: &str) -> Result<DeclaredType> {
    if s.is_empty() {
        return Err(invalid(whole, "empty type"));
    }

    if let Some(inner) = s.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| invalid(whole, "unterminated `[`"))?;
        return Ok(DeclaredType::array(parse_type(inner.trim(), whole)?));
    }

    let Some(open) = s.find('<') else {
        if !s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ':') {
            return Err(invalid(whole, format!("`{}` is not a type name", s)));
        }
        return Ok(DeclaredType::named(s));
    };

    let inner = s[open + 1..]
        .strip_suffix('>')
        .ok_or_else(|| invalid(whole, "unterminated `<`"))?;
    let args = split_top_level(inner);
    let head = s[..open].trim();

    let single = |args: &[&str]| -> Result<DeclaredType> {
        match args {
            [arg] => parse_type(arg.trim(), whole),
            _ => Err(invalid(
                whole,
                format!("`{}` takes exactly one type argument", head),
            )),
        }
    };

    match head {
        "Option" | "Optional" => Ok(DeclaredType::optional(single(args.as_slice())?)),
        "List" | "Vec" => Ok(DeclaredType::list(single(args.as_slice())?)),
        "Set" | "HashSet" | "BTreeSet" => Ok(DeclaredType::set(single(args.as_slice())?)),
        "Array" => Ok(DeclaredType::array(single(args.as_slice())?)),
        "Map" | "HashMap" | "BTreeMap" => match args.as_slice() {
            [value] => Ok(DeclaredType::map(parse_type(value.trim(), whole)?)),
            [key, value] if key.trim() == "String" => {
                Ok(DeclaredType::map(parse_type(value.trim(), whole)?))
            }
            [_, _] => Err(invalid(whole, "map keys must be `String`")),
            _ => Err(invalid(whole, "`Map` takes one or two type arguments")),
        },
        other => Err(invalid(whole, format!("unknown type constructor `{}`", other))),
    }
}

/// Split generic arguments on commas that are not nested in `<>` or `[]`
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named() {
        assert_eq!(
            DeclaredType::parse("Address").unwrap(),
            DeclaredType::named("Address")
        );
    }

    #[test]
    fn test_parse_nested_generics() {
        let parsed = DeclaredType::parse("Map<String, List<Option<i64>>>").unwrap();
        assert_eq!(
            parsed,
            DeclaredType::map(DeclaredType::list(DeclaredType::optional(
                DeclaredType::named("i64")
            )))
        );
    }

    #[test]
    fn test_parse_array_forms() {
        assert_eq!(
            DeclaredType::parse("[f64]").unwrap(),
            DeclaredType::parse("Array<f64>").unwrap()
        );
    }

    #[test]
    fn test_display_reparses() {
        for text in ["Option<i64>", "List<Address>", "Set<String>", "Map<Person>", "[u8]"] {
            let parsed = DeclaredType::parse(text).unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn test_rejects_malformed() {
        for text in ["", "List<", "Map<i64, String>", "Option<a, b>", "Tree<Node>", "a b"] {
            let err = DeclaredType::parse(text).unwrap_err();
            assert!(
                matches!(err, ObjversError::InvalidDeclaredType { .. }),
                "{} should be rejected",
                text
            );
        }
    }
}
