//! Graph flattening
//!
//! [`GraphBuilder`] walks an object graph breadth-first from its root,
//! assigns global ids and produces one [`Cdo`] per entity, in discovery
//! order. Referenced entities are enqueued at most once (explicit visited
//! set), so cyclic graphs terminate.

use super::cdo::{Cdo, PropertyValue};
use super::global_id::GlobalId;
use super::identity::resolve_id;
use crate::errors::{ObjversError, Result};
use crate::metamodel::{CollectionShape, MappedType, PrimitiveKind, TypeRegistry};
use crate::object::{Object, Value};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

static NULL: Value = Value::Null;

/// A flattened object graph
#[derive(Debug, Clone, PartialEq)]
pub struct LiveGraph {
    root: GlobalId,
    nodes: Vec<Cdo>,
    index: HashMap<GlobalId, usize>,
}

impl LiveGraph {
    fn new(root: GlobalId, nodes: Vec<Cdo>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, cdo)| (cdo.global_id.clone(), i))
            .collect();
        Self { root, nodes, index }
    }

    pub fn root(&self) -> &GlobalId {
        &self.root
    }

    /// Nodes in discovery order; the root comes first
    pub fn nodes(&self) -> &[Cdo] {
        &self.nodes
    }

    pub fn get(&self, id: &GlobalId) -> Option<&Cdo> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &GlobalId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Zero value of a property whose value is absent
pub fn default_value(mapped: &MappedType) -> PropertyValue {
    match mapped {
        MappedType::Primitive { kind } => match kind {
            PrimitiveKind::Bool => PropertyValue::Bool(false),
            PrimitiveKind::Int => PropertyValue::Int(0),
            PrimitiveKind::Float => PropertyValue::Float(0.0),
            PrimitiveKind::Char | PrimitiveKind::Text => PropertyValue::Text(String::new()),
        },
        _ => PropertyValue::Null,
    }
}

struct Frontier<'o> {
    queue: VecDeque<(GlobalId, &'o Object)>,
    visited: HashSet<GlobalId>,
}

impl<'o> Frontier<'o> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
        }
    }

    fn enqueue(&mut self, id: GlobalId, object: &'o Object) {
        if self.visited.insert(id.clone()) {
            self.queue.push_back((id, object));
        }
    }
}

/// Position of a value inside its owning node
struct Placement<'a> {
    owner: &'a GlobalId,
    path: String,
    shallow: bool,
}

impl Placement<'_> {
    fn child(&self, segment: impl std::fmt::Display) -> Placement<'_> {
        Placement {
            owner: self.owner,
            path: format!("{}/{}", self.path, segment),
            shallow: self.shallow,
        }
    }

    fn mismatch(&self, expected: &MappedType, found: &Value) -> ObjversError {
        ObjversError::TypeMismatch {
            owner: self.owner.to_string(),
            property: self.path.clone(),
            expected: expected.to_string(),
            found: found.kind_name().to_string(),
        }
    }
}

pub struct GraphBuilder<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> GraphBuilder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Global id of a graph root without flattening the graph
    pub fn root_id(&self, root: &Object) -> Result<GlobalId> {
        let mapped = self.registry.classify_name(root.type_name())?;
        resolve_id(root, &mapped)
    }

    /// Flatten the graph reachable from `root`
    ///
    /// # Errors
    ///
    /// Fails on the first unclassifiable type, null entity id or value that
    /// does not fit its declared type. No partial graph is returned.
    pub fn build(&self, root: &Object) -> Result<LiveGraph> {
        let root_id = self.root_id(root)?;
        let mut frontier = Frontier::new();
        frontier.enqueue(root_id.clone(), root);

        let mut nodes = Vec::new();
        while let Some((id, object)) = frontier.queue.pop_front() {
            let state = self.flatten_state(&id, None, false, object, &mut frontier)?;
            nodes.push(Cdo {
                global_id: id,
                type_name: object.type_name().to_string(),
                state,
            });
        }
        Ok(LiveGraph::new(root_id, nodes))
    }

    fn flatten_state<'o>(
        &self,
        owner: &GlobalId,
        prefix: Option<&str>,
        shallow: bool,
        object: &'o Object,
        frontier: &mut Frontier<'o>,
    ) -> Result<BTreeMap<String, PropertyValue>> {
        let mut state = BTreeMap::new();
        for property in self.registry.properties(object.type_name())?.iter() {
            if property.ignored {
                continue;
            }
            let mapped = self.registry.classify(&property.declared_type)?;
            let at = Placement {
                owner,
                path: match prefix {
                    Some(prefix) => format!("{}.{}", prefix, property.name),
                    None => property.name.clone(),
                },
                shallow: shallow || property.shallow_reference,
            };
            let value = object.get(&property.name).unwrap_or(&NULL);
            let flattened = self.convert(&at, &mapped, value, frontier)?;
            state.insert(property.name.clone(), flattened);
        }
        Ok(state)
    }

    fn convert<'o>(
        &self,
        at: &Placement<'_>,
        mapped: &MappedType,
        value: &'o Value,
        frontier: &mut Frontier<'o>,
    ) -> Result<PropertyValue> {
        if value.is_null() {
            return Ok(default_value(mapped));
        }

        match mapped {
            MappedType::Primitive { kind } | MappedType::PrimitiveBox { kind } => {
                primitive(*kind, value).ok_or_else(|| at.mismatch(mapped, value))
            }
            MappedType::Entity { .. } | MappedType::ValueObject { .. } => match value {
                Value::Object(object) => self.convert_object(at, mapped, object, frontier),
                _ => Err(at.mismatch(mapped, value)),
            },
            MappedType::Collection {
                shape: CollectionShape::List | CollectionShape::Set,
                element,
            }
            | MappedType::Array { element } => {
                let Value::List(items) = value else {
                    return Err(at.mismatch(mapped, value));
                };
                let mut out: Vec<PropertyValue> = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let converted = if item.is_null() {
                        PropertyValue::Null
                    } else {
                        self.convert(&at.child(i), element, item, frontier)?
                    };
                    let is_set = matches!(
                        mapped,
                        MappedType::Collection {
                            shape: CollectionShape::Set,
                            ..
                        }
                    );
                    if is_set && out.iter().any(|existing| existing.same_as(&converted)) {
                        continue;
                    }
                    out.push(converted);
                }
                Ok(PropertyValue::List(out))
            }
            MappedType::Collection {
                shape: CollectionShape::Map,
                element,
            } => {
                let Value::Map(entries) = value else {
                    return Err(at.mismatch(mapped, value));
                };
                let mut out = BTreeMap::new();
                for (key, item) in entries {
                    let converted = if item.is_null() {
                        PropertyValue::Null
                    } else {
                        self.convert(&at.child(key), element, item, frontier)?
                    };
                    out.insert(key.clone(), converted);
                }
                Ok(PropertyValue::Map(out))
            }
        }
    }

    /// Nested objects are classified by their runtime type name
    fn convert_object<'o>(
        &self,
        at: &Placement<'_>,
        declared: &MappedType,
        object: &'o Object,
        frontier: &mut Frontier<'o>,
    ) -> Result<PropertyValue> {
        let runtime = self.registry.classify_name(object.type_name())?;
        match &runtime {
            MappedType::Entity { .. } => {
                let id = resolve_id(object, &runtime)?;
                if !at.shallow {
                    frontier.enqueue(id.clone(), object);
                }
                Ok(PropertyValue::Reference(id))
            }
            MappedType::ValueObject { type_name } => {
                let state =
                    self.flatten_state(at.owner, Some(&at.path), at.shallow, object, frontier)?;
                Ok(PropertyValue::ValueObject(Box::new(Cdo {
                    global_id: GlobalId::value_object(
                        type_name.clone(),
                        at.owner.clone(),
                        at.path.clone(),
                    ),
                    type_name: type_name.clone(),
                    state,
                })))
            }
            _ => Err(ObjversError::TypeMismatch {
                owner: at.owner.to_string(),
                property: at.path.clone(),
                expected: declared.to_string(),
                found: runtime.to_string(),
            }),
        }
    }
}

fn primitive(kind: PrimitiveKind, value: &Value) -> Option<PropertyValue> {
    match (kind, value) {
        (PrimitiveKind::Bool, Value::Bool(v)) => Some(PropertyValue::Bool(*v)),
        (PrimitiveKind::Int, Value::Int(v)) => Some(PropertyValue::Int(*v)),
        (PrimitiveKind::Float, Value::Float(v)) => Some(PropertyValue::Float(*v)),
        (PrimitiveKind::Float, Value::Int(v)) => Some(PropertyValue::Float(*v as f64)),
        (PrimitiveKind::Char, Value::Text(v)) if v.chars().count() == 1 => {
            Some(PropertyValue::Text(v.clone()))
        }
        (PrimitiveKind::Text, Value::Text(v)) => Some(PropertyValue::Text(v.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::{DeclaredScanner, DeclaredType, TypeDescriptor};
    use std::sync::Arc;

    fn registry() -> TypeRegistry {
        let scanner = DeclaredScanner::new()
            .with_type(
                TypeDescriptor::new("Person")
                    .id("id", "i64")
                    .property("name", "String")
                    .property("age", "i32")
                    .property("score", "f64")
                    .property("nickname", DeclaredType::parse("Option<String>").unwrap())
                    .property("address", "Address")
                    .property("boss", "Person")
                    .shallow("mentor", "Person")
                    .property("friends", DeclaredType::parse("List<Person>").unwrap())
                    .ignored("session", "String"),
            )
            .with_type(
                TypeDescriptor::new("Address")
                    .property("city", "String")
                    .property("geo", "Geo"),
            )
            .with_type(TypeDescriptor::new("Geo").property("lat", "f64"));
        TypeRegistry::new(Arc::new(scanner))
    }

    fn person(id: i64, name: &str) -> Object {
        Object::new("Person").with("id", id).with("name", name)
    }

    #[test]
    fn test_defaults_for_absent_properties() {
        let registry = registry();
        let graph = GraphBuilder::new(&registry).build(&person(1, "Ann")).unwrap();
        let cdo = graph.get(&GlobalId::instance("Person", 1)).unwrap();

        assert_eq!(cdo.get("age"), Some(&PropertyValue::Int(0)));
        assert_eq!(cdo.get("nickname"), Some(&PropertyValue::Null));
        assert_eq!(cdo.get("address"), Some(&PropertyValue::Null));
        assert_eq!(cdo.get("session"), None);
    }

    #[test]
    fn test_int_widens_to_float_property() {
        let registry = registry();
        let graph = GraphBuilder::new(&registry)
            .build(&person(1, "Ann").with("score", 3))
            .unwrap();
        assert_eq!(graph.nodes()[0].get("score"), Some(&PropertyValue::Float(3.0)));
    }

    #[test]
    fn test_references_discovered_breadth_first() {
        let registry = registry();
        let root = person(1, "Ann")
            .with("boss", person(2, "Bob").with("boss", person(4, "Dee")))
            .with("friends", vec![person(3, "Cat"), person(2, "Bob")]);
        let graph = GraphBuilder::new(&registry).build(&root).unwrap();

        let order: Vec<String> = graph.nodes().iter().map(|c| c.global_id.to_string()).collect();
        assert_eq!(order, vec!["Person/1", "Person/2", "Person/3", "Person/4"]);
        assert_eq!(
            graph.nodes()[0].get("boss"),
            Some(&PropertyValue::Reference(GlobalId::instance("Person", 2)))
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let registry = registry();
        let root = person(1, "Ann").with("boss", person(2, "Bob").with("boss", person(1, "Ann")));
        let graph = GraphBuilder::new(&registry).build(&root).unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_shallow_reference_not_traversed() {
        let registry = registry();
        let root = person(1, "Ann").with("mentor", person(9, "Zed"));
        let graph = GraphBuilder::new(&registry).build(&root).unwrap();

        assert_eq!(graph.len(), 1);
        assert_eq!(
            graph.nodes()[0].get("mentor"),
            Some(&PropertyValue::Reference(GlobalId::instance("Person", 9)))
        );
    }

    #[test]
    fn test_nested_value_object_ids() {
        let registry = registry();
        let root = person(1, "Ann").with(
            "address",
            Object::new("Address")
                .with("city", "Paris")
                .with("geo", Object::new("Geo").with("lat", 48.8)),
        );
        let graph = GraphBuilder::new(&registry).build(&root).unwrap();

        let Some(PropertyValue::ValueObject(address)) = graph.nodes()[0].get("address") else {
            panic!("address should be embedded");
        };
        assert_eq!(address.global_id.to_string(), "Person/1#address");
        let Some(PropertyValue::ValueObject(geo)) = address.get("geo") else {
            panic!("geo should be embedded");
        };
        assert_eq!(geo.global_id.to_string(), "Person/1#address.geo");
    }

    #[test]
    fn test_value_object_root() {
        let registry = registry();
        let graph = GraphBuilder::new(&registry)
            .build(&Object::new("Address").with("city", "Paris"))
            .unwrap();
        assert_eq!(graph.root().to_string(), "Address/");
    }

    #[test]
    fn test_type_mismatch() {
        let registry = registry();
        let err = GraphBuilder::new(&registry)
            .build(&person(1, "Ann").with("age", "old"))
            .unwrap_err();
        assert!(matches!(err, ObjversError::TypeMismatch { ref property, .. } if property == "age"));
    }

    #[test]
    fn test_missing_id_on_referenced_entity() {
        let registry = registry();
        let root = person(1, "Ann").with("boss", Object::new("Person").with("name", "Bob"));
        let err = GraphBuilder::new(&registry).build(&root).unwrap_err();
        assert!(matches!(err, ObjversError::MissingId { .. }));
    }
}
