//! Type registry
//!
//! Classifies declared types into [`MappedType`] categories and caches the
//! scanner's property lists. Both caches are compute-if-absent: a result is
//! computed outside the map and the first inserted value wins.

use super::declared::DeclaredType;
use super::mapped::{CollectionShape, MappedType, PrimitiveKind, TypeMapping};
use super::property::PropertyDescriptor;
use super::scanner::PropertyScanner;
use crate::errors::{ObjversError, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

pub struct TypeRegistry {
    scanner: Arc<dyn PropertyScanner>,
    mappings: HashMap<String, TypeMapping>,
    types: DashMap<DeclaredType, MappedType>,
    properties: DashMap<String, Arc<[PropertyDescriptor]>>,
}

impl TypeRegistry {
    pub fn new(scanner: Arc<dyn PropertyScanner>) -> Self {
        Self {
            scanner,
            mappings: HashMap::new(),
            types: DashMap::new(),
            properties: DashMap::new(),
        }
    }

    /// Register an explicit mapping. Clears the classification cache.
    pub fn register_mapping(&mut self, type_name: impl Into<String>, mapping: TypeMapping) {
        self.mappings.insert(type_name.into(), mapping);
        self.types.clear();
    }

    pub fn with_mapping(mut self, type_name: impl Into<String>, mapping: TypeMapping) -> Self {
        self.register_mapping(type_name, mapping);
        self
    }

    /// Classify a declared type
    ///
    /// # Errors
    ///
    /// `UnknownType` when no mapping, primitive name or scanner descriptor
    /// covers a named type; `MultipleIdProperties` / `UnknownIdProperty` for
    /// inconsistent entity definitions.
    pub fn classify(&self, declared: &DeclaredType) -> Result<MappedType> {
        if let Some(found) = self.types.get(declared) {
            return Ok(found.value().clone());
        }
        let computed = self.compute(declared)?;
        let entry = self.types.entry(declared.clone()).or_insert(computed);
        Ok(entry.value().clone())
    }

    pub fn classify_name(&self, type_name: &str) -> Result<MappedType> {
        self.classify(&DeclaredType::named(type_name))
    }

    /// Ordered property descriptors of a type
    pub fn properties(&self, type_name: &str) -> Result<Arc<[PropertyDescriptor]>> {
        if let Some(found) = self.properties.get(type_name) {
            return Ok(Arc::clone(found.value()));
        }

        let scanned = self
            .scanner
            .scan(type_name)
            .ok_or_else(|| ObjversError::UnknownType {
                type_name: type_name.to_string(),
            })?;
        if scanned.iter().filter(|p| p.id).count() > 1 {
            return Err(ObjversError::MultipleIdProperties {
                type_name: type_name.to_string(),
            });
        }

        let entry = self
            .properties
            .entry(type_name.to_string())
            .or_insert_with(|| Arc::from(scanned));
        Ok(Arc::clone(entry.value()))
    }

    fn compute(&self, declared: &DeclaredType) -> Result<MappedType> {
        match declared {
            DeclaredType::Named(name) => self.classify_named(name),
            DeclaredType::Optional(inner) => Ok(match self.classify(inner)? {
                MappedType::Primitive { kind } => MappedType::PrimitiveBox { kind },
                other => other,
            }),
            DeclaredType::List(element) => self.collection(CollectionShape::List, element),
            DeclaredType::Set(element) => self.collection(CollectionShape::Set, element),
            DeclaredType::Map(value) => self.collection(CollectionShape::Map, value),
            DeclaredType::Array(element) => Ok(MappedType::Array {
                element: Box::new(self.classify(element)?),
            }),
        }
    }

    fn collection(&self, shape: CollectionShape, element: &DeclaredType) -> Result<MappedType> {
        Ok(MappedType::Collection {
            shape,
            element: Box::new(self.classify(element)?),
        })
    }

    fn classify_named(&self, name: &str) -> Result<MappedType> {
        if let Some(mapping) = self.mappings.get(name) {
            return match mapping {
                TypeMapping::Primitive { kind } => Ok(MappedType::Primitive { kind: *kind }),
                TypeMapping::ValueObject => Ok(MappedType::ValueObject {
                    type_name: name.to_string(),
                }),
                TypeMapping::Entity { id_property } => {
                    if !self.properties(name)?.iter().any(|p| &p.name == id_property) {
                        return Err(ObjversError::UnknownIdProperty {
                            type_name: name.to_string(),
                            id_property: id_property.clone(),
                        });
                    }
                    Ok(MappedType::Entity {
                        type_name: name.to_string(),
                        id_property: id_property.clone(),
                    })
                }
            };
        }

        if let Some(kind) = PrimitiveKind::from_type_name(name) {
            return Ok(MappedType::Primitive { kind });
        }

        let properties = self.properties(name)?;
        Ok(match properties.iter().find(|p| p.id) {
            Some(id) => MappedType::Entity {
                type_name: name.to_string(),
                id_property: id.name.clone(),
            },
            None => MappedType::ValueObject {
                type_name: name.to_string(),
            },
        })
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("mappings", &self.mappings)
            .field("cached_types", &self.types.len())
            .field("cached_properties", &self.properties.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::scanner::{DeclaredScanner, TypeDescriptor};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> TypeRegistry {
        let scanner = DeclaredScanner::new()
            .with_type(
                TypeDescriptor::new("Person")
                    .id("id", "i64")
                    .property("name", "String")
                    .property("address", "Address"),
            )
            .with_type(
                TypeDescriptor::new("Address")
                    .property("city", "String")
                    .property("street", "String"),
            );
        TypeRegistry::new(Arc::new(scanner))
    }

    #[test]
    fn test_entity_and_value_object_inference() {
        let registry = registry();
        assert_eq!(
            registry.classify_name("Person").unwrap(),
            MappedType::Entity {
                type_name: "Person".into(),
                id_property: "id".into()
            }
        );
        assert_eq!(
            registry.classify_name("Address").unwrap(),
            MappedType::ValueObject {
                type_name: "Address".into()
            }
        );
    }

    #[test]
    fn test_optional_primitive_is_box() {
        let registry = registry();
        let mapped = registry
            .classify(&DeclaredType::parse("Option<i32>").unwrap())
            .unwrap();
        assert_eq!(
            mapped,
            MappedType::PrimitiveBox {
                kind: PrimitiveKind::Int
            }
        );

        let optional_entity = registry
            .classify(&DeclaredType::parse("Option<Person>").unwrap())
            .unwrap();
        assert!(optional_entity.is_entity());
    }

    #[test]
    fn test_collection_classifies_element() {
        let registry = registry();
        let mapped = registry
            .classify(&DeclaredType::parse("Set<Address>").unwrap())
            .unwrap();
        assert_eq!(
            mapped,
            MappedType::Collection {
                shape: CollectionShape::Set,
                element: Box::new(MappedType::ValueObject {
                    type_name: "Address".into()
                }),
            }
        );
    }

    #[test]
    fn test_unknown_type_fails() {
        let registry = registry();
        let err = registry.classify_name("Ghost").unwrap_err();
        assert_eq!(
            err,
            ObjversError::UnknownType {
                type_name: "Ghost".into()
            }
        );
        assert!(registry
            .classify(&DeclaredType::parse("List<Ghost>").unwrap())
            .is_err());
    }

    #[test]
    fn test_explicit_mapping_wins() {
        let registry = registry()
            .with_mapping("Address", TypeMapping::Entity {
                id_property: "street".into(),
            })
            .with_mapping("String", TypeMapping::ValueObject);

        assert!(registry.classify_name("Address").unwrap().is_entity());
        assert_eq!(
            registry.classify_name("String").unwrap(),
            MappedType::ValueObject {
                type_name: "String".into()
            }
        );
    }

    #[test]
    fn test_mapping_with_unknown_id_property() {
        let registry = registry().with_mapping(
            "Address",
            TypeMapping::Entity {
                id_property: "zip".into(),
            },
        );
        assert!(matches!(
            registry.classify_name("Address"),
            Err(ObjversError::UnknownIdProperty { .. })
        ));
    }

    #[test]
    fn test_multiple_id_properties_rejected() {
        let scanner = DeclaredScanner::new()
            .with_type(TypeDescriptor::new("Pair").id("a", "i64").id("b", "i64"));
        let registry = TypeRegistry::new(Arc::new(scanner));
        assert!(matches!(
            registry.classify_name("Pair"),
            Err(ObjversError::MultipleIdProperties { .. })
        ));
    }

    struct CountingScanner {
        inner: DeclaredScanner,
        calls: AtomicUsize,
    }

    impl PropertyScanner for CountingScanner {
        fn scan(&self, type_name: &str) -> Option<Vec<PropertyDescriptor>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.scan(type_name)
        }
    }

    #[test]
    fn test_properties_scanned_once_across_threads() {
        let scanner = Arc::new(CountingScanner {
            inner: DeclaredScanner::new()
                .with_type(TypeDescriptor::new("Person").id("id", "i64")),
            calls: AtomicUsize::new(0),
        });
        let registry = Arc::new(TypeRegistry::new(scanner.clone()));
        registry.properties("Person").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.classify_name("Person").unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 1);
    }
}
