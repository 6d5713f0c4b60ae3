use objvers_core::metamodel::{DeclaredScanner, DeclaredType, TypeDescriptor, TypeRegistry};
use objvers_core::Object;
use std::sync::Arc;

fn t(text: &str) -> DeclaredType {
    DeclaredType::parse(text).unwrap()
}

/// Person / Address / Team model shared by the integration tests
#[allow(dead_code)]
pub fn people_scanner() -> DeclaredScanner {
    DeclaredScanner::new()
        .with_type(
            TypeDescriptor::new("Person")
                .id("id", "i64")
                .property("name", "String")
                .property("age", "i32")
                .property("nickname", t("Option<String>"))
                .property("address", "Address")
                .property("boss", "Person")
                .property("tags", t("List<String>"))
                .ignored("last_seen", "String"),
        )
        .with_type(
            TypeDescriptor::new("Address")
                .property("city", "String")
                .property("street", "String"),
        )
        .with_type(
            TypeDescriptor::new("Team")
                .id("code", "String")
                .property("members", t("Set<Person>"))
                .shallow("sponsor", "Person"),
        )
}

#[allow(dead_code)]
pub fn people_registry() -> TypeRegistry {
    TypeRegistry::new(Arc::new(people_scanner()))
}

#[allow(dead_code)]
pub fn person(id: i64, name: &str) -> Object {
    Object::new("Person").with("id", id).with("name", name)
}

#[allow(dead_code)]
pub fn address(city: &str, street: &str) -> Object {
    Object::new("Address").with("city", city).with("street", street)
}
