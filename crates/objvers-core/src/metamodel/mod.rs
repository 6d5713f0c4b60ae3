//! Metamodel: declared types, property descriptors and type classification

pub mod declared;
pub mod mapped;
pub mod property;
pub mod registry;
pub mod scanner;

pub use declared::DeclaredType;
pub use mapped::{CollectionShape, MappedType, PrimitiveKind, TypeMapping};
pub use property::PropertyDescriptor;
pub use registry::TypeRegistry;
pub use scanner::{DeclaredScanner, PropertyScanner, TypeDescriptor};
