//! Model declarations and the schema descriptor store.
//!
//! Declarations ([`ModelDecl`], [`FieldDecl`]) are what a model author
//! writes. The [`SchemaStore`] validates them once and caches the resulting
//! [`SchemaDescriptor`]s, which the deserializer and serializer walk.

mod build;
pub mod declare;
pub mod descriptor;
pub mod store;

pub use declare::{BindingKind, FieldDecl, FieldType, ModelDecl, ModelKey, ModelRef, WrappedEntity};
pub use descriptor::{FieldDescriptor, SchemaDescriptor, ValueType};
pub use store::SchemaStore;
