//! xmlbind - Declarative XML binding for Rust types.
//!
//! Models declare how their fields map onto XML (attributes, child elements,
//! text, wrapped paths, raw subtrees) and the engine converts between XML
//! documents and model instances, validating scalar values on the way in and
//! rendering them on the way out.
//!
//! # Example
//!
//! ```
//! use xmlbind::schema::{FieldDecl, ModelDecl};
//! use xmlbind::validate::{IntKind, ScalarType};
//! use xmlbind::{Record, Result, XmlModel};
//!
//! #[derive(Debug, PartialEq)]
//! struct Book {
//!     id: u32,
//!     title: String,
//!     authors: Vec<String>,
//! }
//!
//! impl XmlModel for Book {
//!     fn declare() -> ModelDecl {
//!         ModelDecl::new("Book")
//!             .tag("book")
//!             .field(FieldDecl::attribute("id", ScalarType::Integer(IntKind::U32)))
//!             .field(FieldDecl::element("title", ScalarType::String))
//!             .field(
//!                 FieldDecl::element("authors", ScalarType::String)
//!                     .tag("author")
//!                     .collection()
//!                     .wrap("authors"),
//!             )
//!     }
//!
//!     fn from_record(mut record: Record) -> Result<Self> {
//!         Ok(Self {
//!             id: record.take("id")?,
//!             title: record.take("title")?,
//!             authors: record.take("authors")?,
//!         })
//!     }
//!
//!     fn to_record(&self) -> Record {
//!         Record::new()
//!             .with("id", self.id)
//!             .with("title", self.title.as_str())
//!             .with("authors", self.authors.clone())
//!     }
//! }
//!
//! let xml = r#"<book id="7"><title>Dune</title><authors><author>Frank Herbert</author></authors></book>"#;
//! let book: Book = xmlbind::from_xml_str(xml)?;
//! assert_eq!(book.authors, vec!["Frank Herbert"]);
//! assert_eq!(xmlbind::to_xml_string(&book)?, xml);
//! # Ok::<(), xmlbind::BindError>(())
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Limits, option structs and name validation
//! - [`error`]: Error types and Result alias
//! - [`value`]: Bound values and records
//! - [`validate`]: Scalar types and the validator capability
//! - [`xml`]: Owned element tree, parser and writer
//! - [`schema`]: Model declarations and the schema descriptor store
//! - [`bind`]: Path resolution, coercion, deserializer and serializer
//! - [`model`]: The `XmlModel` trait
//! - [`binder`]: The `Binder` entry point

use std::sync::LazyLock;

pub mod bind;
pub mod binder;
pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod validate;
pub mod value;
pub mod xml;

// Re-export commonly used items
pub use binder::Binder;
pub use config::{DeserializeOptions, DuplicatePolicy, ErrorMode, SerializeOptions, WriteOptions};
pub use error::{BindError, FieldErrors, Result};
pub use model::XmlModel;
pub use schema::{FieldDecl, ModelDecl, SchemaDescriptor, SchemaStore};
pub use validate::{IntKind, ScalarType, StandardValidator, ValidationError, Validator};
pub use value::{FromValue, Record, Scalar, Value};
pub use xml::{QName, XmlNode};

/// Binder used by the crate-level convenience functions.
static DEFAULT_BINDER: LazyLock<Binder> = LazyLock::new(Binder::new);

/// Deserialize a model from UTF-8 XML bytes with the default binder.
///
/// # Errors
/// See [`Binder::from_xml`].
pub fn from_xml<T: XmlModel>(bytes: &[u8]) -> Result<T> {
    DEFAULT_BINDER.from_xml(bytes)
}

/// Deserialize a model from an XML string with the default binder.
///
/// # Errors
/// See [`Binder::from_xml_str`].
pub fn from_xml_str<T: XmlModel>(text: &str) -> Result<T> {
    DEFAULT_BINDER.from_xml_str(text)
}

/// Serialize a model to UTF-8 XML bytes with the default binder.
///
/// # Errors
/// See [`Binder::to_xml`].
pub fn to_xml<T: XmlModel>(model: &T) -> Result<Vec<u8>> {
    DEFAULT_BINDER.to_xml(model)
}

/// Serialize a model to an XML string with the default binder.
///
/// # Errors
/// See [`Binder::to_xml_string`].
pub fn to_xml_string<T: XmlModel>(model: &T) -> Result<String> {
    DEFAULT_BINDER.to_xml_string(model)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_binder_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Binder>();
        assert_send_sync::<SchemaStore>();
        assert_send_sync::<XmlNode>();
    }
}
