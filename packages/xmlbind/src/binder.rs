//! Binder: the public entry point tying store, validator and options together.

use std::sync::Arc;

use crate::bind::{Deserializer, Serializer};
use crate::config::{DeserializeOptions, SerializeOptions, WriteOptions};
use crate::error::{BindError, Result};
use crate::model::XmlModel;
use crate::schema::{SchemaDescriptor, SchemaStore};
use crate::validate::{StandardValidator, Validator};
use crate::xml::{self, XmlNode};

/// Deserializes and serializes [`XmlModel`] types.
///
/// A binder is cheap to clone; clones share the schema store and validator.
/// Several binders may share one store by constructing them with
/// [`Binder::with_store`].
#[derive(Clone)]
pub struct Binder {
    store: Arc<SchemaStore>,
    validator: Arc<dyn Validator>,
    deserialize: DeserializeOptions,
    serialize: SerializeOptions,
    write: WriteOptions,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Binder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder")
            .field("schemas", &self.store.len())
            .field("deserialize", &self.deserialize)
            .field("serialize", &self.serialize)
            .field("write", &self.write)
            .finish_non_exhaustive()
    }
}

impl Binder {
    /// Binder with its own store, the standard validator and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Arc::new(SchemaStore::new()))
    }

    /// Binder backed by a shared store.
    #[must_use]
    pub fn with_store(store: Arc<SchemaStore>) -> Self {
        Self {
            store,
            validator: Arc::new(StandardValidator),
            deserialize: DeserializeOptions::default(),
            serialize: SerializeOptions::default(),
            write: WriteOptions::default(),
        }
    }

    /// Use a custom validator for scalar values.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    #[must_use]
    pub fn deserialize_options(mut self, options: DeserializeOptions) -> Self {
        self.deserialize = options;
        self
    }

    #[must_use]
    pub fn serialize_options(mut self, options: SerializeOptions) -> Self {
        self.serialize = options;
        self
    }

    #[must_use]
    pub fn write_options(mut self, options: WriteOptions) -> Self {
        self.write = options;
        self
    }

    /// The schema store used by this binder.
    #[must_use]
    pub fn store(&self) -> &Arc<SchemaStore> {
        &self.store
    }

    /// Descriptor of `T`, building it on first use.
    ///
    /// # Errors
    /// Returns `Schema` if the declaration of `T` is invalid.
    pub fn schema<T: XmlModel>(&self) -> Result<Arc<SchemaDescriptor>> {
        self.store.schema_for::<T>()
    }

    /// Deserialize a model from UTF-8 XML bytes.
    ///
    /// # Errors
    /// Parse errors, schema errors, a root tag mismatch or field errors.
    pub fn from_xml<T: XmlModel>(&self, bytes: &[u8]) -> Result<T> {
        self.from_xml_tree(&xml::parse(bytes)?)
    }

    /// Deserialize a model from an XML string.
    ///
    /// # Errors
    /// Parse errors, schema errors, a root tag mismatch or field errors.
    pub fn from_xml_str<T: XmlModel>(&self, text: &str) -> Result<T> {
        self.from_xml_tree(&xml::parse_str(text)?)
    }

    /// Deserialize a model from an already parsed element.
    ///
    /// # Errors
    /// Schema errors, a root tag mismatch or field errors.
    pub fn from_xml_tree<T: XmlModel>(&self, root: &XmlNode) -> Result<T> {
        let schema = self.schema::<T>()?;
        let record = Deserializer::new(&self.store, self.validator.as_ref(), self.deserialize)
            .deserialize(root, &schema)?;
        T::from_record(record)
    }

    /// Serialize a model to an element tree.
    ///
    /// # Errors
    /// Schema errors or field errors.
    pub fn to_xml_tree<T: XmlModel>(&self, model: &T) -> Result<XmlNode> {
        let schema = self.schema::<T>()?;
        Serializer::new(&self.store, self.validator.as_ref(), self.serialize)
            .serialize(&model.to_record(), &schema)
    }

    /// Serialize a model to UTF-8 XML bytes.
    ///
    /// # Errors
    /// Schema errors, field errors or writer errors.
    pub fn to_xml<T: XmlModel>(&self, model: &T) -> Result<Vec<u8>> {
        xml::write(&self.to_xml_tree(model)?, &self.write)
    }

    /// Serialize a model to an XML string.
    ///
    /// # Errors
    /// Schema errors, field errors or writer errors.
    pub fn to_xml_string<T: XmlModel>(&self, model: &T) -> Result<String> {
        let bytes = self.to_xml(model)?;
        String::from_utf8(bytes)
            .map_err(|e| BindError::InvalidInput(format!("writer produced invalid UTF-8: {e}")))
    }
}
