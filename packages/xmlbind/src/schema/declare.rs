//! Model and field declarations.
//!
//! A model describes its XML shape once, in [`XmlModel::declare`], using the
//! [`ModelDecl`] and [`FieldDecl`] builders. Declarations are validated and
//! turned into descriptors by the [`SchemaStore`](super::SchemaStore).
//!
//! ```
//! use xmlbind::schema::{FieldDecl, ModelDecl};
//! use xmlbind::validate::{IntKind, ScalarType};
//!
//! let decl = ModelDecl::new("Order")
//!     .tag("order")
//!     .field(FieldDecl::attribute("id", ScalarType::Integer(IntKind::U32)))
//!     .field(FieldDecl::element("note", ScalarType::String).optional())
//!     .field(FieldDecl::wrapped("city", "address/city", ScalarType::String));
//! assert_eq!(decl.fields().len(), 3);
//! ```

use std::any::TypeId;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::XmlModel;
use crate::validate::ScalarType;
use crate::value::Value;

/// How a field maps onto XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    Attribute,
    Element,
    /// Reached through a path of wrapper elements.
    Wrapped,
    /// The element's own text content.
    Text,
    /// Child element kept as an uninterpreted subtree.
    Raw,
}

/// What sits at the end of a wrap path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrappedEntity {
    Text,
    Attribute,
    Element,
}

/// Identity of a bound model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelKey {
    id: TypeId,
    name: &'static str,
}

impl ModelKey {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Rust type name of the model.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Reference to a model type that can produce its declaration on demand.
///
/// Nested fields hold a `ModelRef` rather than a built schema, which lets
/// recursive models refer to themselves.
#[derive(Debug, Clone, Copy)]
pub struct ModelRef {
    key: ModelKey,
    declare: fn() -> ModelDecl,
}

impl ModelRef {
    pub fn of<T: XmlModel>() -> Self {
        Self {
            key: ModelKey::of::<T>(),
            declare: T::declare,
        }
    }

    #[must_use]
    pub fn key(&self) -> ModelKey {
        self.key
    }

    pub(crate) fn declaration(&self) -> ModelDecl {
        (self.declare)()
    }
}

impl PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// Declared type of a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Scalar(ScalarType),
    Model(ModelRef),
    Raw,
}

/// Declaration of one model.
#[derive(Debug, Clone)]
pub struct ModelDecl {
    pub(crate) name: String,
    pub(crate) tag: Option<String>,
    pub(crate) ns: Option<String>,
    pub(crate) nsmap: Vec<(String, String)>,
    pub(crate) ns_attrs: bool,
    pub(crate) fields: Vec<FieldDecl>,
}

impl ModelDecl {
    /// Start a declaration. `name` is used in messages and as the root tag
    /// when no tag is declared.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
            ns: None,
            nsmap: Vec::new(),
            ns_attrs: false,
            fields: Vec::new(),
        }
    }

    /// Element tag of the model.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Namespace prefix of the model element, resolved through the nsmap.
    /// The empty prefix selects the default namespace.
    #[must_use]
    pub fn ns(mut self, prefix: impl Into<String>) -> Self {
        self.ns = Some(prefix.into());
        self
    }

    /// Namespace declarations (prefix, URI). The empty prefix declares the
    /// default namespace.
    #[must_use]
    pub fn nsmap<'a>(mut self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.nsmap
            .extend(entries.into_iter().map(|(p, u)| (p.to_string(), u.to_string())));
        self
    }

    /// Unprefixed attributes inherit the element namespace.
    #[must_use]
    pub fn ns_attrs(mut self, enabled: bool) -> Self {
        self.ns_attrs = enabled;
        self
    }

    /// Append a field. Child elements are emitted in field order.
    #[must_use]
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }
}

/// Declaration of one model field.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub(crate) name: String,
    pub(crate) kind: BindingKind,
    pub(crate) ty: FieldType,
    pub(crate) tag: Option<String>,
    pub(crate) ns: Option<String>,
    pub(crate) nsmap: Vec<(String, String)>,
    pub(crate) wrap_path: Option<String>,
    pub(crate) entity: Option<WrappedEntity>,
    pub(crate) collection: bool,
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
}

impl FieldDecl {
    fn new(name: impl Into<String>, kind: BindingKind, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            tag: None,
            ns: None,
            nsmap: Vec::new(),
            wrap_path: None,
            entity: None,
            collection: false,
            optional: false,
            default: None,
        }
    }

    /// Scalar bound to an attribute named after the field.
    pub fn attribute(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::new(name, BindingKind::Attribute, FieldType::Scalar(ty))
    }

    /// Scalar bound to the text of a child element named after the field.
    pub fn element(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::new(name, BindingKind::Element, FieldType::Scalar(ty))
    }

    /// Nested model bound to a child element.
    ///
    /// The element tag is the field tag if set, else the nested model's tag,
    /// else the field name.
    pub fn model<T: XmlModel>(name: impl Into<String>) -> Self {
        Self::new(name, BindingKind::Element, FieldType::Model(ModelRef::of::<T>()))
    }

    /// Scalar bound to the text of the element at the end of `path`
    /// (`/`-separated wrapper tags).
    pub fn wrapped(name: impl Into<String>, path: impl Into<String>, ty: ScalarType) -> Self {
        let mut field = Self::new(name, BindingKind::Wrapped, FieldType::Scalar(ty));
        field.wrap_path = Some(path.into());
        field.entity = Some(WrappedEntity::Text);
        field
    }

    /// Scalar bound to the model element's own text.
    pub fn text(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::new(name, BindingKind::Text, FieldType::Scalar(ty))
    }

    /// Child element kept verbatim as an [`XmlNode`](crate::xml::XmlNode).
    pub fn raw(name: impl Into<String>) -> Self {
        Self::new(name, BindingKind::Raw, FieldType::Raw)
    }

    /// Override the XML name (defaults to the field name).
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Namespace prefix, resolved through the field nsmap, then the model nsmap.
    #[must_use]
    pub fn ns(mut self, prefix: impl Into<String>) -> Self {
        self.ns = Some(prefix.into());
        self
    }

    /// Namespace declarations made on the field's element.
    #[must_use]
    pub fn nsmap<'a>(mut self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.nsmap
            .extend(entries.into_iter().map(|(p, u)| (p.to_string(), u.to_string())));
        self
    }

    /// Bind every matching element, in document order.
    #[must_use]
    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    /// Allow the field to be absent.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Value used when the field is absent.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Move the binding below a path of wrapper elements.
    ///
    /// An attribute, element or text binding becomes the entity at the end
    /// of the path.
    #[must_use]
    pub fn wrap(mut self, path: impl Into<String>) -> Self {
        self.wrap_path = Some(path.into());
        let entity = match self.kind {
            BindingKind::Attribute => Some(WrappedEntity::Attribute),
            BindingKind::Element => Some(WrappedEntity::Element),
            BindingKind::Text => Some(WrappedEntity::Text),
            BindingKind::Wrapped => self.entity,
            BindingKind::Raw => None,
        };
        if entity.is_some() {
            self.kind = BindingKind::Wrapped;
            self.entity = entity;
        }
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> BindingKind {
        self.kind
    }
}
