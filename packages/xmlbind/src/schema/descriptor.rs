//! Resolved, immutable schema descriptors.

use crate::validate::ScalarType;
use crate::value::Value;
use crate::xml::QName;

use super::declare::{BindingKind, ModelKey, ModelRef, WrappedEntity};

/// Resolved type of a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    Scalar(ScalarType),
    Model(ModelRef),
    Raw,
}

/// A validated field binding.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: BindingKind,
    /// Local name of the attribute or element. `None` for text bindings.
    pub tag: Option<String>,
    /// Resolved namespace URI, when declared.
    pub namespace: Option<String>,
    /// Namespace declarations emitted on the field's element.
    pub nsmap: Vec<(Option<String>, String)>,
    /// Wrapper element tags, outermost first. Empty unless `kind` is `Wrapped`.
    pub wrap_path: Vec<String>,
    pub entity: Option<WrappedEntity>,
    pub collection: bool,
    pub optional: bool,
    pub default: Option<Value>,
    pub value_type: ValueType,
}

impl FieldDescriptor {
    /// The nested model, if the field binds one.
    #[must_use]
    pub fn nested(&self) -> Option<ModelRef> {
        match &self.value_type {
            ValueType::Model(model) => Some(*model),
            _ => None,
        }
    }

    /// Scalar type of the field, if it has one.
    #[must_use]
    pub fn scalar_type(&self) -> Option<&ScalarType> {
        match &self.value_type {
            ValueType::Scalar(ty) => Some(ty),
            _ => None,
        }
    }

    /// What the binding targets once any wrap path has been followed.
    #[must_use]
    pub fn target(&self) -> WrappedEntity {
        match self.kind {
            BindingKind::Attribute => WrappedEntity::Attribute,
            BindingKind::Element | BindingKind::Raw => WrappedEntity::Element,
            BindingKind::Text => WrappedEntity::Text,
            BindingKind::Wrapped => self.entity.unwrap_or(WrappedEntity::Text),
        }
    }

    /// Whether absence of the field is an error.
    #[must_use]
    pub fn is_required(&self) -> bool {
        !self.optional && self.default.is_none()
    }
}

/// Resolved binding description of one model.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    pub key: ModelKey,
    pub name: String,
    /// Root tag: the declared tag or the model name.
    pub tag: String,
    /// Whether `tag` was declared (and is checked on deserialization).
    pub tag_declared: bool,
    pub namespace: Option<String>,
    pub nsmap: Vec<(Option<String>, String)>,
    pub ns_attrs: bool,
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    /// Qualified name of the model's root element.
    #[must_use]
    pub fn qname(&self) -> QName {
        QName::new(self.namespace.as_deref(), self.tag.clone())
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}
