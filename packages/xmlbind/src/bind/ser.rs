//! Serialization: [`Record`] to element tree.

use crate::config::{SerializeOptions, MAX_NESTING_DEPTH};
use crate::error::{BindError, Result};
use crate::schema::{SchemaDescriptor, SchemaStore};
use crate::validate::Validator;
use crate::value::{Record, Value};
use crate::xml::{QName, XmlNode};

use super::coerce::render;
use super::resolver::{place, placement};

/// Builds element trees from records. Stops at the first error.
pub struct Serializer<'a> {
    store: &'a SchemaStore,
    validator: &'a dyn Validator,
    options: SerializeOptions,
}

impl<'a> Serializer<'a> {
    pub fn new(
        store: &'a SchemaStore,
        validator: &'a dyn Validator,
        options: SerializeOptions,
    ) -> Self {
        Self {
            store,
            validator,
            options,
        }
    }

    /// Serialize `record` as the root element of `schema`.
    ///
    /// # Errors
    /// `MissingField` for absent required values, `InvalidFieldValue` for
    /// values of the wrong shape or that the validator cannot render.
    pub fn serialize(&self, record: &Record, schema: &SchemaDescriptor) -> Result<XmlNode> {
        let location = format!("/{}", schema.tag);
        self.model(record, schema, schema.qname(), &location, 0)
    }

    fn model(
        &self,
        record: &Record,
        schema: &SchemaDescriptor,
        name: QName,
        location: &str,
        depth: usize,
    ) -> Result<XmlNode> {
        if depth > MAX_NESTING_DEPTH {
            return Err(BindError::DepthExceeded {
                location: location.to_string(),
                limit: MAX_NESTING_DEPTH,
            });
        }

        let mut node = XmlNode::new(name);
        node.namespaces = schema.nsmap.clone();

        for field in &schema.fields {
            let nested = field
                .nested()
                .map(|model| self.store.resolve(model))
                .transpose()?;
            let target = placement(field, nested.as_deref(), node.name.ns(), schema.ns_attrs);
            let value = record.get(&field.name).unwrap_or(&Value::None);

            let render_model = |child: &Record| -> Result<XmlNode> {
                match (nested.as_deref(), target.element_name()) {
                    (Some(nested), Some(child_name)) => {
                        let child_location = format!(
                            "{location}{}/{}",
                            target.wrapper_path(),
                            child_name.local
                        );
                        self.model(child, nested, child_name.clone(), &child_location, depth + 1)
                    }
                    _ => Err(BindError::schema(
                        &schema.name,
                        format!("field '{}' has no nested model", field.name),
                    )),
                }
            };

            let items = render(value, field, location, self.validator, &render_model)?;
            place(&mut node, &target, field, items, self.options.skip_empty)?;
        }

        Ok(node)
    }
}
