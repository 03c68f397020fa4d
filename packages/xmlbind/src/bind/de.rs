//! Deserialization: element tree to [`Record`].

use crate::config::{DeserializeOptions, MAX_NESTING_DEPTH};
use crate::error::{BindError, Result};
use crate::schema::{SchemaDescriptor, SchemaStore};
use crate::validate::Validator;
use crate::value::Record;
use crate::xml::XmlNode;

use super::coerce::{coerce, Bridge};
use super::resolver::{locate, placement};

/// Walks a schema's fields over an element tree.
pub struct Deserializer<'a> {
    store: &'a SchemaStore,
    validator: &'a dyn Validator,
    options: DeserializeOptions,
}

impl<'a> Deserializer<'a> {
    pub fn new(
        store: &'a SchemaStore,
        validator: &'a dyn Validator,
        options: DeserializeOptions,
    ) -> Self {
        Self {
            store,
            validator,
            options,
        }
    }

    /// Deserialize `node` as an instance of `schema`.
    ///
    /// # Errors
    /// `UnexpectedTag` if the root element does not match the model,
    /// `DepthExceeded` for overly deep nesting, and field errors (aggregated
    /// unless the error mode is fail-fast).
    pub fn deserialize(&self, node: &XmlNode, schema: &SchemaDescriptor) -> Result<Record> {
        check_root(node, schema)?;
        let location = format!("/{}", node.name.local);
        self.model(node, schema, &location, 0)
    }

    fn model(
        &self,
        node: &XmlNode,
        schema: &SchemaDescriptor,
        location: &str,
        depth: usize,
    ) -> Result<Record> {
        if depth > MAX_NESTING_DEPTH {
            return Err(BindError::DepthExceeded {
                location: location.to_string(),
                limit: MAX_NESTING_DEPTH,
            });
        }

        let bridge = Bridge {
            validator: self.validator,
            fail_fast: self.options.fail_fast(),
            duplicates: self.options.duplicates,
        };
        let mut record = Record::new();
        let mut errors = Vec::new();

        for field in &schema.fields {
            let nested = field
                .nested()
                .map(|model| self.store.resolve(model))
                .transpose()?;
            let target = placement(field, nested.as_deref(), node.name.ns(), schema.ns_attrs);
            let found = locate(node, &target);
            tracing::trace!(
                field = %field.name,
                matches = found.len(),
                location,
                "Extracting field"
            );

            let recurse = |child: &XmlNode| -> Result<Record> {
                let Some(nested) = nested.as_deref() else {
                    return Err(BindError::schema(
                        &schema.name,
                        format!("field '{}' has no nested model", field.name),
                    ));
                };
                let child_location = format!(
                    "{location}{}/{}",
                    target.wrapper_path(),
                    child.name.local
                );
                self.model(child, nested, &child_location, depth + 1)
            };

            match coerce(found, field, location, &bridge, &recurse) {
                Ok(value) => record.insert(&field.name, value),
                Err(e) if e.is_field_error() && !bridge.fail_fast => errors.push(e),
                Err(e) => return Err(e),
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(BindError::merge(errors))
        }
    }
}

fn check_root(node: &XmlNode, schema: &SchemaDescriptor) -> Result<()> {
    let tag_matches = !schema.tag_declared || node.name.local == schema.tag;
    let ns_matches = schema.namespace.is_none() || node.name.namespace == schema.namespace;
    if tag_matches && ns_matches {
        Ok(())
    } else {
        Err(BindError::UnexpectedTag {
            expected: schema.qname().to_string(),
            actual: node.name.to_string(),
        })
    }
}
