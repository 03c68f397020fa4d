//! Type coercion between located XML content and bound values.
//!
//! Scalars go through the [`Validator`]; nested models go through a
//! recursion callback supplied by the deserializer or serializer. This
//! module owns the policy for absence, defaults, collections and duplicates.

use crate::config::DuplicatePolicy;
use crate::error::{BindError, Result};
use crate::schema::{FieldDescriptor, ValueType, WrappedEntity};
use crate::validate::{ScalarType, ValidationError, Validator};
use crate::value::{Record, Value};
use crate::xml::XmlNode;

use super::resolver::{Found, Rendered};

/// Function type for deserializing a nested model element.
pub(crate) type RecurseFn<'a> = dyn Fn(&XmlNode) -> Result<Record> + 'a;

/// Function type for serializing a nested model record.
pub(crate) type RenderFn<'a> = dyn Fn(&Record) -> Result<XmlNode> + 'a;

/// Deserialization policy shared by all fields of one call.
pub(crate) struct Bridge<'a> {
    pub validator: &'a dyn Validator,
    pub fail_fast: bool,
    pub duplicates: DuplicatePolicy,
}

/// Turn the matches of one field into its bound value.
///
/// Errors carry a path relative to the model (starting with the field name)
/// and `location` as the tag path of the model element.
///
/// Empty text content of an optional or defaulted text binding counts as
/// absent; required text bindings validate the empty string.
pub(crate) fn coerce(
    found: Vec<Found<'_>>,
    field: &FieldDescriptor,
    location: &str,
    bridge: &Bridge<'_>,
    recurse: &RecurseFn<'_>,
) -> Result<Value> {
    if found.is_empty() || is_blank_text(&found, field) {
        return absent(field, location);
    }

    if field.collection {
        let mut items = Vec::with_capacity(found.len());
        let mut errors = Vec::new();
        for (i, item) in found.into_iter().enumerate() {
            match coerce_one(item, field, bridge, recurse) {
                Ok(value) => items.push(value),
                Err(e) if e.is_field_error() && !bridge.fail_fast => {
                    errors.push(e.prefixed(&format!("[{i}]")));
                }
                Err(e) => return Err(e.prefixed(&format!("[{i}]")).prefixed(&field.name)),
            }
        }
        if !errors.is_empty() {
            return Err(BindError::merge(errors).prefixed(&field.name));
        }
        return Ok(Value::List(items));
    }

    if found.len() > 1 {
        let tag = field.tag.as_deref().unwrap_or(&field.name);
        match bridge.duplicates {
            DuplicatePolicy::First => {
                tracing::debug!(
                    field = %field.name,
                    tag,
                    count = found.len(),
                    "Ignoring duplicate elements"
                );
            }
            DuplicatePolicy::Reject => {
                return Err(BindError::DuplicateElement {
                    path: field.name.clone(),
                    tag: tag.to_string(),
                    count: found.len(),
                });
            }
        }
    }

    coerce_one(found[0], field, bridge, recurse).map_err(|e| e.prefixed(&field.name))
}

fn is_blank_text(found: &[Found<'_>], field: &FieldDescriptor) -> bool {
    !field.is_required()
        && field.target() == WrappedEntity::Text
        && matches!(found, [Found::Text("")])
}

fn absent(field: &FieldDescriptor, location: &str) -> Result<Value> {
    if let Some(default) = &field.default {
        tracing::debug!(field = %field.name, location, "Using default value");
        return Ok(default.clone());
    }
    if field.optional {
        return Ok(if field.collection {
            Value::List(Vec::new())
        } else {
            Value::None
        });
    }
    Err(BindError::MissingField {
        path: field.name.clone(),
        location: location.to_string(),
    })
}

fn coerce_one(
    item: Found<'_>,
    field: &FieldDescriptor,
    bridge: &Bridge<'_>,
    recurse: &RecurseFn<'_>,
) -> Result<Value> {
    match (&field.value_type, item) {
        (ValueType::Scalar(ty), Found::Text(raw)) => validate(bridge.validator, raw, ty),
        (ValueType::Scalar(ty), Found::Node(node)) => {
            validate(bridge.validator, node.text.as_deref().unwrap_or_default(), ty)
        }
        (ValueType::Model(_), Found::Node(node)) => recurse(node).map(Value::Model),
        (ValueType::Raw, Found::Node(node)) => Ok(Value::Raw(node.detached())),
        (_, Found::Text(_)) => Err(BindError::invalid("expected an element")),
    }
}

fn validate(validator: &dyn Validator, raw: &str, ty: &ScalarType) -> Result<Value> {
    validator
        .validate(raw, ty)
        .map(Value::Scalar)
        .map_err(BindError::invalid)
}

/// Turn the bound value of one field into renderable items.
///
/// Rendering stops at the first error; paths are relative to the model.
/// A required collection must hold at least one item, since an empty one
/// writes nothing and would read back as missing.
pub(crate) fn render(
    value: &Value,
    field: &FieldDescriptor,
    location: &str,
    validator: &dyn Validator,
    render_model: &RenderFn<'_>,
) -> Result<Vec<Rendered>> {
    let value = match (value, &field.default) {
        (Value::None, Some(default)) => default,
        (Value::None, None) if field.optional => return Ok(Vec::new()),
        (Value::None, None) => {
            return Err(BindError::MissingField {
                path: field.name.clone(),
                location: location.to_string(),
            });
        }
        (value, _) => value,
    };

    match (value, field.collection) {
        (Value::List(items), true) if items.is_empty() && field.is_required() => {
            Err(BindError::MissingField {
                path: field.name.clone(),
                location: location.to_string(),
            })
        }
        (Value::List(items), true) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                render_one(item, field, validator, render_model)
                    .map_err(|e| e.prefixed(&format!("[{i}]")).prefixed(&field.name))
            })
            .collect(),
        (other, true) => Err(mismatch("list", other).prefixed(&field.name)),
        (Value::List(_), false) => {
            Err(BindError::invalid("expected a single value, found list").prefixed(&field.name))
        }
        (single, false) => render_one(single, field, validator, render_model)
            .map(|item| vec![item])
            .map_err(|e| e.prefixed(&field.name)),
    }
}

fn render_one(
    value: &Value,
    field: &FieldDescriptor,
    validator: &dyn Validator,
    render_model: &RenderFn<'_>,
) -> Result<Rendered> {
    match (&field.value_type, value) {
        (ValueType::Scalar(ty), Value::Scalar(scalar)) => validator
            .render(scalar, ty)
            .map(Rendered::Text)
            .map_err(BindError::invalid),
        (ValueType::Scalar(ty), other) => Err(mismatch(ty.name(), other)),
        (ValueType::Model(_), Value::Model(record)) => render_model(record).map(Rendered::Node),
        (ValueType::Model(_), other) => Err(mismatch("model", other)),
        (ValueType::Raw, Value::Raw(node)) => Ok(Rendered::Node(node.detached())),
        (ValueType::Raw, other) => Err(mismatch("raw element", other)),
    }
}

fn mismatch(expected: &str, found: &Value) -> BindError {
    BindError::invalid(ValidationError::new(format!(
        "expected {expected}, found {}",
        found.kind_name()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BindingKind;
    use crate::validate::{IntKind, StandardValidator};
    use crate::value::Scalar;
    use crate::xml::QName;
    use pretty_assertions::assert_eq;

    fn field(ty: ScalarType) -> FieldDescriptor {
        FieldDescriptor {
            name: "n".to_string(),
            kind: BindingKind::Element,
            tag: Some("n".to_string()),
            namespace: None,
            nsmap: Vec::new(),
            wrap_path: Vec::new(),
            entity: None,
            collection: false,
            optional: false,
            default: None,
            value_type: ValueType::Scalar(ty),
        }
    }

    fn bridge(fail_fast: bool, duplicates: DuplicatePolicy) -> Bridge<'static> {
        Bridge {
            validator: &StandardValidator,
            fail_fast,
            duplicates,
        }
    }

    fn no_models(_: &XmlNode) -> Result<Record> {
        Ok(Record::new())
    }

    fn int_node(text: &str) -> XmlNode {
        XmlNode::new(QName::local("n")).with_text(text)
    }

    #[test]
    fn test_absent_policies() {
        let b = bridge(false, DuplicatePolicy::First);
        let mut f = field(ScalarType::Integer(IntKind::I32));

        let err = coerce(vec![], &f, "/root", &b, &no_models).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field 'n' in /root");

        f.optional = true;
        assert_eq!(coerce(vec![], &f, "/root", &b, &no_models).unwrap(), Value::None);

        f.collection = true;
        assert_eq!(
            coerce(vec![], &f, "/root", &b, &no_models).unwrap(),
            Value::List(vec![])
        );

        f.default = Some(Value::from(vec![1i32]));
        assert_eq!(
            coerce(vec![], &f, "/root", &b, &no_models).unwrap(),
            Value::List(vec![Value::from(1i32)])
        );
    }

    #[test]
    fn test_collection_errors_are_indexed() {
        let mut f = field(ScalarType::Integer(IntKind::I32));
        f.collection = true;
        let nodes = [int_node("1"), int_node("x"), int_node("3"), int_node("y")];
        let found: Vec<_> = nodes.iter().map(Found::Node).collect();

        let aggregate = bridge(false, DuplicatePolicy::First);
        let err = coerce(found.clone(), &f, "/r", &aggregate, &no_models).unwrap_err();
        let paths: Vec<_> = err.field_errors().iter().filter_map(|e| e.path()).collect();
        assert_eq!(paths, vec!["n[1]", "n[3]"]);

        let err = coerce(found, &f, "/r", &bridge(true, DuplicatePolicy::First), &no_models)
            .unwrap_err();
        assert_eq!(err.path(), Some("n[1]"));
    }

    #[test]
    fn test_duplicate_policy() {
        let f = field(ScalarType::Integer(IntKind::I32));
        let nodes = [int_node("1"), int_node("2")];
        let found: Vec<_> = nodes.iter().map(Found::Node).collect();

        let lenient = bridge(false, DuplicatePolicy::First);
        let value = coerce(found.clone(), &f, "/r", &lenient, &no_models).unwrap();
        assert_eq!(value, Value::Scalar(Scalar::Int(1)));

        let err = coerce(found, &f, "/r", &bridge(false, DuplicatePolicy::Reject), &no_models)
            .unwrap_err();
        assert!(matches!(err, BindError::DuplicateElement { count: 2, .. }));
    }

    #[test]
    fn test_empty_element_text_is_validated() {
        let f = field(ScalarType::String);
        let node = XmlNode::new(QName::local("n"));
        let value = coerce(
            vec![Found::Node(&node)],
            &f,
            "/r",
            &bridge(false, DuplicatePolicy::First),
            &no_models,
        )
        .unwrap();
        assert_eq!(value, Value::from(""));
    }

    #[test]
    fn test_empty_text_binding() {
        let b = bridge(false, DuplicatePolicy::First);
        let mut f = field(ScalarType::String);
        f.kind = BindingKind::Text;
        f.tag = None;

        let value = coerce(vec![Found::Text("")], &f, "/r", &b, &no_models).unwrap();
        assert_eq!(value, Value::from(""));

        let value = coerce(vec![Found::Text("  ")], &f, "/r", &b, &no_models).unwrap();
        assert_eq!(value, Value::from("  "));

        f.optional = true;
        let value = coerce(vec![Found::Text("")], &f, "/r", &b, &no_models).unwrap();
        assert_eq!(value, Value::None);

        // Attributes keep an explicit empty value.
        f.kind = BindingKind::Attribute;
        let value = coerce(vec![Found::Text("")], &f, "/r", &b, &no_models).unwrap();
        assert_eq!(value, Value::from(""));
    }

    #[test]
    fn test_render_empty_required_list() {
        let mut f = field(ScalarType::String);
        f.collection = true;
        let no_render = |_: &Record| -> Result<XmlNode> { Ok(XmlNode::new(QName::local("x"))) };

        let err = render(&Value::List(vec![]), &f, "/r", &StandardValidator, &no_render)
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field 'n' in /r");

        f.optional = true;
        assert!(render(&Value::List(vec![]), &f, "/r", &StandardValidator, &no_render)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_render_shapes() {
        let mut f = field(ScalarType::Integer(IntKind::U8));
        let no_render = |_: &Record| -> Result<XmlNode> { Ok(XmlNode::new(QName::local("x"))) };

        let items = render(&Value::from(7u8), &f, "/r", &StandardValidator, &no_render).unwrap();
        assert_eq!(items, vec![Rendered::Text("7".to_string())]);

        let err =
            render(&Value::from(300i32), &f, "/r", &StandardValidator, &no_render).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for field 'n': 300 cannot be represented as u8"
        );

        let err = render(&Value::from(vec![1i32]), &f, "/r", &StandardValidator, &no_render)
            .unwrap_err();
        assert_eq!(err.path(), Some("n"));

        let err = render(&Value::None, &f, "/r", &StandardValidator, &no_render).unwrap_err();
        assert!(matches!(err, BindError::MissingField { .. }));

        f.optional = true;
        assert!(render(&Value::None, &f, "/r", &StandardValidator, &no_render)
            .unwrap()
            .is_empty());

        f.default = Some(Value::from(1u8));
        assert_eq!(
            render(&Value::None, &f, "/r", &StandardValidator, &no_render).unwrap(),
            vec![Rendered::Text("1".to_string())]
        );
    }
}
