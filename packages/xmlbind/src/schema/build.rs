//! Validation of declarations and construction of descriptors.

use std::collections::HashSet;

use crate::config::is_valid_name;
use crate::error::{BindError, Result};
use crate::value::Value;

use super::declare::{
    BindingKind, FieldDecl, FieldType, ModelDecl, ModelKey, ModelRef, WrappedEntity,
};
use super::descriptor::{FieldDescriptor, SchemaDescriptor, ValueType};

/// Build the descriptor of one model.
///
/// Returns the descriptor together with the models its fields refer to, so
/// the caller can build those as well.
pub(crate) fn build_schema(
    key: ModelKey,
    decl: &ModelDecl,
) -> Result<(SchemaDescriptor, Vec<ModelRef>)> {
    let fail = |message: String| BindError::schema(&decl.name, message);

    let tag = decl.tag.clone().unwrap_or_else(|| decl.name.clone());
    if !is_valid_name(&tag) {
        return Err(fail(format!("'{tag}' is not a valid element name")));
    }
    check_nsmap(&decl.nsmap).map_err(fail)?;
    let namespace = match &decl.ns {
        Some(prefix) => resolve_prefix(prefix, &[], &decl.nsmap).map_err(fail)?,
        None => None,
    };

    let mut names = HashSet::new();
    let mut attributes = HashSet::new();
    let mut text_fields = 0;
    let mut fields = Vec::with_capacity(decl.fields.len());
    let mut nested = Vec::new();

    for field in &decl.fields {
        if !names.insert(field.name.as_str()) {
            return Err(fail(format!("duplicate field '{}'", field.name)));
        }
        let descriptor = build_field(field, decl)
            .map_err(|message| fail(format!("field '{}': {message}", field.name)))?;

        if descriptor.kind == BindingKind::Text {
            text_fields += 1;
            if text_fields > 1 {
                return Err(fail("more than one text field".to_string()));
            }
        }
        if descriptor.target() == WrappedEntity::Attribute {
            let attr_ns = descriptor
                .namespace
                .clone()
                .or_else(|| namespace.clone().filter(|_| decl.ns_attrs));
            let attr = descriptor.tag.clone().unwrap_or_else(|| descriptor.name.clone());
            if !attributes.insert((descriptor.wrap_path.clone(), attr_ns, attr.clone())) {
                return Err(fail(format!(
                    "field '{}': attribute '{attr}' is bound twice",
                    field.name
                )));
            }
        }
        if let Some(model) = descriptor.nested() {
            nested.push(model);
        }
        fields.push(descriptor);
    }

    let schema = SchemaDescriptor {
        key,
        name: decl.name.clone(),
        tag,
        tag_declared: decl.tag.is_some(),
        namespace,
        nsmap: declarations(&decl.nsmap),
        ns_attrs: decl.ns_attrs,
        fields,
    };
    Ok((schema, nested))
}

fn build_field(
    field: &FieldDecl,
    model: &ModelDecl,
) -> std::result::Result<FieldDescriptor, String> {
    if field.name.is_empty() {
        return Err("field name is empty".to_string());
    }

    let value_type = match (&field.ty, field.kind) {
        (FieldType::Raw, BindingKind::Raw) => ValueType::Raw,
        (FieldType::Raw, _) => return Err("raw values need a raw binding".to_string()),
        (_, BindingKind::Raw) => return Err("raw bindings need a raw value type".to_string()),
        (FieldType::Scalar(ty), _) => ValueType::Scalar(ty.clone()),
        (FieldType::Model(m), _) => ValueType::Model(*m),
    };

    let wrap_path = match (&field.wrap_path, field.kind) {
        (Some(_), BindingKind::Raw) => return Err("raw fields cannot be wrapped".to_string()),
        (Some(path), BindingKind::Wrapped) => parse_wrap_path(path)?,
        (None, BindingKind::Wrapped) => return Err("wrap path is empty".to_string()),
        _ => Vec::new(),
    };
    let entity = (field.kind == BindingKind::Wrapped)
        .then(|| field.entity.unwrap_or(WrappedEntity::Text));

    let target = match field.kind {
        BindingKind::Attribute => WrappedEntity::Attribute,
        BindingKind::Element | BindingKind::Raw => WrappedEntity::Element,
        BindingKind::Text => WrappedEntity::Text,
        BindingKind::Wrapped => entity.unwrap_or(WrappedEntity::Text),
    };
    let is_model = matches!(value_type, ValueType::Model(_));

    if field.collection && target != WrappedEntity::Element {
        return Err("only element bindings can be collections".to_string());
    }
    if is_model && (target != WrappedEntity::Element || field.kind == BindingKind::Raw) {
        return Err("nested models must be bound to elements".to_string());
    }

    let tag = match target {
        WrappedEntity::Text => None,
        WrappedEntity::Attribute | WrappedEntity::Element => {
            let nested_tag = match &value_type {
                ValueType::Model(m) if field.tag.is_none() => m.declaration().tag,
                _ => None,
            };
            let tag = field
                .tag
                .clone()
                .or(nested_tag)
                .unwrap_or_else(|| field.name.clone());
            if !is_valid_name(&tag) {
                return Err(format!("'{tag}' is not a valid XML name"));
            }
            Some(tag)
        }
    };

    check_nsmap(&field.nsmap)?;
    let namespace = match &field.ns {
        Some(prefix) => resolve_prefix(prefix, &field.nsmap, &model.nsmap)?,
        None => None,
    };

    if let Some(default) = &field.default {
        check_default(default, &value_type, field.collection)?;
    }

    Ok(FieldDescriptor {
        name: field.name.clone(),
        kind: field.kind,
        tag,
        namespace,
        nsmap: declarations(&field.nsmap),
        wrap_path,
        entity,
        collection: field.collection,
        optional: field.optional,
        default: field.default.clone(),
        value_type,
    })
}

fn parse_wrap_path(path: &str) -> std::result::Result<Vec<String>, String> {
    if path.trim().is_empty() {
        return Err("wrap path is empty".to_string());
    }
    path.split('/')
        .map(|segment| {
            if is_valid_name(segment) {
                Ok(segment.to_string())
            } else {
                Err(format!("invalid wrap path '{path}'"))
            }
        })
        .collect()
}

fn check_nsmap(nsmap: &[(String, String)]) -> std::result::Result<(), String> {
    for (prefix, _) in nsmap {
        if !prefix.is_empty() && (!is_valid_name(prefix) || prefix.starts_with("xml")) {
            return Err(format!("invalid namespace prefix '{prefix}'"));
        }
    }
    Ok(())
}

/// Resolve a namespace prefix through the field map, then the model map.
fn resolve_prefix(
    prefix: &str,
    field_map: &[(String, String)],
    model_map: &[(String, String)],
) -> std::result::Result<Option<String>, String> {
    field_map
        .iter()
        .chain(model_map)
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| Some(uri.clone()).filter(|u| !u.is_empty()))
        .ok_or_else(|| format!("unknown namespace prefix '{prefix}'"))
}

fn declarations(nsmap: &[(String, String)]) -> Vec<(Option<String>, String)> {
    nsmap
        .iter()
        .map(|(prefix, uri)| (Some(prefix.clone()).filter(|p| !p.is_empty()), uri.clone()))
        .collect()
}

fn check_default(
    default: &Value,
    value_type: &ValueType,
    collection: bool,
) -> std::result::Result<(), String> {
    let ValueType::Scalar(ty) = value_type else {
        return Err("defaults are only supported on scalar fields".to_string());
    };
    let fits = |value: &Value| matches!(value, Value::Scalar(s) if ty.accepts(s));
    let ok = if collection {
        matches!(default, Value::List(items) if items.iter().all(fits))
    } else {
        fits(default)
    };
    if ok {
        Ok(())
    } else {
        Err(format!("default value does not fit type {}", ty.name()))
    }
}
