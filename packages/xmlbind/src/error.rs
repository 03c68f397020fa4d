//! Error types for the binding engine.
//!
//! Structural errors (`Parse`, `InvalidInput`, `Schema`, `UnexpectedTag`,
//! `DepthExceeded`) abort an operation immediately. Field-level errors
//! (`MissingField`, `InvalidFieldValue`, `DuplicateElement`) carry a dotted
//! path from the root model and may be aggregated into `Fields`.

use std::fmt;

use thiserror::Error;

use crate::validate::ValidationError;

/// Main error type for binding operations.
#[derive(Debug, Error)]
pub enum BindError {
    /// The document is not well-formed XML.
    #[error("XML parsing failed: {0}")]
    Parse(#[from] roxmltree::Error),

    /// The document could not be read as XML text (encoding, size limits).
    #[error("Invalid XML input: {0}")]
    InvalidInput(String),

    /// Invalid or conflicting field declarations.
    #[error("Invalid schema for model {model}: {message}")]
    Schema { model: String, message: String },

    /// The root element does not match the model's declared tag.
    #[error("Unexpected tag: expected <{expected}>, found <{actual}>")]
    UnexpectedTag { expected: String, actual: String },

    /// A required field has no matching node.
    #[error("Missing required field '{path}' in {location}")]
    MissingField { path: String, location: String },

    /// The validator rejected a value (or could not render one).
    #[error("Invalid value for field '{path}': {cause}")]
    InvalidFieldValue {
        path: String,
        #[source]
        cause: ValidationError,
    },

    /// A single-valued element field matched more than one element.
    #[error("Field '{path}' expects a single <{tag}> element but found {count}")]
    DuplicateElement {
        path: String,
        tag: String,
        count: usize,
    },

    /// Nested models exceed the configured depth limit.
    #[error("Nesting depth limit of {limit} exceeded in {location}")]
    DepthExceeded { location: String, limit: usize },

    /// Several field-level errors collected from one document.
    #[error("{0}")]
    Fields(FieldErrors),

    /// IO error while writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML writer error.
    #[error("XML writer error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl BindError {
    /// Shorthand for a schema error on `model`.
    pub fn schema(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an invalid value error with an empty (relative) path.
    pub(crate) fn invalid(cause: impl Into<ValidationError>) -> Self {
        Self::InvalidFieldValue {
            path: String::new(),
            cause: cause.into(),
        }
    }

    /// Whether this error is attached to a single field rather than the whole document.
    #[must_use]
    pub fn is_field_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::InvalidFieldValue { .. }
                | Self::DuplicateElement { .. }
                | Self::Fields(_)
        )
    }

    /// Dotted field path of a field-level error.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MissingField { path, .. }
            | Self::InvalidFieldValue { path, .. }
            | Self::DuplicateElement { path, .. } => Some(path),
            _ => None,
        }
    }

    /// All leaf field errors contained in this error.
    #[must_use]
    pub fn field_errors(&self) -> Vec<&BindError> {
        match self {
            Self::Fields(errors) => errors.iter().collect(),
            err if err.is_field_error() => vec![err],
            _ => Vec::new(),
        }
    }

    /// Prepend an outer field segment to the path of every field-level error.
    ///
    /// `prefixed("child")` turns `inner` into `child.inner`, `[2]` into
    /// `child[2]` and an empty path into `child`.
    #[must_use]
    pub fn prefixed(self, segment: &str) -> Self {
        match self {
            Self::MissingField { path, location } => Self::MissingField {
                path: join_path(segment, &path),
                location,
            },
            Self::InvalidFieldValue { path, cause } => Self::InvalidFieldValue {
                path: join_path(segment, &path),
                cause,
            },
            Self::DuplicateElement { path, tag, count } => Self::DuplicateElement {
                path: join_path(segment, &path),
                tag,
                count,
            },
            Self::Fields(errors) => Self::Fields(FieldErrors(
                errors.0.into_iter().map(|e| e.prefixed(segment)).collect(),
            )),
            other => other,
        }
    }

    /// Combine field errors into one error, flattening nested aggregates.
    ///
    /// A single error is returned unchanged.
    #[must_use]
    pub fn merge(errors: Vec<BindError>) -> Self {
        let mut flat = Vec::with_capacity(errors.len());
        for err in errors {
            match err {
                Self::Fields(inner) => flat.extend(inner.0),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            if let Some(single) = flat.pop() {
                return single;
            }
        }
        Self::Fields(FieldErrors(flat))
    }
}

fn join_path(segment: &str, path: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else if path.starts_with('[') {
        format!("{segment}{path}")
    } else {
        format!("{segment}.{path}")
    }
}

/// Aggregated field-level errors.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<BindError>);

impl FieldErrors {
    /// Iterate the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &BindError> {
        self.0.iter()
    }

    /// Number of contained errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} field errors", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{err}")?;
        }
        Ok(())
    }
}

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindError>;
