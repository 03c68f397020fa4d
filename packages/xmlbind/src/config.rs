//! Configuration constants, option structs and name validation.
//!
//! Limits are compile-time constants. Behaviour that callers may want to
//! change per binder (error aggregation, duplicate handling, output shape)
//! lives in the option structs carried by [`crate::Binder`].

use regex::Regex;
use std::sync::LazyLock;

/// Maximum XML document size in bytes (16 MB).
///
/// Documents are parsed into an owned tree, so memory use grows linearly
/// with input size.
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Maximum number of nodes the parser accepts in one document.
pub const MAX_NODES: u32 = 1_000_000;

/// Maximum nesting depth of bound models.
///
/// Recursive models (trees, threaded comments) are bounded by this limit
/// during both deserialization and serialization.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Maximum element nesting depth accepted by the parser.
///
/// Checked in a flat pre-pass, so deeply nested input fails with an error
/// instead of exhausting the stack while the tree is built.
pub const MAX_ELEMENT_DEPTH: usize = 256;

/// The `xml:` namespace, bound to the `xml` prefix by definition.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XML name without a prefix (NCName, ASCII subset plus non-ASCII letters).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9._\-\x{80}-\x{10FFFF}]*$")
        .expect("valid regex")
});

/// Check that `name` can be used as an unprefixed XML tag or attribute name.
///
/// # Examples
/// ```
/// use xmlbind::config::is_valid_name;
///
/// assert!(is_valid_name("order-line"));
/// assert!(is_valid_name("_id"));
/// assert!(!is_valid_name("1st"));
/// assert!(!is_valid_name("ns:tag"));
/// ```
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// How field-level errors are reported during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Collect every field error in the document into one [`crate::BindError::Fields`].
    #[default]
    Aggregate,
    /// Stop at the first field error.
    FailFast,
}

/// What to do when a single-valued element field matches several elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Use the first match in document order and ignore the rest.
    #[default]
    First,
    /// Report a `DuplicateElement` error.
    Reject,
}

/// Options for deserialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeserializeOptions {
    pub error_mode: ErrorMode,
    pub duplicates: DuplicatePolicy,
}

impl DeserializeOptions {
    /// Set the error reporting mode.
    #[must_use]
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Set the duplicate element policy.
    #[must_use]
    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub(crate) fn fail_fast(&self) -> bool {
        self.error_mode == ErrorMode::FailFast
    }
}

/// Options for serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    /// Drop produced child elements that have no attributes, text or children.
    pub skip_empty: bool,
}

impl SerializeOptions {
    /// Enable or disable skipping of empty elements.
    #[must_use]
    pub fn with_skip_empty(mut self, skip_empty: bool) -> Self {
        self.skip_empty = skip_empty;
        self
    }
}

/// Options for rendering a tree to bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Emit an `<?xml version="1.0" encoding="UTF-8"?>` declaration.
    pub declaration: bool,
    /// Indent nested elements by this many spaces.
    ///
    /// Indentation adds whitespace between elements; text of mixed-content
    /// elements is not preserved exactly when it is enabled.
    pub indent: Option<usize>,
}

impl WriteOptions {
    /// Emit an XML declaration.
    #[must_use]
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    /// Pretty-print with the given indentation width.
    #[must_use]
    pub fn with_indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }
}
