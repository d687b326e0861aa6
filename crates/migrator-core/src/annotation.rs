//! Attribute expression model: annotation identities, argument values and
//! the declarations they decorate.
//!
//! Values are kept as SOURCE TEXT. The migration is purely syntactic, so
//! nothing here ever evaluates an expression.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Fully-qualified name of an annotation type, e.g. `org.junit.jupiter.api.Tag`.
///
/// Equality is exact string comparison. Registry constants are built with
/// [`AnnotationId::from_static`]; hosts build ids for whatever they find in
/// source with [`AnnotationId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(Cow<'static, str>);

impl AnnotationId {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The segment after the last `.` (`Tag` for `org.junit.jupiter.api.Tag`).
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Everything before the last `.`, or `None` for an unqualified name.
    pub fn package(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(pkg, _)| pkg)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One annotation argument, as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// A string literal, quotes and escapes included: `"Login as {0}"`.
    StringLiteral(String),
    /// An array initializer `{a, b}`. `text` is the whole initializer.
    ArrayLiteral {
        text: String,
        elements: Vec<AttributeValue>,
    },
    /// Anything not decomposed further (constants, concatenations, ...).
    RawExpression(String),
}

impl AttributeValue {
    /// The exact source text of this value.
    pub fn source_text(&self) -> &str {
        match self {
            AttributeValue::StringLiteral(text) | AttributeValue::RawExpression(text) => text,
            AttributeValue::ArrayLiteral { text, .. } => text,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            AttributeValue::StringLiteral(_) => "string literal",
            AttributeValue::ArrayLiteral { .. } => "array literal",
            AttributeValue::RawExpression(_) => "expression",
        }
    }

    /// Build an array value from element values, rendering `{a, b}` as its text.
    pub fn array(elements: Vec<AttributeValue>) -> Self {
        let text = format!(
            "{{{}}}",
            elements
                .iter()
                .map(AttributeValue::source_text)
                .collect::<Vec<_>>()
                .join(", ")
        );
        AttributeValue::ArrayLiteral { text, elements }
    }
}

/// Byte range `[start..end)` of an annotation in the host's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One annotation attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationInstance {
    pub id: AnnotationId,
    /// Attribute name -> value. The single-value form `@A(x)` is stored under `value`.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub span: SourceSpan,
    /// Full source text of the annotation, `@` included.
    #[serde(default)]
    pub text: String,
}

impl AnnotationInstance {
    pub fn new(id: AnnotationId) -> Self {
        let text = format!("@{}", id.simple_name());
        Self {
            id,
            attributes: BTreeMap::new(),
            span: SourceSpan::default(),
            text,
        }
    }

    pub fn with_attribute(mut self, name: &str, value: AttributeValue) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = span;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

/// A method declaration as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    /// Parameter names in declaration order.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Annotations in source order.
    #[serde(default)]
    pub annotations: Vec<AnnotationInstance>,
    /// Opaque handle for the file the declaration lives in.
    #[serde(default)]
    pub file: String,
}

impl Declaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            annotations: Vec::new(),
            file: String::new(),
        }
    }

    pub fn with_parameters<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.parameters = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationInstance) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }
}
