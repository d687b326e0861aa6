//! Rewrite rules and the trait they share.

pub mod array_rewrap;
pub mod passthrough;
pub mod placeholder;

use crate::annotation::{AnnotationId, AnnotationInstance, Declaration};
use crate::registry::NameStyle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

pub use array_rewrap::ArrayRewrap;
pub use passthrough::ValuePassthrough;
pub use placeholder::PlaceholderSubstitution;

/// The replacement produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteResult {
    /// Source text of the new annotation, `@` included.
    pub text: String,
    /// Annotation types the new text refers to.
    pub imports: BTreeSet<AnnotationId>,
}

/// Why a matched annotation was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum RuleSkip {
    #[error("attribute '{attribute}' is missing")]
    MissingAttribute { attribute: String },

    #[error("attribute '{attribute}' is {found}, expected {expected}")]
    UnexpectedShape {
        attribute: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// A pure rewrite from a legacy annotation to its replacement.
pub trait Rewrite {
    fn rewrite(
        &self,
        instance: &AnnotationInstance,
        decl: &Declaration,
    ) -> Result<RewriteResult, RuleSkip>;
}

/// How a legacy annotation's arguments are carried into the target annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transform", rename_all = "snake_case")]
pub enum Transform {
    /// `{a, b}` becomes `{@Inner(a), @Inner(b)}` inside the target.
    ArrayRewrap { inner: AnnotationId },
    /// The value text is copied verbatim.
    Passthrough,
    /// `{0}` placeholders are renamed after the method's parameters.
    StepPlaceholders,
}

/// One registry entry: legacy id, target id and the transform between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRule {
    pub legacy: AnnotationId,
    pub target: AnnotationId,
    pub transform: Transform,
    pub style: NameStyle,
}

impl MigrationRule {
    /// Run the rule against one annotation of `decl`.
    pub fn apply(
        &self,
        instance: &AnnotationInstance,
        decl: &Declaration,
    ) -> Result<RewriteResult, RuleSkip> {
        self.rewriter().rewrite(instance, decl)
    }

    fn rewriter(&self) -> Box<dyn Rewrite> {
        match &self.transform {
            Transform::ArrayRewrap { inner } => Box::new(ArrayRewrap {
                outer: self.target.clone(),
                inner: inner.clone(),
                style: self.style,
            }),
            Transform::Passthrough => Box::new(ValuePassthrough {
                target: self.target.clone(),
                style: self.style,
            }),
            Transform::StepPlaceholders => Box::new(PlaceholderSubstitution {
                target: self.target.clone(),
                style: self.style,
            }),
        }
    }
}

/// The attribute every built-in rule reads.
pub(crate) const VALUE: &str = "value";

pub(crate) fn required_value(
    instance: &AnnotationInstance,
) -> Result<&crate::annotation::AttributeValue, RuleSkip> {
    instance
        .attribute(VALUE)
        .ok_or_else(|| RuleSkip::MissingAttribute {
            attribute: VALUE.to_string(),
        })
}

/// Render `@Name(args)` using the configured name style.
pub(crate) fn render(id: &AnnotationId, style: NameStyle, args: &str) -> String {
    format!("@{}({})", style.name_of(id), args)
}
