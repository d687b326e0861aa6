//! Step placeholders: Allure1 `@Step("Login as {0}")` on `login(String user)`
//! becomes Allure2 `@Step("Login as {user}")`.
//!
//! Allure2 resolves `{name}` against argument names at call time, Allure1
//! used positional `{index}`. Indices past the parameter list stay as they are.

use super::{render, required_value, Rewrite, RewriteResult, RuleSkip, VALUE};
use crate::annotation::{AnnotationId, AnnotationInstance, AttributeValue, Declaration};
use crate::registry::NameStyle;
use regex::{Captures, Regex};
use std::sync::OnceLock;

pub struct PlaceholderSubstitution {
    pub target: AnnotationId,
    pub style: NameStyle,
}

impl Rewrite for PlaceholderSubstitution {
    fn rewrite(
        &self,
        instance: &AnnotationInstance,
        decl: &Declaration,
    ) -> Result<RewriteResult, RuleSkip> {
        let literal = match required_value(instance)? {
            AttributeValue::StringLiteral(text) => text,
            other => {
                return Err(RuleSkip::UnexpectedShape {
                    attribute: VALUE.to_string(),
                    expected: "string literal",
                    found: other.variant_name(),
                })
            }
        };

        Ok(RewriteResult {
            text: render(
                &self.target,
                self.style,
                &substitute_placeholders(literal, &decl.parameters),
            ),
            imports: [self.target.clone()].into_iter().collect(),
        })
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern is valid"))
}

/// Replace each `{i}` with `{params[i]}`.
///
/// Only the canonical spelling of an index matches (`{01}` is not `{1}`),
/// and out-of-range indices are left verbatim.
pub fn substitute_placeholders(text: &str, params: &[String]) -> String {
    placeholder_pattern()
        .replace_all(text, |caps: &Captures| {
            let token = &caps[1];
            let name = token
                .parse::<usize>()
                .ok()
                .filter(|index| index.to_string() == token)
                .and_then(|index| params.get(index));
            match name {
                Some(name) => format!("{{{name}}}"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
