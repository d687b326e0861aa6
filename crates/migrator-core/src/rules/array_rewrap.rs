//! Array re-wrap: `@Legacy({a, b})` becomes `@Outer({@Inner(a), @Inner(b)})`.
//!
//! Used for Serenity tag lists (JUnit5 `@Tags`/`@Tag`) and Allure1 stories
//! and features (Allure2 `@Stories`/`@Story`, `@Features`/`@Feature`).

use super::{render, required_value, Rewrite, RewriteResult, RuleSkip, VALUE};
use crate::annotation::{AnnotationId, AnnotationInstance, AttributeValue, Declaration};
use crate::registry::NameStyle;

pub struct ArrayRewrap {
    pub outer: AnnotationId,
    pub inner: AnnotationId,
    pub style: NameStyle,
}

impl Rewrite for ArrayRewrap {
    fn rewrite(
        &self,
        instance: &AnnotationInstance,
        _decl: &Declaration,
    ) -> Result<RewriteResult, RuleSkip> {
        let elements = match required_value(instance)? {
            AttributeValue::ArrayLiteral { elements, .. } => elements,
            other => {
                return Err(RuleSkip::UnexpectedShape {
                    attribute: VALUE.to_string(),
                    expected: "array literal",
                    found: other.variant_name(),
                })
            }
        };

        let wrapped = elements
            .iter()
            .map(|element| render(&self.inner, self.style, element.source_text()))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(RewriteResult {
            text: render(&self.outer, self.style, &format!("{{{wrapped}}}")),
            imports: [self.outer.clone(), self.inner.clone()].into_iter().collect(),
        })
    }
}
