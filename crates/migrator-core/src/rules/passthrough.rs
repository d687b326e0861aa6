//! Value passthrough: `@Title(x)` becomes `@DisplayName(x)` with `x` untouched.

use super::{render, required_value, Rewrite, RewriteResult, RuleSkip};
use crate::annotation::{AnnotationId, AnnotationInstance, Declaration};
use crate::registry::NameStyle;

pub struct ValuePassthrough {
    pub target: AnnotationId,
    pub style: NameStyle,
}

impl Rewrite for ValuePassthrough {
    fn rewrite(
        &self,
        instance: &AnnotationInstance,
        _decl: &Declaration,
    ) -> Result<RewriteResult, RuleSkip> {
        let value = required_value(instance)?;
        Ok(RewriteResult {
            text: render(&self.target, self.style, value.source_text()),
            imports: [self.target.clone()].into_iter().collect(),
        })
    }
}
