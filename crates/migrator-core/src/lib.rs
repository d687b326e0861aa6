//! migrator-core: pure annotation migration engine.
//!
//! Rewrites legacy test-framework annotations (Serenity, Allure1) into their
//! modern equivalents (JUnit5, Allure2). The crate never touches files or
//! syntax trees: it consumes [`Declaration`]s and returns an edit script that
//! a host applies. Java support lives in `migrator-java`.

pub mod annotation;
pub mod driver;
pub mod registry;
pub mod rules;

pub use annotation::{AnnotationId, AnnotationInstance, AttributeValue, Declaration, SourceSpan};
pub use driver::{migrate, migrate_declaration, preview, EditEntry, EditScript, MigrationPlan, Skipped};
pub use registry::{ids, NameStyle, Profile, Registry};
pub use rules::{MigrationRule, RewriteResult, RuleSkip, Transform};
