//! migrator-java: applies `migrator-core` migrations to Java source text.
//!
//! This crate is the host side of the engine: it parses Java with
//! tree-sitter, hands the core plain [`migrator_core::Declaration`]s, and
//! turns the resulting edit script back into text edits and import changes.

pub mod edit;
pub mod extract;
pub mod imports;
pub mod migrate;
pub mod validate;

pub use migrate::{migrate_source, ChangeDescription, FileMigration, Scope};

use thiserror::Error;
use tree_sitter::{Language, Parser};

#[derive(Debug, Error)]
pub enum JavaError {
    #[error("tree-sitter could not parse the source")]
    ParseFailed,

    #[error("source has {} syntax error(s); refusing to migrate", errors.len())]
    SourceHasErrors {
        errors: Vec<validate::SyntaxError>,
    },

    #[error("migrated source has {} syntax error(s)", errors.len())]
    InvalidResult {
        errors: Vec<validate::SyntaxError>,
    },

    #[error("no class named '{name}' in this file")]
    ClassNotFound { name: String },

    #[error("edit conflict: {0}")]
    EditConflict(#[from] edit::EditConflict),
}

/// The tree-sitter Java grammar.
pub fn language() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

/// A parser configured for Java.
pub fn parser() -> Parser {
    let mut parser = Parser::new();
    parser
        .set_language(&language())
        .expect("tree-sitter-java grammar version mismatch");
    parser
}
