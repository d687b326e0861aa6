//! Parsing and post-edit validation.

use crate::parser;
use serde::Serialize;
use thiserror::Error;
use tree_sitter::{Node, Tree};

#[derive(Debug, Clone, Error, Serialize)]
pub enum ValidationError {
    #[error("tree-sitter returned no tree")]
    ParseFailed,
    #[error("source contains {count} syntax error(s)")]
    SyntaxErrors {
        count: usize,
        errors: Vec<SyntaxError>,
    },
}

/// Location of an ERROR or MISSING node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxError {
    /// 1-indexed.
    pub line: usize,
    /// 1-indexed.
    pub column: usize,
    /// Surrounding source, roughly 30 bytes either side.
    pub context: String,
    pub node_kind: String,
}

/// Parse without judging the result.
pub fn parse_best_effort(source: &str) -> Result<Tree, ValidationError> {
    parser()
        .parse(source, None)
        .ok_or(ValidationError::ParseFailed)
}

/// Parse and reject trees containing ERROR or MISSING nodes.
pub fn verify_parse(source: &str) -> Result<Tree, ValidationError> {
    let tree = parse_best_effort(source)?;
    let errors = syntax_errors(&tree, source);
    if errors.is_empty() {
        Ok(tree)
    } else {
        Err(ValidationError::SyntaxErrors {
            count: errors.len(),
            errors,
        })
    }
}

/// All ERROR and MISSING nodes, in document order.
pub fn syntax_errors(tree: &Tree, source: &str) -> Vec<SyntaxError> {
    let root = tree.root_node();
    let mut errors = Vec::new();
    if root.has_error() {
        collect_errors(&root, source, &mut errors);
    }
    errors
}

fn collect_errors(node: &Node, source: &str, errors: &mut Vec<SyntaxError>) {
    if node.is_error() || node.is_missing() {
        let start = node.start_position();
        let from = floor_char_boundary(source, node.start_byte().saturating_sub(30));
        let to = ceil_char_boundary(source, node.end_byte() + 30);
        errors.push(SyntaxError {
            line: start.row + 1,
            column: start.column + 1,
            context: source[from..to].to_string(),
            node_kind: node.kind().to_string(),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            collect_errors(&child, source, errors);
        }
    }
}

fn floor_char_boundary(s: &str, idx: usize) -> usize {
    let mut i = idx.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, idx: usize) -> usize {
    let mut i = idx.min(s.len());
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
