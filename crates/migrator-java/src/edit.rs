//! Byte-range text edits.
//!
//! Every edit addresses the text it was computed against. Edits are
//! validated as a set (sorted, in bounds, non-overlapping) and applied back
//! to front so earlier offsets stay valid.

use migrator_core::SourceSpan;
use serde::Serialize;
use thiserror::Error;

/// Replace bytes `[start..end)` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
    /// Human-readable label for reports.
    pub label: String,
}

impl TextEdit {
    pub fn replace(span: SourceSpan, replacement: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            start: span.start,
            end: span.end,
            replacement: replacement.into(),
            label: label.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            replacement: text.into(),
            label: label.into(),
        }
    }

    pub fn delete(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: String::new(),
            label: label.into(),
        }
    }

    fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Error, Serialize)]
pub enum EditConflict {
    #[error("edits overlap: '{first}' [{first_start}..{first_end}) and '{second}' [{second_start}..{second_end})")]
    Overlapping {
        first: String,
        first_start: usize,
        first_end: usize,
        second: String,
        second_start: usize,
        second_end: usize,
    },
    #[error("edit '{label}' range [{start}..{end}) is outside the {len}-byte source")]
    OutOfBounds {
        label: String,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("edit '{label}' splits a UTF-8 character at byte {offset}")]
    NotCharBoundary { label: String, offset: usize },
}

/// A validated set of edits for one source string, sorted by start offset.
#[derive(Debug, Clone, Default)]
pub struct EditSet {
    edits: Vec<TextEdit>,
}

impl EditSet {
    pub fn new(mut edits: Vec<TextEdit>, source: &str) -> Result<Self, EditConflict> {
        // Stable sort keeps insertions at the same offset in caller order.
        edits.sort_by_key(|edit| (edit.start, edit.end));

        for edit in &edits {
            if edit.start > edit.end || edit.end > source.len() {
                return Err(EditConflict::OutOfBounds {
                    label: edit.label.clone(),
                    start: edit.start,
                    end: edit.end,
                    len: source.len(),
                });
            }
            for offset in [edit.start, edit.end] {
                if !source.is_char_boundary(offset) {
                    return Err(EditConflict::NotCharBoundary {
                        label: edit.label.clone(),
                        offset,
                    });
                }
            }
        }

        for pair in edits.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.is_insertion() && b.is_insertion() && a.start == b.start {
                continue;
            }
            if a.end > b.start {
                return Err(EditConflict::Overlapping {
                    first: a.label.clone(),
                    first_start: a.start,
                    first_end: a.end,
                    second: b.label.clone(),
                    second_start: b.start,
                    second_end: b.end,
                });
            }
        }

        Ok(Self { edits })
    }

    /// Apply to `source`, which must be the text the edits were computed on.
    pub fn apply(&self, source: &str) -> String {
        let mut result = source.to_string();
        for edit in self.edits.iter().rev() {
            result.replace_range(edit.start..edit.end, &edit.replacement);
        }
        result
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextEdit> {
        self.edits.iter()
    }
}

/// 1-indexed line and column of a byte offset.
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.len() - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
    (line, column)
}
