//! Edit-script line types.

use serde::{Deserialize, Serialize};

/// The role a single line plays in an edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Unchanged line, present on both sides.
    Context,
    /// Line present only in the new text.
    Add,
    /// Line present only in the old text.
    Remove,
}

/// A single line of an edit script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// Whether this line is context, an addition, or a removal.
    #[serde(rename = "type")]
    pub kind: LineKind,
    /// The line's text, without a trailing newline.
    pub content: String,
    /// 1-based line number in the old text. `None` for additions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line: Option<usize>,
    /// 1-based line number in the new text. `None` for removals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line: Option<usize>,
}

impl DiffLine {
    /// A context line at the given old/new positions.
    pub fn context(content: impl Into<String>, old_line: usize, new_line: usize) -> Self {
        Self {
            kind: LineKind::Context,
            content: content.into(),
            old_line: Some(old_line),
            new_line: Some(new_line),
        }
    }

    /// An added line at the given new position.
    pub fn add(content: impl Into<String>, new_line: usize) -> Self {
        Self {
            kind: LineKind::Add,
            content: content.into(),
            old_line: None,
            new_line: Some(new_line),
        }
    }

    /// A removed line at the given old position.
    pub fn remove(content: impl Into<String>, old_line: usize) -> Self {
        Self {
            kind: LineKind::Remove,
            content: content.into(),
            old_line: Some(old_line),
            new_line: None,
        }
    }
}
