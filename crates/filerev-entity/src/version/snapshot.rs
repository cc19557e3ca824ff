//! Building version drafts from live file state.
//!
//! A [`VersionDraft`] captures everything about a new version except its
//! sequence number, which is assigned atomically by the store when the
//! draft is appended.

use sha2::{Digest, Sha256};

use filerev_core::types::{FileId, ProjectId, UserId};
use filerev_diff::line_delta;

use super::change::ChangeType;
use super::model::Version;
use crate::file::File;

/// A version record waiting for its sequence number.
#[derive(Debug, Clone)]
pub struct VersionDraft {
    pub file_id: FileId,
    pub project_id: ProjectId,
    pub content_hash: String,
    pub content: String,
    pub size_bytes: i64,
    pub line_count: i32,
    pub change_type: ChangeType,
    pub change_summary: String,
    pub lines_added: i32,
    pub lines_removed: i32,
    pub author_id: UserId,
    pub author_name: String,
    pub file_path: String,
    pub file_name: String,
}

impl VersionDraft {
    /// Snapshot the live content of `file` as a new draft.
    ///
    /// `previous` is the latest stored version, used to compute the
    /// added/removed line delta; for a file's first version every line
    /// counts as added.
    pub fn snapshot(
        file: &File,
        previous: Option<&Version>,
        author_id: UserId,
        author_name: impl Into<String>,
        change_type: ChangeType,
        change_summary: impl Into<String>,
    ) -> Self {
        let line_count = count_lines(&file.content);
        let (lines_added, lines_removed) = match previous {
            Some(prev) => line_delta(&prev.content, &file.content),
            None => (line_count as usize, 0),
        };
        Self {
            file_id: file.id,
            project_id: file.project_id,
            content_hash: content_hash(&file.content),
            content: file.content.clone(),
            size_bytes: file.content.len() as i64,
            line_count,
            change_type,
            change_summary: change_summary.into(),
            lines_added: lines_added as i32,
            lines_removed: lines_removed as i32,
            author_id,
            author_name: author_name.into(),
            file_path: file.path.clone(),
            file_name: file.name.clone(),
        }
    }

    /// Draft recording the outcome of restoring `target`'s content onto
    /// `file`. The snapshot carries the target's content but the file's
    /// current name and path.
    pub fn restore_of(
        target: &Version,
        file: &File,
        previous: Option<&Version>,
        author_id: UserId,
        author_name: impl Into<String>,
    ) -> Self {
        let line_count = count_lines(&target.content);
        let (lines_added, lines_removed) = match previous {
            Some(prev) => line_delta(&prev.content, &target.content),
            None => (line_count as usize, 0),
        };
        Self {
            file_id: file.id,
            project_id: file.project_id,
            content_hash: content_hash(&target.content),
            content: target.content.clone(),
            size_bytes: target.content.len() as i64,
            line_count,
            change_type: ChangeType::Restore,
            change_summary: format!("Restored from version {}", target.version),
            lines_added: lines_added as i32,
            lines_removed: lines_removed as i32,
            author_id,
            author_name: author_name.into(),
            file_path: file.path.clone(),
            file_name: file.name.clone(),
        }
    }
}

/// SHA-256 fingerprint of `content`, lowercase hex.
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Line count of `content`: 0 when empty, otherwise newlines + 1.
pub fn count_lines(content: &str) -> i32 {
    if content.is_empty() {
        0
    } else {
        content.bytes().filter(|b| *b == b'\n').count() as i32 + 1
    }
}
