//! Immutable version records and their read views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use filerev_core::types::{FileId, ProjectId, UserId, VersionId};

use super::change::ChangeType;
use super::snapshot::VersionDraft;

/// A historical version of a file: a full-content snapshot plus metadata.
///
/// Immutable once created, except for the `is_pinned` flag and the
/// `tombstoned_at` soft-delete marker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Version {
    /// Unique version identifier.
    pub id: VersionId,
    /// The file this version belongs to.
    pub file_id: FileId,
    /// The project the file belonged to at creation time.
    pub project_id: ProjectId,
    /// Sequential version number, starting at 1 per file.
    pub version: i32,
    /// SHA-256 hex fingerprint of `content`, used for deduplication.
    pub content_hash: String,
    /// Full text snapshot, stored verbatim.
    pub content: String,
    /// Size of `content` in bytes.
    pub size_bytes: i64,
    /// Number of lines in `content` (0 for empty content).
    pub line_count: i32,
    /// Why this version was recorded.
    pub change_type: ChangeType,
    /// Free-text note describing the change.
    pub change_summary: String,
    /// Lines added relative to the previous version (multiset count).
    pub lines_added: i32,
    /// Lines removed relative to the previous version (multiset count).
    pub lines_removed: i32,
    /// User who created this version.
    pub author_id: UserId,
    /// Author display name at creation time.
    pub author_name: String,
    /// File path at creation time; history survives renames.
    pub file_path: String,
    /// File name at creation time.
    pub file_name: String,
    /// When true, the version cannot be deleted.
    pub is_pinned: bool,
    /// Soft-delete marker; tombstoned versions are hidden from queries
    /// and physically removed after the retention window.
    pub tombstoned_at: Option<DateTime<Utc>>,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}

impl Version {
    /// Materialize a draft into a full record with the assigned number.
    pub fn from_draft(draft: VersionDraft, number: i32) -> Self {
        Self {
            id: VersionId::new(),
            file_id: draft.file_id,
            project_id: draft.project_id,
            version: number,
            content_hash: draft.content_hash,
            content: draft.content,
            size_bytes: draft.size_bytes,
            line_count: draft.line_count,
            change_type: draft.change_type,
            change_summary: draft.change_summary,
            lines_added: draft.lines_added,
            lines_removed: draft.lines_removed,
            author_id: draft.author_id,
            author_name: draft.author_name,
            file_path: draft.file_path,
            file_name: draft.file_name,
            is_pinned: false,
            tombstoned_at: None,
            created_at: Utc::now(),
        }
    }

    /// Lightweight view for listings and metadata lookups; excludes content.
    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            id: self.id,
            version: self.version,
            created_at: self.created_at,
            author_id: self.author_id,
            author_name: self.author_name.clone(),
            change_type: self.change_type,
            change_summary: self.change_summary.clone(),
            lines_added: self.lines_added,
            lines_removed: self.lines_removed,
            size_bytes: self.size_bytes,
            is_pinned: self.is_pinned,
        }
    }

    /// Full-content view with derived stats.
    pub fn content_view(&self) -> VersionContent {
        VersionContent {
            version_id: self.id,
            version: self.version,
            content: self.content.clone(),
            file_name: self.file_name.clone(),
            file_path: self.file_path.clone(),
            size_bytes: self.size_bytes,
            line_count: self.line_count,
        }
    }
}

/// A lightweight version representation for lists and metadata endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionSummary {
    /// Version identifier.
    pub id: VersionId,
    /// Sequential version number.
    pub version: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Author identifier.
    pub author_id: UserId,
    /// Author display name.
    pub author_name: String,
    /// Why the version was recorded.
    pub change_type: ChangeType,
    /// Free-text change note.
    pub change_summary: String,
    /// Multiset lines-added count.
    pub lines_added: i32,
    /// Multiset lines-removed count.
    pub lines_removed: i32,
    /// Snapshot size in bytes.
    pub size_bytes: i64,
    /// Whether the version is protected from deletion.
    pub is_pinned: bool,
}

/// Full content of a version plus its derived stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionContent {
    /// Version identifier.
    pub version_id: VersionId,
    /// Sequential version number.
    pub version: i32,
    /// The full text snapshot.
    pub content: String,
    /// File name at creation time.
    pub file_name: String,
    /// File path at creation time.
    pub file_path: String,
    /// Snapshot size in bytes.
    pub size_bytes: i64,
    /// Number of lines in the snapshot.
    pub line_count: i32,
}
