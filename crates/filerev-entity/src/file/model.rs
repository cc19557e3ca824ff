//! File entity model.
//!
//! The live `File` row is owned by the surrounding file-management
//! subsystem; this core consumes it (for snapshots and live diffs) and
//! writes it back only during a restore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use filerev_core::types::{FileId, ProjectId, UserId};

/// A text file in the project store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// The project containing this file.
    pub project_id: ProjectId,
    /// The project owner.
    pub owner_id: UserId,
    /// The file name (including extension).
    pub name: String,
    /// Path of the file within the project.
    pub path: String,
    /// Current live content.
    pub content: String,
    /// Size of `content` in bytes.
    pub size_bytes: i64,
    /// Version counter, incremented on every content-changing update.
    /// Stays in lockstep with the version store's max version number.
    pub version: i32,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}
