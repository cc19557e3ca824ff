//! The [`VersionStore`] trait: persistence seam for version history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filerev_core::types::{FileId, PageRequest, UserId, VersionId};
use filerev_core::AppResult;
use filerev_entity::file::File;
use filerev_entity::version::{Version, VersionDraft};

/// Result of appending a draft to a file's history.
#[derive(Debug, Clone)]
pub enum AppendOutcome {
    /// A new version record was written.
    Created(Version),
    /// The latest version already carries this content hash; nothing
    /// was written.
    Unchanged(VersionId),
}

impl AppendOutcome {
    /// The id of the version the append resolved to, new or existing.
    pub fn version_id(&self) -> VersionId {
        match self {
            Self::Created(version) => version.id,
            Self::Unchanged(id) => *id,
        }
    }
}

/// Result of an applied restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreOutcome {
    /// The version number that was restored.
    pub restored_version: i32,
    /// The file's version counter after the restore.
    pub new_file_version: i32,
    /// The version capturing the pre-restore state: a fresh backup
    /// record when the live content had drifted, otherwise the latest
    /// stored version that already held it. Restoring this id undoes
    /// the restore.
    pub backup_version_id: VersionId,
}

/// Persistence operations for files and their version history.
///
/// Tombstoned versions are invisible to every read operation here; only
/// version numbering and [`purge_tombstoned`](Self::purge_tombstoned)
/// still see them.
#[async_trait]
pub trait VersionStore: Send + Sync + 'static {
    /// Fetch a file by id.
    async fn find_file(&self, file_id: FileId) -> AppResult<File>;

    /// Fetch a version by id.
    async fn find_version(&self, version_id: VersionId) -> AppResult<Version>;

    /// Fetch a version of `file_id` by its sequence number.
    async fn find_version_by_number(&self, file_id: FileId, number: i32) -> AppResult<Version>;

    /// The latest (highest-numbered, non-tombstoned) version of a file,
    /// if any exist.
    async fn latest_version(&self, file_id: FileId) -> AppResult<Option<Version>>;

    /// A page of a file's versions, newest first, with the total count.
    async fn list_versions(
        &self,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<(Vec<Version>, u64)>;

    /// Append a draft to the file's history.
    ///
    /// Atomically assigns the next sequence number (one past the highest
    /// number ever used for the file, tombstoned records included) and
    /// re-checks the dedup guard: if the latest version's content hash
    /// equals the draft's, nothing is written.
    async fn append_version(&self, draft: VersionDraft) -> AppResult<AppendOutcome>;

    /// Set or clear the pin flag on a version.
    async fn set_pinned(&self, version_id: VersionId, pinned: bool) -> AppResult<Version>;

    /// Tombstone a version. Returns `true` if the version was newly
    /// tombstoned, `false` if it was already tombstoned. Pinned versions
    /// are rejected with a `VersionPinned` error.
    async fn tombstone(&self, version_id: VersionId, now: DateTime<Utc>) -> AppResult<bool>;

    /// Physically delete versions tombstoned at or before `cutoff`.
    /// Returns the number of records removed.
    async fn purge_tombstoned(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;

    /// Atomically restore `target`'s content onto its file:
    /// snapshot the live content as a pre-restore backup (the latest
    /// stored version stands in when it already matches), record the
    /// restore as a new version, and overwrite the file's content,
    /// size, and version counter. Either every step applies or none do.
    async fn apply_restore(
        &self,
        target: VersionId,
        author_id: UserId,
        author_name: &str,
    ) -> AppResult<RestoreOutcome>;
}
