//! In-memory [`VersionStore`] backend.
//!
//! Backed by a single `RwLock`, so every compound operation is trivially
//! atomic. Used by the service test suites and useful for embedding.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use filerev_core::types::{FileId, PageRequest, UserId, VersionId};
use filerev_core::{AppError, AppResult};
use filerev_entity::file::File;
use filerev_entity::version::snapshot::content_hash;
use filerev_entity::version::{ChangeType, Version, VersionDraft};

use crate::store::{AppendOutcome, RestoreOutcome, VersionStore};

#[derive(Debug, Default)]
struct Inner {
    files: HashMap<FileId, File>,
    versions: HashMap<VersionId, Version>,
}

impl Inner {
    /// Highest version number ever used for a file, tombstoned records
    /// included. Numbers are never reused.
    fn max_number(&self, file_id: FileId) -> i32 {
        self.versions
            .values()
            .filter(|v| v.file_id == file_id)
            .map(|v| v.version)
            .max()
            .unwrap_or(0)
    }

    fn latest(&self, file_id: FileId) -> Option<&Version> {
        self.versions
            .values()
            .filter(|v| v.file_id == file_id && v.tombstoned_at.is_none())
            .max_by_key(|v| v.version)
    }

    fn append(&mut self, draft: VersionDraft) -> AppendOutcome {
        if let Some(latest) = self.latest(draft.file_id) {
            if latest.content_hash == draft.content_hash {
                return AppendOutcome::Unchanged(latest.id);
            }
        }
        let number = self.max_number(draft.file_id) + 1;
        let version = Version::from_draft(draft, number);
        // Keep the file's counter in lockstep with the history.
        if let Some(file) = self.files.get_mut(&version.file_id) {
            file.version = number;
            file.updated_at = version.created_at;
        }
        self.versions.insert(version.id, version.clone());
        AppendOutcome::Created(version)
    }
}

/// A process-local version store.
#[derive(Debug, Default)]
pub struct MemoryVersionStore {
    inner: RwLock<Inner>,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file row.
    pub async fn put_file(&self, file: File) {
        self.inner.write().await.files.insert(file.id, file);
    }

    /// Fetch the current file row, for test assertions.
    pub async fn file(&self, file_id: FileId) -> Option<File> {
        self.inner.read().await.files.get(&file_id).cloned()
    }
}

#[async_trait]
impl VersionStore for MemoryVersionStore {
    async fn find_file(&self, file_id: FileId) -> AppResult<File> {
        self.inner
            .read()
            .await
            .files
            .get(&file_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    async fn find_version(&self, version_id: VersionId) -> AppResult<Version> {
        self.inner
            .read()
            .await
            .versions
            .get(&version_id)
            .filter(|v| v.tombstoned_at.is_none())
            .cloned()
            .ok_or_else(|| AppError::not_found("Version not found"))
    }

    async fn find_version_by_number(&self, file_id: FileId, number: i32) -> AppResult<Version> {
        self.inner
            .read()
            .await
            .versions
            .values()
            .find(|v| {
                v.file_id == file_id && v.version == number && v.tombstoned_at.is_none()
            })
            .cloned()
            .ok_or_else(|| AppError::not_found("Version not found"))
    }

    async fn latest_version(&self, file_id: FileId) -> AppResult<Option<Version>> {
        Ok(self.inner.read().await.latest(file_id).cloned())
    }

    async fn list_versions(
        &self,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<(Vec<Version>, u64)> {
        let inner = self.inner.read().await;
        let mut versions: Vec<Version> = inner
            .versions
            .values()
            .filter(|v| v.file_id == file_id && v.tombstoned_at.is_none())
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        let total = versions.len() as u64;
        let items = versions
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn append_version(&self, draft: VersionDraft) -> AppResult<AppendOutcome> {
        Ok(self.inner.write().await.append(draft))
    }

    async fn set_pinned(&self, version_id: VersionId, pinned: bool) -> AppResult<Version> {
        let mut inner = self.inner.write().await;
        let version = inner
            .versions
            .get_mut(&version_id)
            .filter(|v| v.tombstoned_at.is_none())
            .ok_or_else(|| AppError::not_found("Version not found"))?;
        version.is_pinned = pinned;
        Ok(version.clone())
    }

    async fn tombstone(&self, version_id: VersionId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let version = inner
            .versions
            .get_mut(&version_id)
            .ok_or_else(|| AppError::not_found("Version not found"))?;
        if version.is_pinned {
            return Err(AppError::version_pinned(
                "Cannot delete a pinned version; unpin it first",
            ));
        }
        if version.tombstoned_at.is_some() {
            return Ok(false);
        }
        version.tombstoned_at = Some(now);
        Ok(true)
    }

    async fn purge_tombstoned(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.versions.len();
        inner
            .versions
            .retain(|_, v| !matches!(v.tombstoned_at, Some(at) if at <= cutoff));
        Ok((before - inner.versions.len()) as u64)
    }

    async fn apply_restore(
        &self,
        target: VersionId,
        author_id: UserId,
        author_name: &str,
    ) -> AppResult<RestoreOutcome> {
        let mut inner = self.inner.write().await;
        let target = inner
            .versions
            .get(&target)
            .filter(|v| v.tombstoned_at.is_none())
            .cloned()
            .ok_or_else(|| AppError::not_found("Version not found"))?;
        let file = inner
            .files
            .get(&target.file_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("File not found"))?;
        let latest = inner.latest(file.id).cloned();

        // Step 1: snapshot the live content. When the latest stored
        // version already captures it, that record serves as the backup.
        let live_hash = content_hash(&file.content);
        let backup_version_id = match &latest {
            Some(latest) if latest.content_hash == live_hash => latest.id,
            previous => {
                let draft = VersionDraft::snapshot(
                    &file,
                    previous.as_ref(),
                    author_id,
                    author_name,
                    ChangeType::PreRestore,
                    format!("State before restore to version {}", target.version),
                );
                inner.append(draft).version_id()
            }
        };

        // Step 2: record the restore itself.
        let previous = inner.latest(file.id).cloned();
        let draft =
            VersionDraft::restore_of(&target, &file, previous.as_ref(), author_id, author_name);
        let restored = match inner.append(draft) {
            AppendOutcome::Created(version) => version,
            AppendOutcome::Unchanged(_) => {
                // Restoring onto identical content still records the act.
                let number = inner.max_number(file.id) + 1;
                let draft = VersionDraft::restore_of(
                    &target,
                    &file,
                    previous.as_ref(),
                    author_id,
                    author_name,
                );
                let version = Version::from_draft(draft, number);
                inner.versions.insert(version.id, version.clone());
                version
            }
        };

        // Step 3: overwrite the live file.
        let new_file_version = restored.version;
        if let Some(file) = inner.files.get_mut(&target.file_id) {
            file.content = target.content.clone();
            file.size_bytes = target.content.len() as i64;
            file.version = new_file_version;
            file.updated_at = restored.created_at;
        }

        Ok(RestoreOutcome {
            restored_version: target.version,
            new_file_version,
            backup_version_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use filerev_core::types::ProjectId;

    use super::*;

    fn sample_file(content: &str) -> File {
        File {
            id: FileId::new(),
            project_id: ProjectId::new(),
            owner_id: UserId::new(),
            name: "notes.md".to_string(),
            path: "docs/notes.md".to_string(),
            content: content.to_string(),
            size_bytes: content.len() as i64,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn draft_for(file: &File, previous: Option<&Version>, summary: &str) -> VersionDraft {
        VersionDraft::snapshot(
            file,
            previous,
            file.owner_id,
            "alice",
            ChangeType::Edit,
            summary,
        )
    }

    #[tokio::test]
    async fn test_append_assigns_sequential_numbers() {
        let store = MemoryVersionStore::new();
        let mut file = sample_file("one");
        store.put_file(file.clone()).await;

        let first = store
            .append_version(draft_for(&file, None, "init"))
            .await
            .expect("append");
        let AppendOutcome::Created(first) = first else {
            panic!("expected a new version");
        };
        assert_eq!(first.version, 1);

        file.content = "two".to_string();
        let second = store
            .append_version(draft_for(&file, Some(&first), "edit"))
            .await
            .expect("append");
        let AppendOutcome::Created(second) = second else {
            panic!("expected a new version");
        };
        assert_eq!(second.version, 2);
        assert_eq!(store.file(file.id).await.map(|f| f.version), Some(2));
    }

    #[tokio::test]
    async fn test_append_dedups_against_latest() {
        let store = MemoryVersionStore::new();
        let file = sample_file("same");
        store.put_file(file.clone()).await;

        let first = store
            .append_version(draft_for(&file, None, "init"))
            .await
            .expect("append");
        let outcome = store
            .append_version(draft_for(&file, None, "again"))
            .await
            .expect("append");
        assert!(matches!(outcome, AppendOutcome::Unchanged(id) if id == first.version_id()));
    }

    #[tokio::test]
    async fn test_numbering_skips_tombstoned_records() {
        let store = MemoryVersionStore::new();
        let mut file = sample_file("one");
        store.put_file(file.clone()).await;

        store
            .append_version(draft_for(&file, None, "init"))
            .await
            .expect("append");
        file.content = "two".to_string();
        let AppendOutcome::Created(second) = store
            .append_version(draft_for(&file, None, "edit"))
            .await
            .expect("append")
        else {
            panic!("expected a new version");
        };
        store
            .tombstone(second.id, Utc::now())
            .await
            .expect("tombstone");

        // The tombstoned record still owns number 2.
        file.content = "three".to_string();
        let AppendOutcome::Created(third) = store
            .append_version(draft_for(&file, None, "edit"))
            .await
            .expect("append")
        else {
            panic!("expected a new version");
        };
        assert_eq!(third.version, 3);
    }

    #[tokio::test]
    async fn test_tombstone_rejects_pinned_versions() {
        let store = MemoryVersionStore::new();
        let file = sample_file("keep me");
        store.put_file(file.clone()).await;
        let outcome = store
            .append_version(draft_for(&file, None, "init"))
            .await
            .expect("append");
        let id = outcome.version_id();

        store.set_pinned(id, true).await.expect("pin");
        let err = store.tombstone(id, Utc::now()).await.expect_err("pinned");
        assert_eq!(err.kind, filerev_core::ErrorKind::VersionPinned);

        store.set_pinned(id, false).await.expect("unpin");
        assert!(store.tombstone(id, Utc::now()).await.expect("tombstone"));
        assert!(!store.tombstone(id, Utc::now()).await.expect("idempotent"));
    }

    #[tokio::test]
    async fn test_purge_respects_cutoff() {
        let store = MemoryVersionStore::new();
        let mut file = sample_file("one");
        store.put_file(file.clone()).await;
        let first = store
            .append_version(draft_for(&file, None, "init"))
            .await
            .expect("append")
            .version_id();
        file.content = "two".to_string();
        let second = store
            .append_version(draft_for(&file, None, "edit"))
            .await
            .expect("append")
            .version_id();

        let old = Utc::now() - Duration::days(40);
        store.tombstone(first, old).await.expect("tombstone");
        store.tombstone(second, Utc::now()).await.expect("tombstone");

        let cutoff = Utc::now() - Duration::days(30);
        let purged = store.purge_tombstoned(cutoff).await.expect("purge");
        assert_eq!(purged, 1);
        // The recently tombstoned record survives, still hidden.
        let err = store.find_version(second).await.expect_err("hidden");
        assert_eq!(err.kind, filerev_core::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_restore_backs_up_dirty_live_content() {
        let store = MemoryVersionStore::new();
        let mut file = sample_file("v1 content");
        store.put_file(file.clone()).await;
        let first = store
            .append_version(draft_for(&file, None, "init"))
            .await
            .expect("append")
            .version_id();

        // Live content drifts without a snapshot.
        file.content = "unsaved work".to_string();
        store.put_file(file.clone()).await;

        let outcome = store
            .apply_restore(first, file.owner_id, "alice")
            .await
            .expect("restore");
        assert_eq!(outcome.restored_version, 1);
        assert_eq!(outcome.new_file_version, 3);
        let backup = store
            .find_version(outcome.backup_version_id)
            .await
            .expect("backup");
        assert_eq!(backup.version, 2);
        assert_eq!(backup.content, "unsaved work");
        assert_eq!(backup.change_type, ChangeType::PreRestore);
        assert_eq!(backup.change_summary, "State before restore to version 1");

        let live = store.file(file.id).await.expect("file");
        assert_eq!(live.content, "v1 content");
        assert_eq!(live.version, 3);
    }

    #[tokio::test]
    async fn test_restore_reuses_latest_version_as_backup() {
        let store = MemoryVersionStore::new();
        let mut file = sample_file("v1 content");
        store.put_file(file.clone()).await;
        let first = store
            .append_version(draft_for(&file, None, "init"))
            .await
            .expect("append")
            .version_id();
        file.content = "v2 content".to_string();
        store.put_file(file.clone()).await;
        let second = store
            .append_version(draft_for(&file, None, "edit"))
            .await
            .expect("append")
            .version_id();

        let outcome = store
            .apply_restore(first, file.owner_id, "alice")
            .await
            .expect("restore");
        // The latest version already captures the live content, so it
        // doubles as the backup.
        assert_eq!(outcome.backup_version_id, second);
        assert_eq!(outcome.new_file_version, 3);
        let restored = store
            .find_version_by_number(file.id, 3)
            .await
            .expect("restore record");
        assert_eq!(restored.change_type, ChangeType::Restore);
        assert_eq!(restored.change_summary, "Restored from version 1");
        assert_eq!(restored.content, "v1 content");
    }
}
