//! Pinning, deletion, and retention of version records.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use filerev_core::config::HistoryConfig;
use filerev_core::error::AppError;
use filerev_core::result::AppResult;
use filerev_core::types::{FileId, VersionId};
use filerev_entity::version::VersionSummary;
use filerev_storage::VersionStore;

use crate::context::RequestContext;

/// Guards version deletion behind pins and a tombstone retention window.
#[derive(Clone)]
pub struct RetentionGuard {
    store: Arc<dyn VersionStore>,
    retention_days: i64,
}

impl RetentionGuard {
    /// Creates a new retention guard.
    pub fn new(store: Arc<dyn VersionStore>, config: &HistoryConfig) -> Self {
        Self {
            store,
            retention_days: i64::from(config.tombstone_retention_days),
        }
    }

    /// Pin or unpin a version. Pinned versions cannot be deleted.
    pub async fn set_pinned(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        version_id: VersionId,
        pinned: bool,
    ) -> AppResult<VersionSummary> {
        let version = self.store.find_version(version_id).await?;
        if version.file_id != file_id {
            return Err(AppError::version_mismatch(
                "Version does not belong to this file",
            ));
        }

        let version = self.store.set_pinned(version_id, pinned).await?;
        info!(
            actor_id = %ctx.actor_id,
            file_id = %file_id,
            version = version.version,
            pinned,
            "Version pin flag updated"
        );
        Ok(version.summary())
    }

    /// Tombstone a version, hiding it from history immediately.
    ///
    /// The record survives until the retention window elapses, then
    /// [`purge_expired`](Self::purge_expired) removes it for good. Its
    /// version number is never reused either way. Pinned versions are
    /// rejected with a `VersionPinned` error.
    pub async fn delete_version(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        version_id: VersionId,
    ) -> AppResult<()> {
        let version = self.store.find_version(version_id).await?;
        if version.file_id != file_id {
            return Err(AppError::version_mismatch(
                "Version does not belong to this file",
            ));
        }

        self.store.tombstone(version_id, ctx.request_time).await?;
        info!(
            actor_id = %ctx.actor_id,
            file_id = %file_id,
            version = version.version,
            "Version tombstoned"
        );
        Ok(())
    }

    /// Physically remove versions whose tombstone has outlived the
    /// retention window. Intended to run from a periodic job.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let cutoff = now - Duration::days(self.retention_days);
        let purged = self.store.purge_tombstoned(cutoff).await?;
        if purged > 0 {
            info!(purged, "Purged expired version tombstones");
        }
        Ok(purged)
    }
}
