//! Restore coordination.

use std::sync::Arc;

use tracing::info;

use filerev_core::error::AppError;
use filerev_core::result::AppResult;
use filerev_core::types::{FileId, VersionId};
use filerev_storage::{RestoreOutcome, VersionStore};

use crate::context::RequestContext;

/// Validates and applies restores of historical versions.
#[derive(Clone)]
pub struct RestoreCoordinator {
    store: Arc<dyn VersionStore>,
}

impl RestoreCoordinator {
    /// Creates a new restore coordinator.
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }

    /// Restore a file's content to the given version.
    ///
    /// The store applies the whole protocol atomically: the live content
    /// is first snapshotted as a pre-restore backup (the latest version
    /// stands in when it already captures it), then the restore is
    /// recorded as a new version, and only then is the file overwritten.
    /// A failure at any point leaves the file and its history untouched.
    ///
    /// Restoring the outcome's `backup_version_id` undoes the restore.
    pub async fn restore_version(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        version_id: VersionId,
    ) -> AppResult<RestoreOutcome> {
        let target = self.store.find_version(version_id).await?;
        if target.file_id != file_id {
            return Err(AppError::version_mismatch(
                "Version does not belong to this file",
            ));
        }

        let outcome = self
            .store
            .apply_restore(target.id, ctx.actor_id, &ctx.actor_name)
            .await?;

        info!(
            actor_id = %ctx.actor_id,
            file_id = %file_id,
            restored_version = outcome.restored_version,
            new_file_version = outcome.new_file_version,
            backup_version = %outcome.backup_version_id,
            "Version restored"
        );
        Ok(outcome)
    }

    /// Resolve a version number (what history listings show) to its
    /// record and restore it.
    pub async fn restore_version_number(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        version_number: i32,
    ) -> AppResult<RestoreOutcome> {
        if version_number < 1 {
            return Err(AppError::validation("Version number must be positive"));
        }
        let target = self
            .store
            .find_version_by_number(file_id, version_number)
            .await?;
        self.restore_version(ctx, file_id, target.id).await
    }
}
