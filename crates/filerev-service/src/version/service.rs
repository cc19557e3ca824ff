//! Version snapshot and lookup service.

use std::sync::Arc;

use tracing::info;

use filerev_core::error::AppError;
use filerev_core::result::AppResult;
use filerev_core::types::{FileId, PageRequest, PageResponse, VersionId};
use filerev_entity::file::File;
use filerev_entity::version::{
    content_hash, ChangeType, VersionContent, VersionDraft, VersionSummary,
};
use filerev_storage::{AppendOutcome, VersionStore};

use crate::context::RequestContext;

/// Manages version snapshots: creation with content deduplication,
/// listings, and content retrieval.
#[derive(Clone)]
pub struct VersionService {
    store: Arc<dyn VersionStore>,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }

    /// Snapshot the file's current content as a new version.
    ///
    /// Idempotent: when the content hash matches the latest stored
    /// version, no new record is written and the existing version's id
    /// is returned. The store re-checks the guard under its own lock,
    /// so concurrent identical snapshots also collapse to one record.
    pub async fn create_version(
        &self,
        ctx: &RequestContext,
        file: &File,
        change_type: ChangeType,
        summary: impl Into<String>,
    ) -> AppResult<VersionId> {
        let latest = self.store.latest_version(file.id).await?;
        if let Some(latest) = &latest {
            if latest.content_hash == content_hash(&file.content) {
                return Ok(latest.id);
            }
        }

        let draft = VersionDraft::snapshot(
            file,
            latest.as_ref(),
            ctx.actor_id,
            &ctx.actor_name,
            change_type,
            summary,
        );
        let outcome = self.store.append_version(draft).await?;
        if let AppendOutcome::Created(version) = &outcome {
            info!(
                actor_id = %ctx.actor_id,
                file_id = %file.id,
                version = version.version,
                change_type = %version.change_type,
                "Version created"
            );
        }
        Ok(outcome.version_id())
    }

    /// List a file's versions, newest first.
    pub async fn list_versions(
        &self,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<VersionSummary>> {
        self.store.find_file(file_id).await?;
        let (versions, total) = self.store.list_versions(file_id, page).await?;
        Ok(PageResponse::new(versions, page.page, page.page_size, total).map(|v| v.summary()))
    }

    /// Fetch a single version's metadata.
    pub async fn get_version(
        &self,
        file_id: FileId,
        version_id: VersionId,
    ) -> AppResult<VersionSummary> {
        let version = self.store.find_version(version_id).await?;
        if version.file_id != file_id {
            return Err(AppError::version_mismatch(
                "Version does not belong to this file",
            ));
        }
        Ok(version.summary())
    }

    /// Fetch a version's full content.
    pub async fn get_version_content(
        &self,
        file_id: FileId,
        version_id: VersionId,
    ) -> AppResult<VersionContent> {
        let version = self.store.find_version(version_id).await?;
        if version.file_id != file_id {
            return Err(AppError::version_mismatch(
                "Version does not belong to this file",
            ));
        }
        Ok(version.content_view())
    }
}
