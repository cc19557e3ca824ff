//! Line diff service over stored versions and live content.

use std::sync::Arc;

use serde::Serialize;

use filerev_core::config::HistoryConfig;
use filerev_core::error::AppError;
use filerev_core::result::AppResult;
use filerev_core::types::{FileId, VersionId};
use filerev_diff::{diff_report, DiffReport};
use filerev_storage::VersionStore;

/// A computed diff between two points of a file's history.
#[derive(Debug, Clone, Serialize)]
pub struct DiffResponse {
    /// Version number of the old side.
    pub old_version: i32,
    /// Version number of the new side. For live diffs this is the
    /// file's current version counter.
    pub new_version: i32,
    /// Hunks and line totals.
    #[serde(flatten)]
    pub report: DiffReport,
}

/// Computes line diffs between versions, or between a version and the
/// live file content.
#[derive(Clone)]
pub struct DiffService {
    store: Arc<dyn VersionStore>,
    context_lines: usize,
}

impl DiffService {
    /// Creates a new diff service.
    pub fn new(store: Arc<dyn VersionStore>, config: &HistoryConfig) -> Self {
        Self {
            store,
            context_lines: config.context_lines,
        }
    }

    /// Diff two stored versions of the same file.
    pub async fn diff_versions(
        &self,
        file_id: FileId,
        old_id: VersionId,
        new_id: VersionId,
    ) -> AppResult<DiffResponse> {
        let old = self.store.find_version(old_id).await?;
        let new = self.store.find_version(new_id).await?;
        if old.file_id != file_id || new.file_id != file_id {
            return Err(AppError::version_mismatch(
                "Version does not belong to this file",
            ));
        }

        let report = diff_report(&old.content, &new.content, self.context_lines);
        Ok(DiffResponse {
            old_version: old.version,
            new_version: new.version,
            report,
        })
    }

    /// Diff a stored version against the file's live content.
    ///
    /// With `version = None` the latest stored version is used.
    pub async fn diff_against_live(
        &self,
        file_id: FileId,
        version: Option<i32>,
    ) -> AppResult<DiffResponse> {
        let file = self.store.find_file(file_id).await?;
        let old = match version {
            Some(number) if number < 1 => {
                return Err(AppError::validation("Version number must be positive"));
            }
            Some(number) => self.store.find_version_by_number(file_id, number).await?,
            None => self
                .store
                .latest_version(file_id)
                .await?
                .ok_or_else(|| AppError::not_found("File has no versions"))?,
        };

        let report = diff_report(&old.content, &file.content, self.context_lines);
        Ok(DiffResponse {
            old_version: old.version,
            new_version: file.version,
            report,
        })
    }
}
