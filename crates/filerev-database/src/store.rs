//! PostgreSQL implementation of the version store.
//!
//! Compound operations run inside a transaction and serialize per-file
//! writers with a `SELECT ... FOR UPDATE` on the file row, so version
//! numbers are assigned without gaps or duplicates even under
//! concurrent writers. The `UNIQUE (file_id, version)` constraint
//! backstops the lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use filerev_core::error::{AppError, ErrorKind};
use filerev_core::result::AppResult;
use filerev_core::types::{FileId, PageRequest, UserId, VersionId};
use filerev_entity::file::File;
use filerev_entity::version::{content_hash, ChangeType, Version, VersionDraft};
use filerev_storage::{AppendOutcome, RestoreOutcome, VersionStore};

/// Version store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgVersionStore {
    pool: PgPool,
}

impl PgVersionStore {
    /// Create a new store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the file row with a row lock, serializing writers per file.
    async fn lock_file(
        tx: &mut Transaction<'_, Postgres>,
        file_id: FileId,
    ) -> AppResult<File> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1 FOR UPDATE")
            .bind(file_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock file", e))?
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    async fn latest_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        file_id: FileId,
    ) -> AppResult<Option<Version>> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE file_id = $1 AND tombstoned_at IS NULL \
             ORDER BY version DESC LIMIT 1",
        )
        .bind(file_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load latest version", e)
        })
    }

    /// Highest version number ever used, tombstoned records included.
    async fn max_number_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        file_id: FileId,
    ) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(version), 0) FROM file_versions WHERE file_id = $1",
        )
        .bind(file_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to read version counter", e)
        })
    }

    async fn insert_version(
        tx: &mut Transaction<'_, Postgres>,
        version: &Version,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO file_versions \
             (id, file_id, project_id, version, content_hash, content, size_bytes, line_count, \
              change_type, change_summary, lines_added, lines_removed, author_id, author_name, \
              file_path, file_name, is_pinned, tombstoned_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
        )
        .bind(version.id)
        .bind(version.file_id)
        .bind(version.project_id)
        .bind(version.version)
        .bind(&version.content_hash)
        .bind(&version.content)
        .bind(version.size_bytes)
        .bind(version.line_count)
        .bind(version.change_type)
        .bind(&version.change_summary)
        .bind(version.lines_added)
        .bind(version.lines_removed)
        .bind(version.author_id)
        .bind(&version.author_name)
        .bind(&version.file_path)
        .bind(&version.file_name)
        .bind(version.is_pinned)
        .bind(version.tombstoned_at)
        .bind(version.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("file_versions_file_id_version_key") =>
            {
                AppError::conflict(format!(
                    "Version {} already exists for this file",
                    version.version
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert version", e),
        })?;
        Ok(())
    }

    /// Keep the file's counter in lockstep with the history.
    async fn sync_file_counter(
        tx: &mut Transaction<'_, Postgres>,
        file_id: FileId,
        version: i32,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE files SET version = $2, updated_at = $3 WHERE id = $1")
            .bind(file_id)
            .bind(version)
            .bind(at)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update file counter", e)
            })?;
        Ok(())
    }
}

#[async_trait]
impl VersionStore for PgVersionStore {
    async fn find_file(&self, file_id: FileId) -> AppResult<File> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))?
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    async fn find_version(&self, version_id: VersionId) -> AppResult<Version> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE id = $1 AND tombstoned_at IS NULL",
        )
        .bind(version_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))?
        .ok_or_else(|| AppError::not_found("Version not found"))
    }

    async fn find_version_by_number(&self, file_id: FileId, number: i32) -> AppResult<Version> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions \
             WHERE file_id = $1 AND version = $2 AND tombstoned_at IS NULL",
        )
        .bind(file_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))?
        .ok_or_else(|| AppError::not_found("Version not found"))
    }

    async fn latest_version(&self, file_id: FileId) -> AppResult<Option<Version>> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE file_id = $1 AND tombstoned_at IS NULL \
             ORDER BY version DESC LIMIT 1",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load latest version", e)
        })
    }

    async fn list_versions(
        &self,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<(Vec<Version>, u64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM file_versions WHERE file_id = $1 AND tombstoned_at IS NULL",
        )
        .bind(file_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count versions", e))?;

        let versions = sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE file_id = $1 AND tombstoned_at IS NULL \
             ORDER BY version DESC LIMIT $2 OFFSET $3",
        )
        .bind(file_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))?;

        Ok((versions, total as u64))
    }

    async fn append_version(&self, draft: VersionDraft) -> AppResult<AppendOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        Self::lock_file(&mut tx, draft.file_id).await?;

        // Dedup guard, re-checked under the row lock.
        if let Some(latest) = Self::latest_in_tx(&mut tx, draft.file_id).await? {
            if latest.content_hash == draft.content_hash {
                return Ok(AppendOutcome::Unchanged(latest.id));
            }
        }

        let number = Self::max_number_in_tx(&mut tx, draft.file_id).await? + 1;
        let version = Version::from_draft(draft, number);
        Self::insert_version(&mut tx, &version).await?;
        Self::sync_file_counter(&mut tx, version.file_id, number, version.created_at).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit version", e)
        })?;
        Ok(AppendOutcome::Created(version))
    }

    async fn set_pinned(&self, version_id: VersionId, pinned: bool) -> AppResult<Version> {
        sqlx::query_as::<_, Version>(
            "UPDATE file_versions SET is_pinned = $2 \
             WHERE id = $1 AND tombstoned_at IS NULL RETURNING *",
        )
        .bind(version_id)
        .bind(pinned)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update pin flag", e))?
        .ok_or_else(|| AppError::not_found("Version not found"))
    }

    async fn tombstone(&self, version_id: VersionId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let version = sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE id = $1 FOR UPDATE",
        )
        .bind(version_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))?
        .ok_or_else(|| AppError::not_found("Version not found"))?;

        if version.is_pinned {
            return Err(AppError::version_pinned(
                "Cannot delete a pinned version; unpin it first",
            ));
        }
        if version.tombstoned_at.is_some() {
            return Ok(false);
        }

        sqlx::query("UPDATE file_versions SET tombstoned_at = $2 WHERE id = $1")
            .bind(version_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to tombstone version", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit tombstone", e)
        })?;
        Ok(true)
    }

    async fn purge_tombstoned(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM file_versions \
             WHERE tombstoned_at IS NOT NULL AND tombstoned_at <= $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to purge tombstoned versions", e)
        })?;
        debug!(purged = result.rows_affected(), "Purged tombstoned versions");
        Ok(result.rows_affected())
    }

    async fn apply_restore(
        &self,
        target: VersionId,
        author_id: UserId,
        author_name: &str,
    ) -> AppResult<RestoreOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let target = sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE id = $1 AND tombstoned_at IS NULL",
        )
        .bind(target)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))?
        .ok_or_else(|| AppError::not_found("Version not found"))?;

        let file = Self::lock_file(&mut tx, target.file_id).await?;
        let latest = Self::latest_in_tx(&mut tx, file.id).await?;

        // Step 1: snapshot the live content. When the latest stored
        // version already captures it, that record serves as the backup.
        let live_hash = content_hash(&file.content);
        let backup_version_id = match &latest {
            Some(latest) if latest.content_hash == live_hash => latest.id,
            previous => {
                let number = Self::max_number_in_tx(&mut tx, file.id).await? + 1;
                let draft = VersionDraft::snapshot(
                    &file,
                    previous.as_ref(),
                    author_id,
                    author_name,
                    ChangeType::PreRestore,
                    format!("State before restore to version {}", target.version),
                );
                let backup = Version::from_draft(draft, number);
                Self::insert_version(&mut tx, &backup).await?;
                backup.id
            }
        };

        // Step 2: record the restore itself.
        let previous = Self::latest_in_tx(&mut tx, file.id).await?;
        let number = Self::max_number_in_tx(&mut tx, file.id).await? + 1;
        let draft =
            VersionDraft::restore_of(&target, &file, previous.as_ref(), author_id, author_name);
        let restored = Version::from_draft(draft, number);
        Self::insert_version(&mut tx, &restored).await?;

        // Step 3: overwrite the live file.
        sqlx::query(
            "UPDATE files SET content = $2, size_bytes = $3, version = $4, updated_at = $5 \
             WHERE id = $1",
        )
        .bind(file.id)
        .bind(&target.content)
        .bind(target.content.len() as i64)
        .bind(number)
        .bind(restored.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update file content", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit restore", e)
        })?;

        Ok(RestoreOutcome {
            restored_version: target.version,
            new_file_version: number,
            backup_version_id,
        })
    }
}
