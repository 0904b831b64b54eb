//! File tracking entity and repository
//!
//! Tracks every discovered image file through the production lifecycle and
//! keeps the append-only manual-override audit trail. This is the one store
//! this service owns; migrations run on connect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

use partmap_core::{ManualOverride, PartMappingResult};

/// File processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Discovered,
    Queued,
    Processing,
    Processed,
    AwaitingReview,
    Approved,
    Rejected,
    Failed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::AwaitingReview => "awaiting_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovered" => Ok(Self::Discovered),
            "queued" => Ok(Self::Queued),
            "processing" => Ok(Self::Processing),
            "processed" => Ok(Self::Processed),
            "awaiting_review" => Ok(Self::AwaitingReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown file status: {other}")),
        }
    }
}

impl TryFrom<String> for FileStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A tracked file and its current processing state.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FileRecord {
    /// Stable identifier derived from the original path.
    pub file_id: String,
    pub filename: String,
    pub original_path: String,
    #[sqlx(try_from = "String")]
    pub status: FileStatus,
    /// Current part number: the resolver's decision, or the override value
    /// once a human has acted.
    pub part_number: Option<String>,
    /// Confidence of the resolver decision that set `part_number`.
    pub mapping_confidence: Option<f64>,
    pub requires_review: bool,
    /// Append-only list of processing steps.
    #[schema(value_type = Vec<Object>)]
    pub processing_history: serde_json::Value,
    #[schema(value_type = String, example = "2026-08-01T10:00:00Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2026-08-01T10:00:00Z")]
    pub updated_at: DateTime<Utc>,
}

/// Per-status counters for the dashboard.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct StatusCounts {
    pub discovered: i64,
    pub queued: i64,
    pub processing: i64,
    pub processed: i64,
    pub awaiting_review: i64,
    pub approved: i64,
    pub rejected: i64,
    pub failed: i64,
    pub total: i64,
}

#[derive(FromRow)]
struct OverrideRow {
    file_id: String,
    override_type: String,
    system_value: Option<String>,
    user_value: String,
    override_reason: Option<String>,
    overridden_by: String,
    overridden_at: DateTime<Utc>,
}

impl From<OverrideRow> for ManualOverride {
    fn from(row: OverrideRow) -> Self {
        Self {
            file_id: row.file_id,
            override_type: row.override_type,
            system_value: row.system_value,
            user_value: row.user_value,
            override_reason: row.override_reason,
            overridden_by: row.overridden_by,
            overridden_at: row.overridden_at,
        }
    }
}

/// Postgres-backed file tracking repository.
#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

const FILE_COLUMNS: &str = "file_id, filename, original_path, status, part_number, \
     mapping_confidence, requires_review, processing_history, created_at, updated_at";

impl FileRepository {
    /// Connect to the tracking database and run migrations.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;

        tracing::info!("file tracking store connected and migrations applied");

        Ok(Self { pool })
    }

    /// Create a repository from an existing pool (for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a discovered file together with its resolver decision.
    ///
    /// Registration is idempotent: the file id is derived from the original
    /// path, and re-registering updates the mapping fields and appends to
    /// the processing history instead of duplicating the record.
    pub async fn register(
        &self,
        original_path: &str,
        mapping: &PartMappingResult,
    ) -> Result<FileRecord, sqlx::Error> {
        let file_id = file_id_for(original_path);
        let history = serde_json::json!([{
            "step": "part_mapping",
            "timestamp": Utc::now().to_rfc3339(),
            "details": {
                "method": mapping.mapping_method.to_string(),
                "part_number": mapping.mapped_part_number,
                "confidence": mapping.confidence_score,
                "extracted": mapping.extracted_numbers,
            },
        }]);

        let sql = format!(
            r#"
            INSERT INTO files (file_id, filename, original_path, status, part_number,
                               mapping_confidence, requires_review, processing_history)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (file_id) DO UPDATE SET
                part_number = EXCLUDED.part_number,
                mapping_confidence = EXCLUDED.mapping_confidence,
                requires_review = EXCLUDED.requires_review,
                processing_history = files.processing_history || EXCLUDED.processing_history,
                updated_at = now()
            RETURNING {FILE_COLUMNS}
            "#
        );

        sqlx::query_as(&sql)
            .bind(&file_id)
            .bind(&mapping.original_filename)
            .bind(original_path)
            .bind(FileStatus::Discovered.as_str())
            .bind(&mapping.mapped_part_number)
            .bind(mapping.confidence_score)
            .bind(mapping.requires_manual_review)
            .bind(&history)
            .fetch_one(&self.pool)
            .await
    }

    /// Fetch one file by id.
    pub async fn get(&self, file_id: &str) -> Result<Option<FileRecord>, sqlx::Error> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE file_id = $1");
        sqlx::query_as(&sql).bind(file_id).fetch_optional(&self.pool).await
    }

    /// List files, optionally filtered by status, newest first.
    pub async fn list(
        &self,
        status: Option<FileStatus>,
        limit: i64,
    ) -> Result<Vec<FileRecord>, sqlx::Error> {
        match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {FILE_COLUMNS} FROM files WHERE status = $1 \
                     ORDER BY created_at DESC LIMIT $2"
                );
                sqlx::query_as(&sql)
                    .bind(status.as_str())
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {FILE_COLUMNS} FROM files ORDER BY created_at DESC LIMIT $1"
                );
                sqlx::query_as(&sql).bind(limit).fetch_all(&self.pool).await
            }
        }
    }

    /// Files whose resolver decision still needs a human, oldest first so
    /// the review queue drains in discovery order.
    pub async fn pending_review(&self, limit: i64) -> Result<Vec<FileRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files \
             WHERE requires_review AND status NOT IN ('approved', 'rejected') \
             ORDER BY created_at ASC LIMIT $1"
        );
        sqlx::query_as(&sql).bind(limit).fetch_all(&self.pool).await
    }

    /// Per-status counters for the dashboard.
    pub async fn counts(&self) -> Result<StatusCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM files GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            counts.total += count;
            match status.parse::<FileStatus>() {
                Ok(FileStatus::Discovered) => counts.discovered = count,
                Ok(FileStatus::Queued) => counts.queued = count,
                Ok(FileStatus::Processing) => counts.processing = count,
                Ok(FileStatus::Processed) => counts.processed = count,
                Ok(FileStatus::AwaitingReview) => counts.awaiting_review = count,
                Ok(FileStatus::Approved) => counts.approved = count,
                Ok(FileStatus::Rejected) => counts.rejected = count,
                Ok(FileStatus::Failed) => counts.failed = count,
                Err(e) => tracing::warn!(status, error = %e, "unknown status in files table"),
            }
        }
        Ok(counts)
    }

    /// Move a file to a new status, appending the transition to its history.
    pub async fn set_status(
        &self,
        file_id: &str,
        status: FileStatus,
        reason: Option<&str>,
    ) -> Result<FileRecord, sqlx::Error> {
        let entry = serde_json::json!([{
            "step": "status_change",
            "timestamp": Utc::now().to_rfc3339(),
            "details": { "to": status.as_str(), "reason": reason },
        }]);

        let sql = format!(
            r#"
            UPDATE files
            SET status = $2, processing_history = processing_history || $3, updated_at = now()
            WHERE file_id = $1
            RETURNING {FILE_COLUMNS}
            "#
        );

        sqlx::query_as(&sql)
            .bind(file_id)
            .bind(status.as_str())
            .bind(&entry)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Record a manual override and write the corrected value through to
    /// the file record. The override row is append-only audit data; the
    /// file's part number becomes authoritative user input from here on,
    /// bypassing resolver confidence entirely.
    pub async fn apply_override(
        &self,
        ovr: &ManualOverride,
    ) -> Result<FileRecord, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO manual_overrides
                (id, file_id, override_type, system_value, user_value,
                 override_reason, overridden_by, overridden_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&ovr.file_id)
        .bind(&ovr.override_type)
        .bind(&ovr.system_value)
        .bind(&ovr.user_value)
        .bind(&ovr.override_reason)
        .bind(&ovr.overridden_by)
        .bind(ovr.overridden_at)
        .execute(&mut *tx)
        .await?;

        let entry = serde_json::json!([{
            "step": "manual_override",
            "timestamp": ovr.overridden_at.to_rfc3339(),
            "details": {
                "override_type": ovr.override_type,
                "system_value": ovr.system_value,
                "user_value": ovr.user_value,
                "overridden_by": ovr.overridden_by,
            },
        }]);

        let sql = format!(
            r#"
            UPDATE files
            SET part_number = $2,
                requires_review = FALSE,
                status = 'approved',
                processing_history = processing_history || $3,
                updated_at = now()
            WHERE file_id = $1
            RETURNING {FILE_COLUMNS}
            "#
        );

        let record: FileRecord = sqlx::query_as(&sql)
            .bind(&ovr.file_id)
            .bind(&ovr.user_value)
            .bind(&entry)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;
        Ok(record)
    }

    /// All overrides recorded for a file, oldest first.
    pub async fn overrides_for(&self, file_id: &str) -> Result<Vec<ManualOverride>, sqlx::Error> {
        let rows: Vec<OverrideRow> = sqlx::query_as(
            r#"
            SELECT file_id, override_type, system_value, user_value,
                   override_reason, overridden_by, overridden_at
            FROM manual_overrides
            WHERE file_id = $1
            ORDER BY overridden_at ASC
            "#,
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Stable file identifier: SHA3-256 of the original path, hex-encoded.
///
/// Derived rather than random so repeated discovery of the same path maps
/// to the same record.
pub fn file_id_for(original_path: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(original_path.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_is_stable_and_path_sensitive() {
        let a = file_id_for("/incoming/J1234567.psd");
        let b = file_id_for("/incoming/J1234567.psd");
        let c = file_id_for("/incoming/other/J1234567.psd");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [
            FileStatus::Discovered,
            FileStatus::Queued,
            FileStatus::Processing,
            FileStatus::Processed,
            FileStatus::AwaitingReview,
            FileStatus::Approved,
            FileStatus::Rejected,
            FileStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<FileStatus>().unwrap(), status);
        }
        assert!("bogus".parse::<FileStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_to_snake_case() {
        let json = serde_json::to_string(&FileStatus::AwaitingReview).unwrap();
        assert_eq!(json, "\"awaiting_review\"");
    }
}
