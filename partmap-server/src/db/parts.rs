//! Postgres adapter for the catalog parts database.
//!
//! The parts store is an external, read-only system reached over the
//! Postgres protocol: a `part_master` table of active catalog entries and a
//! `part_interchange` table of superseded-number history. This adapter
//! implements the resolution engine's [`PartsDatabase`] seam on top of it.
//!
//! Connection establishment is an explicit strategy list: the primary DSN
//! is tried first, then the documented fallback, each failure logged with
//! its reason. When both fail the service runs degraded - empty interchange
//! cache, always-false existence checks - rather than refusing to start.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info, warn};

use partmap_core::{InterchangeRow, MappingError, PartDetails, PartsDatabase};

use crate::config::Config;

/// Postgres-backed parts database.
pub struct PostgresPartsDb {
    pool: PgPool,
    /// Part metadata is immutable for the lifetime of a process; memoize
    /// per-number fetches to spare the legacy store repeated reads.
    details_cache: DashMap<String, PartDetails>,
}

/// Row type for master-table queries.
#[derive(FromRow)]
struct PartRow {
    part_number: String,
    brand: Option<String>,
    title: Option<String>,
    description: Option<String>,
    keywords: Option<String>,
}

impl From<PartRow> for PartDetails {
    fn from(row: PartRow) -> Self {
        Self {
            part_number: row.part_number,
            brand: row.brand,
            title: row.title,
            description: row.description,
            keywords: row.keywords,
        }
    }
}

/// Row type for interchange-table queries.
#[derive(FromRow)]
struct InterchangeDbRow {
    interchange_code: Option<String>,
    old_part_number: Option<String>,
    new_part_number: Option<String>,
}

impl PostgresPartsDb {
    /// Connect to one DSN and verify it answers a trivial query.
    pub async fn connect(url: &str, config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .connect(url)
            .await?;

        sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&pool).await?;

        Ok(Self {
            pool,
            details_cache: DashMap::new(),
        })
    }

    /// Try the configured DSNs in order: primary, then fallback.
    ///
    /// Each failure is logged with the driver label and reason before the
    /// next candidate is tried. `None` means every candidate failed (or
    /// none was configured) and the caller should run degraded.
    pub async fn connect_any(config: &Config) -> Option<Arc<Self>> {
        let candidates = [
            ("primary", config.parts_db_url.as_deref()),
            ("fallback", config.parts_db_fallback_url.as_deref()),
        ];

        for (driver, url) in candidates {
            let Some(url) = url else {
                debug!(driver, "parts database DSN not configured");
                continue;
            };
            match Self::connect(url, config).await {
                Ok(db) => {
                    info!(driver, "parts database connected");
                    return Some(Arc::new(db));
                }
                Err(e) => {
                    warn!(driver, error = %e, "parts database connection failed");
                }
            }
        }

        None
    }
}

#[async_trait]
impl PartsDatabase for PostgresPartsDb {
    async fn active_part_exists(&self, part_number: &str) -> partmap_core::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM part_master
                WHERE part_number = $1 AND active
            )
            "#,
        )
        .bind(part_number)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn interchange_rows(&self) -> partmap_core::Result<Vec<InterchangeRow>> {
        let rows: Vec<InterchangeDbRow> = sqlx::query_as(
            r#"
            SELECT interchange_code, old_part_number, new_part_number
            FROM part_interchange
            ORDER BY new_part_number, interchange_code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows
            .into_iter()
            .map(|row| InterchangeRow {
                code: row.interchange_code,
                old_number: row.old_part_number,
                new_number: row.new_part_number,
            })
            .collect())
    }

    async fn search_active_parts(
        &self,
        prefix: &str,
        limit: usize,
    ) -> partmap_core::Result<Vec<PartDetails>> {
        let rows: Vec<PartRow> = sqlx::query_as(
            r#"
            SELECT part_number, brand, title, description, keywords
            FROM part_master
            WHERE part_number LIKE $1 || '%' AND active
            ORDER BY part_number
            LIMIT $2
            "#,
        )
        .bind(prefix)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn part_details(&self, part_number: &str) -> partmap_core::Result<Option<PartDetails>> {
        if let Some(cached) = self.details_cache.get(part_number) {
            return Ok(Some(cached.clone()));
        }

        let row: Option<PartRow> = sqlx::query_as(
            r#"
            SELECT part_number, brand, title, description, keywords
            FROM part_master
            WHERE part_number = $1 AND active
            "#,
        )
        .bind(part_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;

        let details: Option<PartDetails> = row.map(Into::into);
        if let Some(ref details) = details {
            self.details_cache
                .insert(part_number.to_string(), details.clone());
        }

        Ok(details)
    }
}

/// Stand-in used when no parts database could be connected.
///
/// Every call reports `Unavailable`: the resolver soft-fails existence
/// checks, the interchange cache stays empty, and the service keeps
/// answering with reviewable decisions instead of refusing to start.
pub struct DisconnectedPartsDb;

#[async_trait]
impl PartsDatabase for DisconnectedPartsDb {
    async fn active_part_exists(&self, _part_number: &str) -> partmap_core::Result<bool> {
        Err(MappingError::Unavailable("parts database not connected".into()))
    }

    async fn interchange_rows(&self) -> partmap_core::Result<Vec<InterchangeRow>> {
        Err(MappingError::Unavailable("parts database not connected".into()))
    }

    async fn search_active_parts(
        &self,
        _prefix: &str,
        _limit: usize,
    ) -> partmap_core::Result<Vec<PartDetails>> {
        Err(MappingError::Unavailable("parts database not connected".into()))
    }

    async fn part_details(
        &self,
        _part_number: &str,
    ) -> partmap_core::Result<Option<PartDetails>> {
        Err(MappingError::Unavailable("parts database not connected".into()))
    }
}

/// Map a sqlx failure onto the engine's error taxonomy: connection-level
/// failures become `Unavailable` (the resolver soft-fails those), anything
/// else is an unexpected query failure.
fn classify(e: sqlx::Error) -> MappingError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => MappingError::Unavailable(e.to_string()),
        _ => MappingError::Query(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_connection_errors_as_unavailable() {
        assert!(classify(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(classify(sqlx::Error::PoolClosed).is_unavailable());
        assert!(classify(sqlx::Error::WorkerCrashed).is_unavailable());
    }

    #[test]
    fn test_classify_other_errors_as_query() {
        assert!(!classify(sqlx::Error::RowNotFound).is_unavailable());
        assert!(!classify(sqlx::Error::ColumnNotFound("active".into())).is_unavailable());
    }
}
