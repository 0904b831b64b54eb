//! File tracking and review handlers
//!
//! The file-discovery workflow registers files here; the review UI lists
//! them, applies manual overrides, and approves or rejects results.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use partmap_core::ManualOverride;

use crate::db::{FileRecord, FileRepository, FileStatus};
use crate::error::ApiError;
use crate::handlers::resolve::MappingResponse;
use crate::state::AppState;

/// Default and maximum listing page sizes.
const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 500;

/// Request to register a discovered file.
#[derive(Deserialize, ToSchema)]
pub struct RegisterFileRequest {
    /// Absolute path of the discovered file in the intake share.
    #[schema(example = "/intake/J1234567_detail.psd")]
    pub original_path: String,
}

/// Response for a file registration: the stored record plus the resolver
/// decision that was applied to it.
#[derive(Serialize, ToSchema)]
pub struct RegisterFileResponse {
    pub file: FileRecord,
    pub mapping: MappingResponse,
}

/// Query parameters for file listing.
#[derive(Deserialize, ToSchema)]
pub struct ListFilesQuery {
    /// Filter by status (e.g. `awaiting_review`).
    #[serde(default)]
    pub status: Option<String>,
    /// Page size (default 50, max 500).
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Response for a file listing.
#[derive(Serialize, ToSchema)]
pub struct ListFilesResponse {
    pub count: usize,
    pub files: Vec<FileRecord>,
}

/// Request to override a resolver decision.
#[derive(Deserialize, ToSchema)]
pub struct OverrideRequest {
    /// The authoritative part number supplied by the reviewer.
    #[schema(example = "J1234567")]
    pub user_value: String,
    /// Who is making the correction.
    #[schema(example = "reviewer@catalog")]
    pub overridden_by: String,
    /// Optional free-text justification.
    #[serde(default)]
    pub override_reason: Option<String>,
}

/// Request body for approve/reject actions.
#[derive(Default, Deserialize, ToSchema)]
pub struct ReviewActionRequest {
    /// Optional reason recorded in the processing history.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response listing the override audit trail of a file.
#[derive(Serialize, ToSchema)]
pub struct OverrideListResponse {
    pub count: usize,
    pub overrides: Vec<OverrideDto>,
}

/// One recorded manual override.
#[derive(Serialize, ToSchema)]
pub struct OverrideDto {
    pub file_id: String,
    #[schema(example = "part_number")]
    pub override_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_value: Option<String>,
    #[schema(example = "J1234567")]
    pub user_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
    pub overridden_by: String,
    #[schema(example = "2026-08-01T10:00:00Z")]
    pub overridden_at: String,
}

impl From<ManualOverride> for OverrideDto {
    fn from(ovr: ManualOverride) -> Self {
        Self {
            file_id: ovr.file_id,
            override_type: ovr.override_type,
            system_value: ovr.system_value,
            user_value: ovr.user_value,
            override_reason: ovr.override_reason,
            overridden_by: ovr.overridden_by,
            overridden_at: ovr.overridden_at.to_rfc3339(),
        }
    }
}

fn file_repo(state: &AppState) -> Result<&Arc<FileRepository>, ApiError> {
    state
        .file_repo
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("File tracking not configured"))
}

/// Register a discovered file and run the resolver over its name.
///
/// Idempotent per path: re-registering the same file updates its mapping
/// fields and appends to the processing history.
#[utoipa::path(
    post,
    path = "/files",
    tag = "Files",
    request_body = RegisterFileRequest,
    responses(
        (status = 200, description = "File registered with resolution decision", body = RegisterFileResponse),
        (status = 400, description = "Empty path"),
        (status = 503, description = "File tracking not configured")
    )
)]
pub async fn register_file_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterFileRequest>,
) -> Result<Json<RegisterFileResponse>, ApiError> {
    let repo = file_repo(&state)?;

    let path = request.original_path.trim();
    if path.is_empty() {
        return Err(ApiError::bad_request("original_path must not be empty"));
    }

    let filename = FsPath::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);

    let mapping = state.resolver.resolve(filename).await;
    let file = repo.register(path, &mapping).await?;

    Ok(Json(RegisterFileResponse {
        file,
        mapping: mapping.into(),
    }))
}

/// List tracked files, newest first.
#[utoipa::path(
    get,
    path = "/files",
    tag = "Files",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("limit" = Option<i64>, Query, description = "Page size (default 50, max 500)")
    ),
    responses(
        (status = 200, description = "Tracked files", body = ListFilesResponse),
        (status = 400, description = "Unknown status value"),
        (status = 503, description = "File tracking not configured")
    )
)]
pub async fn list_files_handler(
    State(state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ListFilesResponse>, ApiError> {
    let repo = file_repo(&state)?;

    let status = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<FileStatus>()
                .map_err(|e| ApiError::bad_request(e))
        })
        .transpose()?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let files = repo.list(status, limit).await?;
    Ok(Json(ListFilesResponse {
        count: files.len(),
        files,
    }))
}

/// Files waiting on a human decision, oldest first.
#[utoipa::path(
    get,
    path = "/files/pending",
    tag = "Files",
    params(
        ("limit" = Option<i64>, Query, description = "Page size (default 50, max 500)")
    ),
    responses(
        (status = 200, description = "Files pending review", body = ListFilesResponse),
        (status = 503, description = "File tracking not configured")
    )
)]
pub async fn pending_files_handler(
    State(state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ListFilesResponse>, ApiError> {
    let repo = file_repo(&state)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let files = repo.pending_review(limit).await?;
    Ok(Json(ListFilesResponse {
        count: files.len(),
        files,
    }))
}

/// Fetch one tracked file.
#[utoipa::path(
    get,
    path = "/files/{file_id}",
    tag = "Files",
    params(
        ("file_id" = String, Path, description = "File identifier")
    ),
    responses(
        (status = 200, description = "Tracked file", body = FileRecord),
        (status = 404, description = "No such file"),
        (status = 503, description = "File tracking not configured")
    )
)]
pub async fn get_file_handler(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<FileRecord>, ApiError> {
    let repo = file_repo(&state)?;
    let file = repo
        .get(&file_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No file {file_id}")))?;
    Ok(Json(file))
}

/// Record a manual part-number override for a file.
///
/// The supplied value becomes authoritative: it is written through to the
/// file record, the review flag clears, and the override is appended to the
/// audit trail. The resolver is never consulted again for this file.
#[utoipa::path(
    post,
    path = "/files/{file_id}/override",
    tag = "Files",
    params(
        ("file_id" = String, Path, description = "File identifier")
    ),
    request_body = OverrideRequest,
    responses(
        (status = 200, description = "Override applied", body = FileRecord),
        (status = 400, description = "Empty override value"),
        (status = 404, description = "No such file"),
        (status = 503, description = "File tracking not configured")
    )
)]
pub async fn override_file_handler(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> Result<Json<FileRecord>, ApiError> {
    let repo = file_repo(&state)?;

    let user_value = request.user_value.trim().to_uppercase();
    if user_value.is_empty() {
        return Err(ApiError::bad_request("user_value must not be empty"));
    }
    if request.overridden_by.trim().is_empty() {
        return Err(ApiError::bad_request("overridden_by must not be empty"));
    }

    let current = repo
        .get(&file_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No file {file_id}")))?;

    let ovr = ManualOverride {
        file_id,
        override_type: "part_number".to_string(),
        system_value: current.part_number.clone(),
        user_value,
        override_reason: request.override_reason,
        overridden_by: request.overridden_by,
        overridden_at: Utc::now(),
    };

    let updated = repo.apply_override(&ovr).await?;
    Ok(Json(updated))
}

/// List the override audit trail of a file.
#[utoipa::path(
    get,
    path = "/files/{file_id}/overrides",
    tag = "Files",
    params(
        ("file_id" = String, Path, description = "File identifier")
    ),
    responses(
        (status = 200, description = "Recorded overrides, oldest first", body = OverrideListResponse),
        (status = 503, description = "File tracking not configured")
    )
)]
pub async fn list_overrides_handler(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<OverrideListResponse>, ApiError> {
    let repo = file_repo(&state)?;
    let overrides: Vec<OverrideDto> = repo
        .overrides_for(&file_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(OverrideListResponse {
        count: overrides.len(),
        overrides,
    }))
}

/// Approve a file's current part-number decision.
#[utoipa::path(
    post,
    path = "/files/{file_id}/approve",
    tag = "Files",
    params(
        ("file_id" = String, Path, description = "File identifier")
    ),
    request_body = ReviewActionRequest,
    responses(
        (status = 200, description = "File approved", body = FileRecord),
        (status = 404, description = "No such file"),
        (status = 503, description = "File tracking not configured")
    )
)]
pub async fn approve_file_handler(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Json(request): Json<ReviewActionRequest>,
) -> Result<Json<FileRecord>, ApiError> {
    let repo = file_repo(&state)?;
    let updated = repo
        .set_status(&file_id, FileStatus::Approved, request.reason.as_deref())
        .await?;
    Ok(Json(updated))
}

/// Reject a file; it goes back to the designers.
#[utoipa::path(
    post,
    path = "/files/{file_id}/reject",
    tag = "Files",
    params(
        ("file_id" = String, Path, description = "File identifier")
    ),
    request_body = ReviewActionRequest,
    responses(
        (status = 200, description = "File rejected", body = FileRecord),
        (status = 404, description = "No such file"),
        (status = 503, description = "File tracking not configured")
    )
)]
pub async fn reject_file_handler(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Json(request): Json<ReviewActionRequest>,
) -> Result<Json<FileRecord>, ApiError> {
    let repo = file_repo(&state)?;
    let updated = repo
        .set_status(&file_id, FileStatus::Rejected, request.reason.as_deref())
        .await?;
    Ok(Json(updated))
}
