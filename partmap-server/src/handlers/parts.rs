//! Part lookup handlers
//!
//! Validation, metadata fetch, and the interchange-cache admin action.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use partmap_core::PartDetails;

use crate::error::ApiError;
use crate::state::AppState;

/// Response for a validation check.
#[derive(Serialize, ToSchema)]
pub struct ValidateResponse {
    /// The part number as normalized for the lookup.
    #[schema(example = "J1234567")]
    pub part_number: String,
    /// Whether the number exists and is active.
    #[schema(example = true)]
    pub valid: bool,
}

/// Part metadata returned to the review UI.
#[derive(Serialize, ToSchema)]
pub struct PartDetailsResponse {
    #[schema(example = "J1234567")]
    pub part_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Axle Shaft")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl From<PartDetails> for PartDetailsResponse {
    fn from(details: PartDetails) -> Self {
        Self {
            part_number: details.part_number,
            brand: details.brand,
            title: details.title,
            description: details.description,
            keywords: details.keywords,
        }
    }
}

/// Response for a cache refresh.
#[derive(Serialize, ToSchema)]
pub struct RefreshCacheResponse {
    /// Number of interchange mappings now live.
    #[schema(example = 18432)]
    pub mappings: usize,
}

/// Check whether a part number exists and is active.
///
/// Database failures count as invalid rather than erroring, matching the
/// resolver's degradation policy.
#[utoipa::path(
    get,
    path = "/validate/{part_number}",
    tag = "Parts",
    params(
        ("part_number" = String, Path, description = "Part number to validate")
    ),
    responses(
        (status = 200, description = "Validation result", body = ValidateResponse)
    )
)]
pub async fn validate_handler(
    State(state): State<AppState>,
    Path(part_number): Path<String>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let normalized = part_number.trim().to_uppercase();
    let valid = state.resolver.validate(&normalized).await;
    Ok(Json(ValidateResponse {
        part_number: normalized,
        valid,
    }))
}

/// Fetch descriptive metadata for an active part.
#[utoipa::path(
    get,
    path = "/parts/{part_number}",
    tag = "Parts",
    params(
        ("part_number" = String, Path, description = "Part number to look up")
    ),
    responses(
        (status = 200, description = "Part metadata", body = PartDetailsResponse),
        (status = 404, description = "No active part with this number"),
        (status = 503, description = "Parts database not available")
    )
)]
pub async fn part_details_handler(
    State(state): State<AppState>,
    Path(part_number): Path<String>,
) -> Result<Json<PartDetailsResponse>, ApiError> {
    let db = state
        .parts_db
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Parts database not configured"))?;

    let normalized = part_number.trim().to_uppercase();
    let details = db
        .part_details(&normalized)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No active part {normalized}")))?;

    Ok(Json(details.into()))
}

/// Rebuild the interchange cache from the parts database.
///
/// Admin action; safe to call while resolutions are in flight. An
/// unreachable database leaves the cache empty (`mappings: 0`) rather than
/// failing.
#[utoipa::path(
    post,
    path = "/cache/refresh",
    tag = "Parts",
    responses(
        (status = 200, description = "Cache rebuilt", body = RefreshCacheResponse)
    )
)]
pub async fn refresh_cache_handler(
    State(state): State<AppState>,
) -> Result<Json<RefreshCacheResponse>, ApiError> {
    let mappings = state.resolver.refresh_cache().await;
    Ok(Json(RefreshCacheResponse { mappings }))
}
