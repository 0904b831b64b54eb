//! Filename resolution handler
//!
//! Handles POST /resolve requests from the file-discovery workflow and the
//! review UI.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use partmap_core::{InterchangeMapping, PartMappingResult};

use crate::error::ApiError;
use crate::state::AppState;

/// Request for resolving a filename to a part number.
#[derive(Deserialize, ToSchema)]
pub struct ResolveRequest {
    /// Raw image filename as supplied by the designer.
    #[schema(example = "J1234567_detail.jpg")]
    pub filename: String,
}

/// An interchange mapping included in a resolution response.
#[derive(Serialize, ToSchema)]
pub struct InterchangeDto {
    #[schema(example = "OLD12345")]
    pub old_part_number: String,
    #[schema(example = "12345")]
    pub new_part_number: String,
    #[schema(example = "IC")]
    pub interchange_code: String,
}

impl From<InterchangeMapping> for InterchangeDto {
    fn from(mapping: InterchangeMapping) -> Self {
        Self {
            old_part_number: mapping.old_part_number,
            new_part_number: mapping.new_part_number,
            interchange_code: mapping.interchange_code,
        }
    }
}

/// A resolution decision.
#[derive(Serialize, ToSchema)]
pub struct MappingResponse {
    /// Filename exactly as submitted.
    #[schema(example = "J1234567_detail.jpg")]
    pub original_filename: String,

    /// Candidate numbers extracted from the filename, best first.
    pub extracted_numbers: Vec<String>,

    /// The resolved part number, when any strategy matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "J1234567")]
    pub mapped_part_number: Option<String>,

    /// Fixed-tier confidence in [0, 1].
    #[schema(example = 0.95)]
    pub confidence_score: f64,

    /// Strategy that produced this decision.
    #[schema(example = "direct_match")]
    pub mapping_method: String,

    /// Interchange row used, for interchange decisions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interchange_mapping: Option<InterchangeDto>,

    /// Whether a human must confirm before renditions are produced.
    pub requires_manual_review: bool,

    /// Failure description, for error decisions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// When the decision was produced.
    #[schema(example = "2026-08-01T10:00:00Z")]
    pub created_at: String,
}

impl From<PartMappingResult> for MappingResponse {
    fn from(result: PartMappingResult) -> Self {
        Self {
            original_filename: result.original_filename,
            extracted_numbers: result.extracted_numbers,
            mapped_part_number: result.mapped_part_number,
            confidence_score: result.confidence_score,
            mapping_method: result.mapping_method.to_string(),
            interchange_mapping: result.interchange_mapping.map(Into::into),
            requires_manual_review: result.requires_manual_review,
            error_message: result.error_message,
            created_at: result.created_at.to_rfc3339(),
        }
    }
}

/// Resolve a filename to a canonical part number.
///
/// Always returns 200 with a decision: unmappable filenames come back as
/// `no_extraction` or `best_guess` decisions flagged for manual review,
/// never as HTTP errors. This keeps batch discovery runs unstoppable by
/// individual bad filenames.
#[utoipa::path(
    post,
    path = "/resolve",
    tag = "Resolution",
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Resolution decision", body = MappingResponse)
    )
)]
pub async fn resolve_handler(
    State(state): State<AppState>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<MappingResponse>, ApiError> {
    let result = state.resolver.resolve(&request.filename).await;
    Ok(Json(result.into()))
}
