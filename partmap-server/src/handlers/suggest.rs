//! Part-number suggestion handler
//!
//! Autocomplete support for the manual-override form in the review UI.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use partmap_core::PartNumberSuggestion;

use crate::error::ApiError;
use crate::state::AppState;

/// Request for part-number suggestions.
#[derive(Deserialize, ToSchema)]
pub struct SuggestRequest {
    /// Filename being reviewed (context for logging only).
    #[serde(default)]
    #[schema(example = "J1234567_detail.jpg")]
    pub filename: Option<String>,

    /// Partial part number the reviewer has typed so far. At least two
    /// characters; shorter input yields an empty list.
    #[schema(example = "J12")]
    pub partial_input: String,
}

/// One autocomplete suggestion.
#[derive(Serialize, ToSchema)]
pub struct SuggestionDto {
    #[schema(example = "J1234567")]
    pub part_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Axle Shaft")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[schema(example = 0.7)]
    pub match_score: f64,
    #[schema(example = "prefix_search")]
    pub match_reason: String,
}

impl From<PartNumberSuggestion> for SuggestionDto {
    fn from(suggestion: PartNumberSuggestion) -> Self {
        Self {
            part_number: suggestion.part_number,
            description: suggestion.description,
            brand: suggestion.brand,
            match_score: suggestion.match_score,
            match_reason: suggestion.match_reason,
        }
    }
}

/// Response for a suggestion query.
#[derive(Serialize, ToSchema)]
pub struct SuggestResponse {
    /// Number of suggestions returned.
    #[schema(example = 2)]
    pub count: usize,
    /// Matching active parts, ordered by part number.
    pub suggestions: Vec<SuggestionDto>,
}

/// Suggest part numbers for manual override entry.
///
/// Returns an empty list (never an error) when the input is too short or
/// the parts database is unavailable.
#[utoipa::path(
    post,
    path = "/suggest",
    tag = "Resolution",
    request_body = SuggestRequest,
    responses(
        (status = 200, description = "Suggestions, possibly empty", body = SuggestResponse)
    )
)]
pub async fn suggest_handler(
    State(state): State<AppState>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, ApiError> {
    let filename = request.filename.as_deref().unwrap_or("");
    let suggestions = state
        .resolver
        .suggest(filename, &request.partial_input)
        .await;

    let suggestions: Vec<SuggestionDto> = suggestions.into_iter().map(Into::into).collect();

    Ok(Json(SuggestResponse {
        count: suggestions.len(),
        suggestions,
    }))
}
