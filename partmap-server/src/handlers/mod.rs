//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod files;
pub mod health;
pub mod parts;
pub mod resolve;
pub mod suggest;

pub use crate::state::AppState;
pub use files::{
    approve_file_handler, get_file_handler, list_files_handler, list_overrides_handler,
    override_file_handler, pending_files_handler, register_file_handler, reject_file_handler,
    ListFilesResponse, OverrideDto, OverrideListResponse, OverrideRequest, RegisterFileRequest,
    RegisterFileResponse, ReviewActionRequest,
};
pub use health::{health, ready, status_handler, HealthResponse, ReadyResponse, StatusResponse};
pub use parts::{
    part_details_handler, refresh_cache_handler, validate_handler, PartDetailsResponse,
    RefreshCacheResponse, ValidateResponse,
};
pub use resolve::{resolve_handler, InterchangeDto, MappingResponse, ResolveRequest};
pub use suggest::{suggest_handler, SuggestRequest, SuggestResponse, SuggestionDto};
