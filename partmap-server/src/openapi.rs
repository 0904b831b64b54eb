//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3.0 specification for the partmap API.

use utoipa::OpenApi;

use crate::db::{FileRecord, FileStatus, StatusCounts};
use crate::handlers::{
    HealthResponse, InterchangeDto, ListFilesResponse, MappingResponse, OverrideDto,
    OverrideListResponse, OverrideRequest, PartDetailsResponse, ReadyResponse,
    RefreshCacheResponse, RegisterFileRequest, RegisterFileResponse, ResolveRequest,
    ReviewActionRequest, StatusResponse, SuggestRequest, SuggestResponse, SuggestionDto,
    ValidateResponse,
};

/// Partmap API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Partmap API",
        version = "0.1.0",
        description = r#"
## Catalog image part-number resolution API

Partmap maps designer-supplied image filenames to canonical, currently
active part numbers:

- **Pattern extraction** - candidate numbers pulled from loose filename
  conventions (`12345_2.jpg`, `J1234567_detail.psd`, ...)
- **Interchange resolution** - superseded numbers mapped to their current
  replacements via a bulk-loaded cache
- **Confidence tiers** - every decision carries a fixed confidence score and
  a manual-review flag; low-confidence decisions queue for a human
- **Manual overrides** - reviewer corrections are authoritative and kept as
  an append-only audit trail

Resolution never fails: unmappable filenames come back as reviewable
decisions, so a batch discovery run cannot be aborted by one bad name or a
database hiccup.
"#,
        license(
            name = "MIT OR Apache-2.0",
            url = "https://github.com/partmap/partmap/blob/main/LICENSE"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "Resolution", description = "Resolve filenames and suggest part numbers"),
        (name = "Parts", description = "Part validation, metadata, and cache administration"),
        (name = "Files", description = "File tracking and the human review workflow"),
        (name = "Health", description = "Service health and dashboard status endpoints")
    ),
    paths(
        crate::handlers::resolve::resolve_handler,
        crate::handlers::suggest::suggest_handler,
        crate::handlers::parts::validate_handler,
        crate::handlers::parts::part_details_handler,
        crate::handlers::parts::refresh_cache_handler,
        crate::handlers::files::register_file_handler,
        crate::handlers::files::list_files_handler,
        crate::handlers::files::pending_files_handler,
        crate::handlers::files::get_file_handler,
        crate::handlers::files::override_file_handler,
        crate::handlers::files::list_overrides_handler,
        crate::handlers::files::approve_file_handler,
        crate::handlers::files::reject_file_handler,
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::health::status_handler,
    ),
    components(
        schemas(
            ResolveRequest,
            MappingResponse,
            InterchangeDto,
            SuggestRequest,
            SuggestResponse,
            SuggestionDto,
            ValidateResponse,
            PartDetailsResponse,
            RefreshCacheResponse,
            RegisterFileRequest,
            RegisterFileResponse,
            ListFilesResponse,
            OverrideRequest,
            OverrideListResponse,
            OverrideDto,
            ReviewActionRequest,
            FileRecord,
            FileStatus,
            StatusCounts,
            HealthResponse,
            ReadyResponse,
            StatusResponse,
        )
    )
)]
pub struct ApiDoc;
