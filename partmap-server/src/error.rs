//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error
//! variants.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not found - requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable - required service is not configured or available
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Mapping error - error from the resolution engine
    #[error("Mapping error: {0}")]
    Mapping(#[from] partmap_core::MappingError),

    /// Database error - failure in the tracking database
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a service unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Mapping(ref e) => match e {
                // Parts database outage → 503
                partmap_core::MappingError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                // Everything else is a server-side failure → 500
                partmap_core::MappingError::Query(_)
                | partmap_core::MappingError::InvalidInterchange(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Database(ref e) => match e {
                sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Mapping(ref e) => match e {
                partmap_core::MappingError::Unavailable(_) => "PARTS_DB_UNAVAILABLE",
                partmap_core::MappingError::Query(_) => "PARTS_DB_QUERY_FAILED",
                partmap_core::MappingError::InvalidInterchange(_) => "INVALID_INTERCHANGE",
            },
            Self::Database(ref e) => match e {
                sqlx::Error::RowNotFound => "NOT_FOUND",
                _ => "DATABASE_ERROR",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            // Database internals stay out of client responses
            Self::Database(ref e) => match e {
                sqlx::Error::RowNotFound => "Record not found".to_string(),
                _ => "Tracking database error".to_string(),
            },
            Self::Mapping(ref e) => match e {
                partmap_core::MappingError::Unavailable(_) => {
                    "Parts database unavailable".to_string()
                }
                partmap_core::MappingError::Query(_) => "Parts database query failed".to_string(),
                partmap_core::MappingError::InvalidInterchange(_) => {
                    "Invalid interchange data".to_string()
                }
            },
            // For other errors, use the Display message
            _ => self.to_string(),
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Mapping(_) => "mapping",
            Self::Database(_) => "database",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        // Log based on severity, always including internal details
        match &self {
            Self::BadRequest(_) | Self::NotFound(_) => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %internal_message,
                    "Client error"
                );
            }
            Self::ServiceUnavailable(_) => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %internal_message,
                    "Service unavailable"
                );
            }
            Self::Internal(_) | Self::Mapping(_) | Self::Database(_) => {
                tracing::error!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %internal_message,
                    client_message = %client_message,
                    "Server error (internal details logged)"
                );
            }
        }

        // All error responses include a `code` field for programmatic
        // error handling
        let body = serde_json::json!({
            "error": client_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::service_unavailable("x").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Mapping(partmap_core::MappingError::Unavailable("down".into()))
                .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_database_messages_are_sanitized() {
        let err = ApiError::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.client_message(), "Tracking database error");
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}
