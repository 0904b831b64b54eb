//! Partmap Server Library - REST API components for part-number resolution
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

pub use config::Config;
pub use db::{file_id_for, FileRecord, FileRepository, FileStatus, PostgresPartsDb, StatusCounts};
pub use error::ApiError;
pub use openapi::ApiDoc;
pub use routes::create_router_with_config;
pub use state::AppState;
