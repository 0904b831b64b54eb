//! Database module for Partmap Server
//!
//! Contains the Postgres adapter for the external parts database and the
//! file tracking repository this service owns.

pub mod files;
pub mod parts;

pub use files::{file_id_for, FileRecord, FileRepository, FileStatus, StatusCounts};
pub use parts::{DisconnectedPartsDb, PostgresPartsDb};
