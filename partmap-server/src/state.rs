//! Application state module
//!
//! Defines shared state accessible across all request handlers. Everything
//! is constructed once at startup and injected explicitly; there are no
//! process-global service instances.

use std::sync::Arc;

use partmap_core::{PartNumberResolver, PartsDatabase};

use crate::db::FileRepository;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// The resolution engine; always present, possibly running against a
    /// degraded (unreachable) parts database.
    pub resolver: Arc<PartNumberResolver>,
    /// Direct parts-database handle for metadata lookups; `None` when no
    /// DSN could be connected.
    pub parts_db: Option<Arc<dyn PartsDatabase>>,
    /// File tracking repository; `None` when no tracking database is
    /// configured.
    pub file_repo: Option<Arc<FileRepository>>,
}
