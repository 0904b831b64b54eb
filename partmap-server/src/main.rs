//! Partmap Server - REST API for catalog image part-number resolution
//!
//! Wires the resolution engine to its Postgres adapters, builds the router,
//! and serves until shutdown. The service starts (degraded) even when its
//! databases are unreachable; resolution then falls back to
//! extraction-only decisions flagged for review.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use partmap_core::{PartNumberResolver, PartsDatabase};
use partmap_server::db::{DisconnectedPartsDb, FileRepository, PostgresPartsDb};
use partmap_server::{create_router_with_config, AppState, Config};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("partmap_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    // Explicit driver strategy list: primary DSN, then fallback. Exhaustion
    // degrades the oracle instead of aborting startup.
    let parts_db = PostgresPartsDb::connect_any(&config).await;
    let resolver_db: Arc<dyn PartsDatabase> = match &parts_db {
        Some(db) => db.clone(),
        None => {
            warn!("no parts database reachable; resolution will degrade to extraction only");
            Arc::new(DisconnectedPartsDb)
        }
    };

    let file_repo = match &config.tracking_db_url {
        Some(url) => match FileRepository::connect(url).await {
            Ok(repo) => Some(Arc::new(repo)),
            Err(e) => {
                warn!(error = %e, "file tracking store unavailable; review endpoints disabled");
                None
            }
        },
        None => {
            warn!("DATABASE_URL not set; review endpoints disabled");
            None
        }
    };

    let resolver = Arc::new(PartNumberResolver::new(resolver_db));
    let mappings = resolver.refresh_cache().await;
    info!(mappings, "interchange cache loaded");

    let state = AppState {
        resolver,
        parts_db: parts_db.map(|db| db as Arc<dyn PartsDatabase>),
        file_repo,
    };

    let app = create_router_with_config(state, &config);
    let addr = config.socket_addr();

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(%addr, "partmap-server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

/// Resolve on ctrl-c or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
