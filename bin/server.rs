// SWIFT Code Registry - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use swift_registry::api::{build_router, AppState};
use swift_registry::config::ServerConfig;
use swift_registry::{logging, open_database, preload_if_present, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load();
    logging::init("info,tower_http=info");

    tracing::info!(version = VERSION, db = %config.db_path.display(), "starting swift-server");

    // Schema setup and the one-time preload run before the listener binds
    let mut conn = open_database(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;

    if config.skip_import {
        tracing::info!("preload disabled");
    } else {
        preload_if_present(&mut conn, &config.data_file);
    }
    drop(conn);

    let app = build_router(AppState::new(config.db_path.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "swift-server listening");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
