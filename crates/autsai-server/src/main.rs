use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use autsai_api::auth::{AppState, AppStateInner};
use autsai_db::{Database, Storage};

const PLACEHOLDER_SECRET: &str = "dev-secret-change-me";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autsai=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = std::env::var("AUTSAI_JWT_SECRET").unwrap_or_else(|_| PLACEHOLDER_SECRET.into());
    let db_path = std::env::var("AUTSAI_DB_PATH").unwrap_or_else(|_| "autsai.db".into());
    let storage_dir = std::env::var("AUTSAI_STORAGE_DIR").unwrap_or_else(|_| "./storage".into());
    let host = std::env::var("AUTSAI_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("AUTSAI_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let public_url =
        std::env::var("AUTSAI_PUBLIC_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));
    let poll_secs: u64 = std::env::var("AUTSAI_POLL_INTERVAL_SECS")
        .unwrap_or_else(|_| "30".into())
        .parse()?;

    if jwt_secret.is_empty() || jwt_secret == PLACEHOLDER_SECRET {
        bail!("AUTSAI_JWT_SECRET must be set to a real secret");
    }
    if poll_secs == 0 {
        bail!("AUTSAI_POLL_INTERVAL_SECS must be at least 1");
    }

    // Init database and object storage
    let db = Database::open(&PathBuf::from(&db_path))?;
    let storage = Storage::new(PathBuf::from(&storage_dir), public_url).await?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner::new(
        Arc::new(db),
        Arc::new(storage),
        jwt_secret,
        Duration::from_secs(poll_secs),
    ));

    let app = autsai_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Autsai partner server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
