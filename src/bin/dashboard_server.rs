//! Design token dashboard API
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin dashboard-server --features server -- --root ./web --port 4000
//!
//! curl http://localhost:4000/api/dashboard
//! curl http://localhost:4000/health
//! ```
//!
//! Reports older than `dashboard.stale_after_secs` are regenerated on request.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::Utc;
use clap::Parser;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use token_sync::dashboard::{DashboardService, DashboardSnapshot};
use token_sync::TokenSyncConfig;

#[derive(Parser)]
#[command(name = "dashboard-server")]
#[command(about = "Serve the aggregated token health dashboard")]
struct Args {
    #[arg(long, env = "TOKEN_SYNC_ROOT", default_value = ".")]
    root: PathBuf,

    #[arg(long, default_value = "4000")]
    port: u16,
}

type SharedService = Arc<Mutex<DashboardService>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = TokenSyncConfig::load(&args.root)
        .with_context(|| format!("Failed to load config from {}", args.root.display()))?;
    let service: SharedService = Arc::new(Mutex::new(DashboardService::new(&args.root, config)));

    let app = Router::new()
        .route("/api/dashboard", get(dashboard))
        .route("/health", get(health))
        .with_state(service)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Dashboard API listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn dashboard(
    State(service): State<SharedService>,
) -> Result<Json<DashboardSnapshot>, (StatusCode, Json<Value>)> {
    // scanning walks the filesystem, keep it off the async workers
    let result = tokio::task::spawn_blocking(move || {
        let mut service = service
            .lock()
            .map_err(|_| anyhow::anyhow!("dashboard state poisoned"))?;
        service.refresh_if_stale(Utc::now())?;
        Ok::<_, anyhow::Error>(service.snapshot()?)
    })
    .await;

    match result {
        Ok(Ok(snapshot)) => Ok(Json(snapshot)),
        Ok(Err(e)) => {
            tracing::error!("Dashboard refresh failed: {:#}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("{:#}", e) })),
            ))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}
