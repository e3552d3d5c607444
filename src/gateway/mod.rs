//! Axum-based HTTP gateway.
//!
//! Serves the submission stream and the lookup endpoints, with body limits
//! and request timeouts on every route. All shared state is injected through
//! [`AppState`]; there is no process-wide store handle.

pub mod handlers;
pub mod streaming;

use crate::analysis::{Analyzer, MockOrchestrator};
use crate::config::Config;
use crate::store::{CaseRepository, SqliteCaseStore};
use anyhow::Result;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use handlers::{handle_analyze, handle_case_by_name, handle_cases, handle_health};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB) — a submission is a name plus a scenario.
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s). The SSE body streams after the response is
/// produced, so the demo cadence (10 × 300ms) is unaffected by this.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn CaseRepository>,
    pub analyzer: Arc<dyn Analyzer>,
    pub progress_steps: u32,
    pub progress_interval: Duration,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn CaseRepository>,
        analyzer: Arc<dyn Analyzer>,
        config: &Config,
    ) -> Self {
        Self {
            repo,
            analyzer,
            progress_steps: config.analysis.progress_steps,
            progress_interval: Duration::from_millis(config.analysis.progress_interval_ms),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/analyze", post(handle_analyze))
        .route("/cases", get(handle_cases))
        .route("/cases/{name}", get(handle_case_by_name))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

/// Run the HTTP gateway: open the store, wire the mock orchestrator, serve.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_gateway_with_listener(listener, config).await
}

/// Run the gateway from a pre-bound listener (tests bind port 0 first).
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let repo: Arc<dyn CaseRepository> =
        Arc::new(SqliteCaseStore::open(Path::new(&config.storage.database_path)).await?);
    let analyzer: Arc<dyn Analyzer> = Arc::new(MockOrchestrator::new(Arc::clone(&repo)));
    let state = AppState::new(repo, analyzer, &config);

    let addr = listener.local_addr()?;
    tracing::info!(%addr, db = %config.storage.database_path, "gateway listening");
    println!("◆ Tikun Olam gateway listening on http://{addr}");
    println!("  POST /analyze        → text/event-stream");
    println!("  GET  /cases          → all cases, newest first");
    println!("  GET  /cases/{{name}}   → one case by unique name");
    println!("  GET  /health");
    println!("  Press Ctrl+C to stop\n");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
