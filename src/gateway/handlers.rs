use super::streaming::{build_sse_response, spawn_producer};
use super::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Submission body for `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "caseName", default)]
    pub case_name: String,
    #[serde(default)]
    pub scenario: String,
}

/// `POST /analyze` — validate, then hand back a live event stream.
///
/// Both fields must be non-empty after trimming; otherwise a 400 with zero
/// rows written and no stream opened.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let case_name = request.case_name.trim();
    let scenario = request.scenario.trim();

    if case_name.is_empty() || scenario.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Case name and scenario are required" })),
        )
            .into_response();
    }

    tracing::info!(case_name, "analysis submitted");

    let rx = spawn_producer(
        Arc::clone(&state.analyzer),
        state.progress_steps,
        state.progress_interval,
        case_name.to_string(),
        scenario.to_string(),
    );
    build_sse_response(rx)
}

/// `GET /cases` — every case, newest first, with nested results.
pub async fn handle_cases(State(state): State<AppState>) -> impl IntoResponse {
    match state.repo.all_cases().await {
        Ok(cases) => (StatusCode::OK, Json(json!({ "cases": cases }))).into_response(),
        Err(error) => {
            tracing::error!(%error, "failed to fetch cases");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response()
        }
    }
}

/// `GET /cases/{name}` — exact-match lookup; 404 when absent.
pub async fn handle_case_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.repo.case_by_name(&name).await {
        Ok(Some(case)) => (StatusCode::OK, Json(json!({ "case": case }))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Case not found" })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(case_name = %name, %error, "failed to fetch case");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response()
        }
    }
}

/// `GET /health` — liveness plus a case count for quick diagnostics.
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    if !state.repo.health_check().await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded" })),
        )
            .into_response();
    }
    let cases = state.repo.count_cases().await.unwrap_or(0);
    (StatusCode::OK, Json(json!({ "status": "ok", "cases": cases }))).into_response()
}
