//! The progress streamer: a tagged-event channel feeding an SSE body.
//!
//! One producer task per submission walks `streaming-progress →
//! producing-result → {completed | failed}`; the response side is a
//! single-threaded loop draining the receiver and framing `data:` lines.
//! Both halves stop at the first failed send, so a client disconnect tears
//! the channel down without further work.

use crate::analysis::{AnalysisOutcome, Analyzer};
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Literal end-of-stream marker; only emitted after a completion event.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Wire events for one submission, tagged by `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisEvent {
    Processing { message: String },
    Completed { result: AnalysisOutcome },
    Error { message: String },
}

impl AnalysisEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing { .. })
    }
}

pub fn progress_message(step: u32, total: u32) -> String {
    format!("Analyzing through Sefirot {step}/{total}...")
}

/// Spawn the per-request producer task and hand back its event receiver.
///
/// Emits exactly `steps` progress events at `interval` cadence, then invokes
/// the analyzer once and emits a single terminal event.
pub fn spawn_producer(
    analyzer: Arc<dyn Analyzer>,
    steps: u32,
    interval: Duration,
    case_name: String,
    scenario: String,
) -> mpsc::Receiver<AnalysisEvent> {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        for step in 1..=steps {
            let event = AnalysisEvent::Processing {
                message: progress_message(step, steps),
            };
            if tx.send(event).await.is_err() {
                // Client went away; skip the analyzer entirely.
                tracing::debug!(%case_name, step, "stream receiver dropped, aborting");
                return;
            }
            tokio::time::sleep(interval).await;
        }

        let terminal = match analyzer.produce(&case_name, &scenario).await {
            Ok(result) => AnalysisEvent::Completed { result },
            Err(error) => {
                tracing::warn!(%case_name, %error, "analysis failed");
                AnalysisEvent::Error {
                    message: error.to_string(),
                }
            }
        };
        let _ = tx.send(terminal).await;
    });

    rx
}

/// Assemble the `text/event-stream` response from an event receiver.
///
/// The sentinel line follows a completion event only; an error event closes
/// the stream without it, and so does an upstream channel drop.
pub fn build_sse_response(mut rx: mpsc::Receiver<AnalysisEvent>) -> Response<Body> {
    let stream = async_stream::stream! {
        let mut completed = false;
        while let Some(event) = rx.recv().await {
            let terminal = event.is_terminal();
            completed = matches!(event, AnalysisEvent::Completed { .. });
            if let Ok(json) = serde_json::to_string(&event) {
                yield Ok::<_, std::convert::Infallible>(format!("data: {json}\n\n"));
            }
            if terminal {
                break;
            }
        }
        if completed {
            yield Ok(format!("data: {DONE_SENTINEL}\n\n"));
        }
    };

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/event-stream"),
    );
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-cache"),
    );
    response.headers_mut().insert(
        header::CONNECTION,
        header::HeaderValue::from_static("keep-alive"),
    );
    response
}
