//! Streaming client consumer for the `analyze` subcommand.
//!
//! Decodes the SSE byte stream incrementally: split on line boundaries,
//! buffer the incomplete trailing fragment across reads, and parse each
//! `data:` line. Progress is capped below completion until the terminal
//! event arrives, and a stream that closes without one is an error.

use crate::error::StreamProtocolError;
use anyhow::{bail, Context, Result};
use futures_util::StreamExt;
use serde_json::{json, Value};

/// Progress ceiling while still processing; only a completion event may
/// push the bar to 100.
pub const PROGRESS_CAP: u8 = 95;
/// Advance per processing event; ten events saturate at the cap.
pub const PROGRESS_STEP: u8 = 10;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Incremental SSE consumer state. Pure; fed raw bytes by the transport.
#[derive(Debug, Default)]
pub struct StreamConsumer {
    buffer: String,
    progress: u8,
    result: Option<Value>,
    error: Option<String>,
    saw_sentinel: bool,
    halted: bool,
}

impl StreamConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// True once no further reads are useful (sentinel seen or error event).
    pub fn is_finished(&self) -> bool {
        self.saw_sentinel || self.halted
    }

    /// Feed one transport chunk; complete lines are consumed, the trailing
    /// fragment stays buffered for the next read.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.is_finished() {
            return;
        }
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            self.handle_line(line.trim_end());
            if self.is_finished() {
                return;
            }
        }
    }

    fn handle_line(&mut self, line: &str) {
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return; // blank separators and comments
        };
        if payload == DONE_SENTINEL {
            self.saw_sentinel = true;
            return;
        }

        let event: Value = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(error) => {
                // Malformed payloads are logged and skipped, never fatal.
                tracing::warn!(%error, payload, "skipping malformed stream event");
                return;
            }
        };

        match event.get("status").and_then(Value::as_str) {
            Some("processing") => {
                if self.result.is_none() {
                    self.progress = self.progress.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
                }
            }
            Some("completed") => {
                self.result = event.get("result").cloned();
                self.progress = 100;
            }
            Some("error") => {
                self.error = Some(
                    event
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("analysis failed")
                        .to_string(),
                );
                self.halted = true;
            }
            _ => {
                tracing::warn!(payload, "skipping event with unknown status");
            }
        }
    }

    /// Terminal assessment once the transport is exhausted.
    pub fn finish(self) -> std::result::Result<Value, StreamProtocolError> {
        if let Some(message) = self.error {
            return Err(StreamProtocolError::Remote(message));
        }
        match (self.saw_sentinel, self.result) {
            (true, Some(result)) => Ok(result),
            // Closure without the sentinel is the dangling-connection path.
            _ => Err(StreamProtocolError::Truncated),
        }
    }
}

/// Submit a case and consume the progress stream, printing updates.
pub async fn run_analysis(base_url: &str, case_name: &str, scenario: &str) -> Result<Value> {
    let url = format!("{}/analyze", base_url.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({ "caseName": case_name, "scenario": scenario }))
        .send()
        .await
        .with_context(|| format!("POST {url}"))?;

    if !response.status().is_success() {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or_default();
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("submission rejected");
        bail!("server returned {status}: {message}");
    }

    let mut consumer = StreamConsumer::new();
    let mut shown = 0u8;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("read stream chunk")?;
        consumer.feed(&chunk);
        if consumer.progress() != shown {
            shown = consumer.progress();
            println!("  … {shown}%");
        }
        if consumer.is_finished() {
            break;
        }
    }

    let result = consumer.finish()?;
    println!("✓ analysis complete for '{case_name}'");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processing_line(i: u32) -> String {
        format!("data: {{\"status\":\"processing\",\"message\":\"Analyzing through Sefirot {i}/10...\"}}\n\n")
    }

    #[test]
    fn progress_is_capped_below_completion() {
        let mut consumer = StreamConsumer::new();
        for i in 1..=10 {
            consumer.feed(processing_line(i).as_bytes());
        }
        assert_eq!(consumer.progress(), PROGRESS_CAP);
        assert!(!consumer.is_finished());
    }

    #[test]
    fn completion_sets_full_progress_and_result() {
        let mut consumer = StreamConsumer::new();
        consumer.feed(processing_line(1).as_bytes());
        consumer.feed(
            b"data: {\"status\":\"completed\",\"result\":{\"caseName\":\"X\",\"completed\":true}}\n\n",
        );
        consumer.feed(b"data: [DONE]\n\n");

        assert_eq!(consumer.progress(), 100);
        assert!(consumer.is_finished());
        let result = consumer.finish().unwrap();
        assert_eq!(result["caseName"], "X");
    }

    #[test]
    fn trailing_fragment_is_buffered_across_reads() {
        let mut consumer = StreamConsumer::new();
        let line = processing_line(1);
        let (head, tail) = line.split_at(17); // mid-JSON split
        consumer.feed(head.as_bytes());
        assert_eq!(consumer.progress(), 0);
        consumer.feed(tail.as_bytes());
        assert_eq!(consumer.progress(), PROGRESS_STEP);
    }

    #[test]
    fn malformed_json_is_skipped_not_fatal() {
        let mut consumer = StreamConsumer::new();
        consumer.feed(b"data: {not json}\n\n");
        consumer.feed(processing_line(1).as_bytes());
        assert_eq!(consumer.progress(), PROGRESS_STEP);
        assert!(!consumer.is_finished());
    }

    #[test]
    fn error_event_halts_further_reads() {
        let mut consumer = StreamConsumer::new();
        consumer.feed(b"data: {\"status\":\"error\",\"message\":\"write failed: disk full\"}\n\n");
        assert!(consumer.is_finished());

        // Anything after the error is ignored.
        consumer.feed(processing_line(1).as_bytes());
        assert_eq!(consumer.progress(), 0);

        let err = consumer.finish().unwrap_err();
        assert!(matches!(err, StreamProtocolError::Remote(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn closure_without_sentinel_is_truncation() {
        let mut consumer = StreamConsumer::new();
        consumer.feed(processing_line(1).as_bytes());
        // Transport ends here: no completed event, no [DONE].
        let err = consumer.finish().unwrap_err();
        assert!(matches!(err, StreamProtocolError::Truncated));
    }

    #[test]
    fn completion_without_sentinel_is_still_truncation() {
        let mut consumer = StreamConsumer::new();
        consumer.feed(
            b"data: {\"status\":\"completed\",\"result\":{\"caseName\":\"X\",\"completed\":true}}\n\n",
        );
        let err = consumer.finish().unwrap_err();
        assert!(matches!(err, StreamProtocolError::Truncated));
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let mut consumer = StreamConsumer::new();
        consumer.feed(b": keep-alive comment\n\nretry: 500\n");
        assert_eq!(consumer.progress(), 0);
        assert!(!consumer.is_finished());
    }
}
