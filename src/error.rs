use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the Tikun Olam gateway.
///
/// Each subsystem defines its own error variant. Handlers match on these to
/// pick the HTTP status or stream event; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum TikunError {
    // ── Request validation ──────────────────────────────────────────────
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    // ── Lookup ──────────────────────────────────────────────────────────
    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    // ── Storage ─────────────────────────────────────────────────────────
    #[error("persistence: {0}")]
    Persistence(#[from] PersistenceError),

    // ── Stream consumer ─────────────────────────────────────────────────
    #[error("stream: {0}")]
    Stream(#[from] StreamProtocolError),

    // ── Config ──────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Validation errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
}

// ─── Lookup errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("case not found: {0}")]
    Case(String),
}

// ─── Storage errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("schema migration failed: {0}")]
    Migration(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("stored row is malformed: {0}")]
    Corrupt(String),
}

// ─── Stream-consumer errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StreamProtocolError {
    #[error("malformed event payload: {0}")]
    MalformedEvent(String),

    #[error("stream closed before terminal event")]
    Truncated,

    #[error("server reported failure: {0}")]
    Remote(String),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, TikunError>;
