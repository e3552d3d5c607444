use crate::error::PersistenceError;
use sqlx::SqlitePool;

/// Create all tables and indexes if they do not exist.
///
/// JSON payloads (`scores`, `analysis_data`, the sigma analyses) are stored as
/// TEXT and decoded at the repository boundary. Timestamps are RFC 3339 text.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), PersistenceError> {
    sqlx::raw_sql(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS cases (
            id           TEXT PRIMARY KEY,
            case_name    TEXT NOT NULL UNIQUE,
            scenario     TEXT NOT NULL,
            timestamp    TEXT NOT NULL,
            execution_id INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_cases_timestamp ON cases(timestamp DESC);

        CREATE TABLE IF NOT EXISTS sefirot_results (
            id               TEXT PRIMARY KEY,
            case_id          TEXT NOT NULL REFERENCES cases(id) ON DELETE CASCADE,
            sefira           TEXT NOT NULL,
            sefirot_number   INTEGER NOT NULL,
            hebrew_name      TEXT NOT NULL,
            scores           TEXT,
            main_score       REAL,
            analysis_data    TEXT NOT NULL,
            model_used       TEXT,
            timestamp        TEXT NOT NULL,
            activation_count INTEGER NOT NULL DEFAULT 1,
            UNIQUE(case_id, sefirot_number)
        );
        CREATE INDEX IF NOT EXISTS idx_sefirot_results_case ON sefirot_results(case_id);

        CREATE TABLE IF NOT EXISTS binah_sigma (
            id                     TEXT PRIMARY KEY,
            case_id                TEXT NOT NULL UNIQUE REFERENCES cases(id) ON DELETE CASCADE,
            mode                   TEXT NOT NULL,
            west_perspective       TEXT NOT NULL,
            west_analysis          TEXT NOT NULL,
            east_perspective       TEXT NOT NULL,
            east_analysis          TEXT NOT NULL,
            sigma_synthesis        TEXT NOT NULL,
            bias_delta             REAL NOT NULL DEFAULT 0,
            divergence_level       TEXT NOT NULL DEFAULT 'unknown',
            blind_spots_detected   INTEGER NOT NULL DEFAULT 0,
            convergence_points     INTEGER NOT NULL DEFAULT 0,
            contextual_depth_score REAL NOT NULL DEFAULT 0,
            model_west             TEXT,
            model_east             TEXT,
            timestamp              TEXT NOT NULL
        );",
    )
    .execute(pool)
    .await
    .map_err(|e| PersistenceError::Migration(e.to_string()))?;

    Ok(())
}
