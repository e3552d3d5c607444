use super::types::{
    BinahSigma, Case, CaseWithResults, NewBinahSigma, NewCase, NewSefirotResult, SefirotResult,
};
use crate::error::PersistenceError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

pub async fn health_check(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
}

/// Insert a case and all of its dimension rows in one transaction.
///
/// All-or-nothing: a failure on any row rolls back the case as well, so a
/// partial batch never becomes visible.
pub async fn create_case_with_results(
    pool: &SqlitePool,
    case: NewCase,
    results: Vec<NewSefirotResult>,
) -> Result<Case, PersistenceError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| PersistenceError::Write(e.to_string()))?;

    let case_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO cases (id, case_name, scenario, timestamp, execution_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&case_id)
    .bind(&case.case_name)
    .bind(&case.scenario)
    .bind(case.timestamp.to_rfc3339())
    .bind(case.execution_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| PersistenceError::Write(format!("case {}: {e}", case.case_name)))?;

    for result in &results {
        let scores = result
            .scores
            .as_ref()
            .map(Value::to_string);
        sqlx::query(
            "INSERT INTO sefirot_results
                 (id, case_id, sefira, sefirot_number, hebrew_name, scores, main_score,
                  analysis_data, model_used, timestamp, activation_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&case_id)
        .bind(result.sefira.to_string())
        .bind(result.sefirot_number)
        .bind(&result.hebrew_name)
        .bind(scores)
        .bind(result.main_score)
        .bind(result.analysis_data.to_string())
        .bind(&result.model_used)
        .bind(result.timestamp.to_rfc3339())
        .bind(result.activation_count)
        .execute(&mut *tx)
        .await
        .map_err(|e| PersistenceError::Write(format!("result {}: {e}", result.sefira)))?;
    }

    tx.commit()
        .await
        .map_err(|e| PersistenceError::Write(e.to_string()))?;

    Ok(Case {
        id: case_id,
        case_name: case.case_name,
        scenario: case.scenario,
        timestamp: case.timestamp,
        execution_id: case.execution_id,
    })
}

pub async fn insert_binah_sigma(
    pool: &SqlitePool,
    case_id: &str,
    sigma: NewBinahSigma,
) -> Result<(), PersistenceError> {
    sqlx::query(
        "INSERT INTO binah_sigma
             (id, case_id, mode, west_perspective, west_analysis, east_perspective,
              east_analysis, sigma_synthesis, bias_delta, divergence_level,
              blind_spots_detected, convergence_points, contextual_depth_score,
              model_west, model_east, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(case_id)
    .bind(&sigma.mode)
    .bind(&sigma.west_perspective)
    .bind(sigma.west_analysis.to_string())
    .bind(&sigma.east_perspective)
    .bind(sigma.east_analysis.to_string())
    .bind(sigma.sigma_synthesis.to_string())
    .bind(sigma.bias_delta)
    .bind(&sigma.divergence_level)
    .bind(sigma.blind_spots_detected)
    .bind(sigma.convergence_points)
    .bind(sigma.contextual_depth_score)
    .bind(&sigma.model_west)
    .bind(&sigma.model_east)
    .bind(sigma.timestamp.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| PersistenceError::Write(format!("binah_sigma for {case_id}: {e}")))?;

    Ok(())
}

/// Every case, newest first, with nested results ordered by ordinal.
pub async fn all_cases(pool: &SqlitePool) -> Result<Vec<CaseWithResults>, PersistenceError> {
    let rows = sqlx::query("SELECT * FROM cases ORDER BY timestamp DESC")
        .fetch_all(pool)
        .await
        .map_err(|e| PersistenceError::Query(e.to_string()))?;

    let mut cases = Vec::with_capacity(rows.len());
    for row in rows {
        let case = case_from_row(&row)?;
        cases.push(attach_relations(pool, case).await?);
    }
    Ok(cases)
}

/// Case-sensitive exact match on the unique name; `None` when absent.
pub async fn case_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<CaseWithResults>, PersistenceError> {
    let row = sqlx::query("SELECT * FROM cases WHERE case_name = ?1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(|e| PersistenceError::Query(e.to_string()))?;

    match row {
        Some(row) => {
            let case = case_from_row(&row)?;
            Ok(Some(attach_relations(pool, case).await?))
        }
        None => Ok(None),
    }
}

/// Delete everything, children first (reseed path).
pub async fn clear_all(pool: &SqlitePool) -> Result<(), PersistenceError> {
    sqlx::raw_sql(
        "DELETE FROM binah_sigma;
         DELETE FROM sefirot_results;
         DELETE FROM cases;",
    )
    .execute(pool)
    .await
    .map_err(|e| PersistenceError::Write(e.to_string()))?;
    Ok(())
}

pub async fn count_cases(pool: &SqlitePool) -> Result<usize, PersistenceError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cases")
        .fetch_one(pool)
        .await
        .map_err(|e| PersistenceError::Query(e.to_string()))?;
    usize::try_from(count).map_err(|e| PersistenceError::Corrupt(e.to_string()))
}

async fn attach_relations(
    pool: &SqlitePool,
    case: Case,
) -> Result<CaseWithResults, PersistenceError> {
    let result_rows = sqlx::query(
        "SELECT * FROM sefirot_results WHERE case_id = ?1 ORDER BY sefirot_number ASC",
    )
    .bind(&case.id)
    .fetch_all(pool)
    .await
    .map_err(|e| PersistenceError::Query(e.to_string()))?;

    let mut sefirot_results = Vec::with_capacity(result_rows.len());
    for row in &result_rows {
        sefirot_results.push(result_from_row(row)?);
    }

    let sigma_row = sqlx::query("SELECT * FROM binah_sigma WHERE case_id = ?1")
        .bind(&case.id)
        .fetch_optional(pool)
        .await
        .map_err(|e| PersistenceError::Query(e.to_string()))?;
    let binah_sigma = sigma_row.as_ref().map(sigma_from_row).transpose()?;

    Ok(CaseWithResults {
        case,
        sefirot_results,
        binah_sigma,
    })
}

// ─── Row decoding ────────────────────────────────────────────────────────────

fn case_from_row(row: &SqliteRow) -> Result<Case, PersistenceError> {
    Ok(Case {
        id: get(row, "id")?,
        case_name: get(row, "case_name")?,
        scenario: get(row, "scenario")?,
        timestamp: parse_timestamp(&get::<String>(row, "timestamp")?)?,
        execution_id: get(row, "execution_id")?,
    })
}

fn result_from_row(row: &SqliteRow) -> Result<SefirotResult, PersistenceError> {
    let scores: Option<String> = get(row, "scores")?;
    Ok(SefirotResult {
        id: get(row, "id")?,
        case_id: get(row, "case_id")?,
        sefira: get(row, "sefira")?,
        sefirot_number: get(row, "sefirot_number")?,
        hebrew_name: get(row, "hebrew_name")?,
        scores: scores.as_deref().map(parse_json).transpose()?,
        main_score: get(row, "main_score")?,
        analysis_data: parse_json(&get::<String>(row, "analysis_data")?)?,
        model_used: get(row, "model_used")?,
        timestamp: parse_timestamp(&get::<String>(row, "timestamp")?)?,
        activation_count: get(row, "activation_count")?,
    })
}

fn sigma_from_row(row: &SqliteRow) -> Result<BinahSigma, PersistenceError> {
    Ok(BinahSigma {
        id: get(row, "id")?,
        case_id: get(row, "case_id")?,
        mode: get(row, "mode")?,
        west_perspective: get(row, "west_perspective")?,
        west_analysis: parse_json(&get::<String>(row, "west_analysis")?)?,
        east_perspective: get(row, "east_perspective")?,
        east_analysis: parse_json(&get::<String>(row, "east_analysis")?)?,
        sigma_synthesis: parse_json(&get::<String>(row, "sigma_synthesis")?)?,
        bias_delta: get(row, "bias_delta")?,
        divergence_level: get(row, "divergence_level")?,
        blind_spots_detected: get(row, "blind_spots_detected")?,
        convergence_points: get(row, "convergence_points")?,
        contextual_depth_score: get(row, "contextual_depth_score")?,
        model_west: get(row, "model_west")?,
        model_east: get(row, "model_east")?,
        timestamp: parse_timestamp(&get::<String>(row, "timestamp")?)?,
    })
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, PersistenceError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| PersistenceError::Corrupt(format!("{column}: {e}")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PersistenceError::Corrupt(format!("timestamp {raw}: {e}")))
}

fn parse_json(raw: &str) -> Result<Value, PersistenceError> {
    serde_json::from_str(raw).map_err(|e| PersistenceError::Corrupt(format!("json payload: {e}")))
}
