//! Bulk loader: replace everything in the store with the fixture set.
//!
//! Each fixture file carries a `metadata` block and a `sefirot_results` map
//! keyed by dimension. Loading clears all three tables first, so replaying
//! the loader is idempotent.

use crate::sefirot::Sefira;
use crate::store::types::{NewBinahSigma, NewCase, NewSefirotResult};
use crate::store::CaseRepository;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use strum::IntoEnumIterator;

#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub metadata: FixtureMetadata,
    #[serde(default)]
    pub sefirot_results: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureMetadata {
    pub case_name: String,
    pub scenario: String,
    #[serde(default)]
    pub execution_id: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub cases: usize,
    pub results: usize,
    pub sigmas: usize,
}

/// Clear the store, then recreate it from every `*.json` file in `data_dir`.
pub async fn run_seed(repo: &dyn CaseRepository, data_dir: &Path) -> Result<SeedSummary> {
    let mut paths: Vec<_> = std::fs::read_dir(data_dir)
        .with_context(|| format!("read data dir {}", data_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    tracing::info!(fixtures = paths.len(), "clearing existing data");
    repo.clear_all().await?;

    let mut summary = SeedSummary::default();
    for path in &paths {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read fixture {}", path.display()))?;
        let fixture: Fixture = serde_json::from_str(&raw)
            .with_context(|| format!("parse fixture {}", path.display()))?;

        let (results, sigma) = seed_case(repo, &fixture).await?;
        summary.cases += 1;
        summary.results += results;
        summary.sigmas += usize::from(sigma);
        tracing::info!(
            case_name = %fixture.metadata.case_name,
            results,
            sigma,
            "fixture seeded"
        );
    }

    Ok(summary)
}

/// Create one case (plus optional sigma record) from a parsed fixture.
pub async fn seed_case(repo: &dyn CaseRepository, fixture: &Fixture) -> Result<(usize, bool)> {
    let metadata = &fixture.metadata;
    let case = NewCase {
        case_name: metadata.case_name.clone(),
        scenario: metadata.scenario.clone(),
        timestamp: parse_timestamp(metadata.timestamp.as_deref()),
        execution_id: metadata.execution_id,
    };

    let mut results = Vec::new();
    for sefira in Sefira::iter() {
        let Some(blob) = fixture.sefirot_results.get(&sefira.to_string()) else {
            continue;
        };
        // Dimensions that errored upstream are exported with an `error` key.
        if blob.get("error").is_some() {
            continue;
        }
        results.push(result_from_blob(sefira, blob));
    }

    let result_count = results.len();
    let created = repo.create_case_with_results(case, results).await?;

    let sigma = fixture
        .sefirot_results
        .get("binah")
        .filter(|blob| blob.get("mode").and_then(Value::as_str) == Some("sigma"))
        .map(sigma_from_blob);
    let has_sigma = sigma.is_some();
    if let Some(sigma) = sigma {
        repo.insert_binah_sigma(&created.id, sigma).await?;
    }

    Ok((result_count, has_sigma))
}

fn result_from_blob(sefira: Sefira, blob: &Value) -> NewSefirotResult {
    let main_score = blob.get(sefira.score_key()).and_then(Value::as_f64);
    // Sub-score breakdowns are only exported for keter.
    let scores = (sefira == Sefira::Keter)
        .then(|| blob.get("scores").filter(|s| !s.is_null()).cloned())
        .flatten();

    NewSefirotResult {
        sefira,
        sefirot_number: blob
            .get("sefira_number")
            .and_then(Value::as_i64)
            .unwrap_or_else(|| i64::from(sefira.ordinal())),
        hebrew_name: blob
            .get("hebrew_name")
            .and_then(Value::as_str)
            .unwrap_or(sefira.hebrew_name())
            .to_string(),
        scores,
        main_score,
        analysis_data: blob.clone(),
        model_used: blob
            .get("model_used")
            .or_else(|| blob.get("model_west"))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        timestamp: parse_timestamp(blob.get("timestamp").and_then(Value::as_str)),
        activation_count: blob
            .get("activation_count")
            .and_then(Value::as_i64)
            .unwrap_or(1),
    }
}

fn sigma_from_blob(blob: &Value) -> NewBinahSigma {
    let perspective_of = |analysis: &Value, fallback: &str| {
        analysis
            .get("perspective")
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    };
    let west = blob.get("west_analysis").cloned().unwrap_or(Value::Object(Default::default()));
    let east = blob.get("east_analysis").cloned().unwrap_or(Value::Object(Default::default()));

    NewBinahSigma {
        mode: "sigma".into(),
        west_perspective: perspective_of(&west, "Western Liberal Democratic"),
        east_perspective: perspective_of(&east, "Eastern Collective Harmony"),
        west_analysis: west,
        east_analysis: east,
        sigma_synthesis: blob
            .get("sigma_synthesis")
            .cloned()
            .unwrap_or(Value::Object(Default::default())),
        bias_delta: blob.get("bias_delta").and_then(Value::as_f64).unwrap_or(0.0),
        divergence_level: blob
            .get("divergence_level")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        blind_spots_detected: blob
            .get("blind_spots_detected")
            .and_then(Value::as_i64)
            .unwrap_or(0),
        convergence_points: blob
            .get("convergence_points")
            .and_then(Value::as_i64)
            .unwrap_or(0),
        contextual_depth_score: blob
            .get("contextual_depth_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        model_west: blob
            .get("model_west")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        model_east: blob
            .get("model_east")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        timestamp: parse_timestamp(blob.get("timestamp").and_then(Value::as_str)),
    }
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc))
}
