//! Persisted entities and their wire shapes.
//!
//! Serialized field names are camelCase to match the JSON API consumed by the
//! demo frontend (`caseName`, `mainScore`, `sefirotResults`, ...). Rows are
//! only ever created or bulk-deleted; nothing here is updated in place.

use crate::sefirot::Sefira;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One submitted scenario under analysis, identified by its unique name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub case_name: String,
    pub scenario: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<i64>,
}

/// One of the ten per-case dimension rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SefirotResult {
    pub id: String,
    pub case_id: String,
    pub sefira: String,
    pub sefirot_number: i64,
    pub hebrew_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Value>,
    pub main_score: Option<f64>,
    pub analysis_data: Value,
    pub model_used: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub activation_count: i64,
}

/// Optional dual-perspective comparison attached to a case (zero or one).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinahSigma {
    pub id: String,
    pub case_id: String,
    pub mode: String,
    pub west_perspective: String,
    pub west_analysis: Value,
    pub east_perspective: String,
    pub east_analysis: Value,
    pub sigma_synthesis: Value,
    pub bias_delta: f64,
    pub divergence_level: String,
    pub blind_spots_detected: i64,
    pub convergence_points: i64,
    pub contextual_depth_score: f64,
    pub model_west: Option<String>,
    pub model_east: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A case together with its nested results, as returned by the lookup API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseWithResults {
    #[serde(flatten)]
    pub case: Case,
    pub sefirot_results: Vec<SefirotResult>,
    pub binah_sigma: Option<BinahSigma>,
}

// ─── Insert inputs ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewCase {
    pub case_name: String,
    pub scenario: String,
    pub timestamp: DateTime<Utc>,
    pub execution_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewSefirotResult {
    pub sefira: Sefira,
    pub sefirot_number: i64,
    pub hebrew_name: String,
    pub scores: Option<Value>,
    pub main_score: Option<f64>,
    pub analysis_data: Value,
    pub model_used: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub activation_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewBinahSigma {
    pub mode: String,
    pub west_perspective: String,
    pub west_analysis: Value,
    pub east_perspective: String,
    pub east_analysis: Value,
    pub sigma_synthesis: Value,
    pub bias_delta: f64,
    pub divergence_level: String,
    pub blind_spots_detected: i64,
    pub convergence_points: i64,
    pub contextual_depth_score: f64,
    pub model_west: Option<String>,
    pub model_east: Option<String>,
    pub timestamp: DateTime<Utc>,
}
