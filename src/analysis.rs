//! The Result Producer seam.
//!
//! The demo gateway stands in for an external orchestrator; everything behind
//! [`Analyzer`] can be swapped for the real engine without touching the
//! streaming contract.

use crate::error::PersistenceError;
use crate::sefirot::Sefira;
use crate::store::types::{NewCase, NewSefirotResult};
use crate::store::CaseRepository;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Summary payload carried by the stream's completion event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub case_name: String,
    pub completed: bool,
}

/// Capability interface for producing one case's ten dimension rows.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn produce(
        &self,
        case_name: &str,
        scenario: &str,
    ) -> Result<AnalysisOutcome, PersistenceError>;
}

/// Deterministic stand-in for the external orchestrator.
///
/// Writes one case plus ten fixed-score results through the repository, in
/// canonical dimension order, inside a single transaction.
pub struct MockOrchestrator {
    repo: Arc<dyn CaseRepository>,
    model: String,
}

impl MockOrchestrator {
    pub fn new(repo: Arc<dyn CaseRepository>) -> Self {
        Self {
            repo,
            model: "gpt-4.1-mini".into(),
        }
    }
}

#[async_trait]
impl Analyzer for MockOrchestrator {
    async fn produce(
        &self,
        case_name: &str,
        scenario: &str,
    ) -> Result<AnalysisOutcome, PersistenceError> {
        let now = Utc::now();

        let results: Vec<NewSefirotResult> = Sefira::iter()
            .map(|sefira| NewSefirotResult {
                sefira,
                sefirot_number: i64::from(sefira.ordinal()),
                hebrew_name: sefira.hebrew_name().to_string(),
                scores: None,
                main_score: Some(sefira.demo_score()),
                analysis_data: json!({
                    "understanding": format!("Mock analysis for {sefira}"),
                    "reasoning": "This is a simulated analysis result.",
                }),
                model_used: Some(self.model.clone()),
                timestamp: now,
                activation_count: 1,
            })
            .collect();

        let case = NewCase {
            case_name: case_name.to_string(),
            scenario: scenario.to_string(),
            timestamp: now,
            execution_id: None,
        };

        let created = self.repo.create_case_with_results(case, results).await?;
        tracing::info!(case_name = %created.case_name, case_id = %created.id, "analysis persisted");

        Ok(AnalysisOutcome {
            case_name: created.case_name,
            completed: true,
        })
    }
}
