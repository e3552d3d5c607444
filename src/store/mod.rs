mod repository;
mod schema;
pub mod types;

use crate::error::PersistenceError;
use sqlx::SqlitePool;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use types::{Case, CaseWithResults, NewBinahSigma, NewCase, NewSefirotResult};

/// Storage seam for everything the gateway persists.
///
/// Object-safe so handlers and the analyzer hold an `Arc<dyn CaseRepository>`
/// instead of a process-wide database singleton. Connection lifecycle belongs
/// to the concrete store.
pub trait CaseRepository: Send + Sync {
    fn health_check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    /// Create a case and its dimension rows atomically.
    fn create_case_with_results(
        &self,
        case: NewCase,
        results: Vec<NewSefirotResult>,
    ) -> Pin<Box<dyn Future<Output = Result<Case, PersistenceError>> + Send + '_>>;

    /// Attach the optional comparative record to an existing case.
    fn insert_binah_sigma<'a>(
        &'a self,
        case_id: &'a str,
        sigma: NewBinahSigma,
    ) -> Pin<Box<dyn Future<Output = Result<(), PersistenceError>> + Send + 'a>>;

    /// Every case, newest first, with nested results.
    fn all_cases(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CaseWithResults>, PersistenceError>> + Send + '_>>;

    /// Exact-match lookup by unique name; `None` when absent.
    fn case_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<CaseWithResults>, PersistenceError>> + Send + 'a>>;

    /// Delete all rows across all three tables (reseed path).
    fn clear_all(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<(), PersistenceError>> + Send + '_>>;

    fn count_cases(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<usize, PersistenceError>> + Send + '_>>;
}

/// SQLite-backed case store.
pub struct SqliteCaseStore {
    pool: SqlitePool,
}

impl SqliteCaseStore {
    /// Open (or create) the database at `path`.
    pub async fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PersistenceError::Open(e.to_string()))?;
            }
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&url)
            .await
            .map_err(|e| PersistenceError::Open(e.to_string()))?;

        schema::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Open an in-memory database (used by tests and the seed dry-run).
    pub async fn in_memory() -> Result<Self, PersistenceError> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(|e| PersistenceError::Open(e.to_string()))?;
        schema::init_schema(&pool).await?;
        Ok(Self { pool })
    }
}

impl CaseRepository for SqliteCaseStore {
    fn health_check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move { repository::health_check(&self.pool).await })
    }

    fn create_case_with_results(
        &self,
        case: NewCase,
        results: Vec<NewSefirotResult>,
    ) -> Pin<Box<dyn Future<Output = Result<Case, PersistenceError>> + Send + '_>> {
        Box::pin(async move {
            repository::create_case_with_results(&self.pool, case, results).await
        })
    }

    fn insert_binah_sigma<'a>(
        &'a self,
        case_id: &'a str,
        sigma: NewBinahSigma,
    ) -> Pin<Box<dyn Future<Output = Result<(), PersistenceError>> + Send + 'a>> {
        Box::pin(async move { repository::insert_binah_sigma(&self.pool, case_id, sigma).await })
    }

    fn all_cases(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CaseWithResults>, PersistenceError>> + Send + '_>>
    {
        Box::pin(async move { repository::all_cases(&self.pool).await })
    }

    fn case_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<CaseWithResults>, PersistenceError>> + Send + 'a>>
    {
        Box::pin(async move { repository::case_by_name(&self.pool, name).await })
    }

    fn clear_all(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<(), PersistenceError>> + Send + '_>> {
        Box::pin(async move { repository::clear_all(&self.pool).await })
    }

    fn count_cases(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<usize, PersistenceError>> + Send + '_>> {
        Box::pin(async move { repository::count_cases(&self.pool).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sefirot::Sefira;
    use chrono::Utc;
    use serde_json::json;
    use strum::IntoEnumIterator;

    fn full_batch() -> Vec<NewSefirotResult> {
        Sefira::iter()
            .map(|sefira| NewSefirotResult {
                sefira,
                sefirot_number: i64::from(sefira.ordinal()),
                hebrew_name: sefira.hebrew_name().to_string(),
                scores: None,
                main_score: Some(sefira.demo_score()),
                analysis_data: json!({"understanding": format!("analysis for {sefira}")}),
                model_used: Some("gpt-4.1-mini".into()),
                timestamp: Utc::now(),
                activation_count: 1,
            })
            .collect()
    }

    fn new_case(name: &str) -> NewCase {
        NewCase {
            case_name: name.into(),
            scenario: "A decision about X".into(),
            timestamp: Utc::now(),
            execution_id: None,
        }
    }

    #[tokio::test]
    async fn health_check_passes() {
        let store = SqliteCaseStore::in_memory().await.unwrap();
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn create_and_fetch_by_name() {
        let store = SqliteCaseStore::in_memory().await.unwrap();
        store
            .create_case_with_results(new_case("Test_Case"), full_batch())
            .await
            .unwrap();

        let fetched = store.case_by_name("Test_Case").await.unwrap().unwrap();
        assert_eq!(fetched.case.case_name, "Test_Case");
        assert_eq!(fetched.sefirot_results.len(), 10);

        let ordinals: Vec<i64> = fetched
            .sefirot_results
            .iter()
            .map(|r| r.sefirot_number)
            .collect();
        assert_eq!(ordinals, (1..=10).collect::<Vec<_>>());
        assert_eq!(fetched.sefirot_results[0].sefira, "keter");
        assert_eq!(fetched.sefirot_results[9].sefira, "malchut");
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive_and_none_when_absent() {
        let store = SqliteCaseStore::in_memory().await.unwrap();
        store
            .create_case_with_results(new_case("Exact"), full_batch())
            .await
            .unwrap();

        assert!(store.case_by_name("exact").await.unwrap().is_none());
        assert!(store.case_by_name("Never_Created").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_ordinal_rolls_back_whole_case() {
        let store = SqliteCaseStore::in_memory().await.unwrap();
        let mut results = full_batch();
        results[9].sefirot_number = 1; // collides with keter

        let err = store
            .create_case_with_results(new_case("Broken"), results)
            .await;
        assert!(err.is_err());

        // Nothing partial is visible: the case itself is gone too.
        assert!(store.case_by_name("Broken").await.unwrap().is_none());
        assert_eq!(store.count_cases().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_case_name_is_rejected() {
        let store = SqliteCaseStore::in_memory().await.unwrap();
        store
            .create_case_with_results(new_case("Unique"), full_batch())
            .await
            .unwrap();
        let err = store
            .create_case_with_results(new_case("Unique"), full_batch())
            .await;
        assert!(err.is_err());
        assert_eq!(store.count_cases().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn all_cases_newest_first() {
        let store = SqliteCaseStore::in_memory().await.unwrap();
        let mut older = new_case("Older");
        older.timestamp = Utc::now() - chrono::Duration::hours(1);
        store
            .create_case_with_results(older, full_batch())
            .await
            .unwrap();
        store
            .create_case_with_results(new_case("Newer"), full_batch())
            .await
            .unwrap();

        let cases = store.all_cases().await.unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].case.case_name, "Newer");
        assert_eq!(cases[1].case.case_name, "Older");
    }

    #[tokio::test]
    async fn binah_sigma_attaches_to_case() {
        let store = SqliteCaseStore::in_memory().await.unwrap();
        let case = store
            .create_case_with_results(new_case("Sigma_Case"), full_batch())
            .await
            .unwrap();

        let sigma = NewBinahSigma {
            mode: "sigma".into(),
            west_perspective: "Western Liberal Democratic".into(),
            west_analysis: json!({"perspective": "Western Liberal Democratic"}),
            east_perspective: "Eastern Collective Harmony".into(),
            east_analysis: json!({"perspective": "Eastern Collective Harmony"}),
            sigma_synthesis: json!({"summary": "converges"}),
            bias_delta: 12.5,
            divergence_level: "moderate".into(),
            blind_spots_detected: 2,
            convergence_points: 5,
            contextual_depth_score: 85.0,
            model_west: Some("gpt-4.1-mini".into()),
            model_east: Some("qwen-max".into()),
            timestamp: Utc::now(),
        };
        store.insert_binah_sigma(&case.id, sigma).await.unwrap();

        let fetched = store.case_by_name("Sigma_Case").await.unwrap().unwrap();
        let sigma = fetched.binah_sigma.expect("sigma attached");
        assert_eq!(sigma.mode, "sigma");
        assert_eq!(sigma.blind_spots_detected, 2);
        assert!((sigma.bias_delta - 12.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn clear_all_empties_every_table() {
        let store = SqliteCaseStore::in_memory().await.unwrap();
        store
            .create_case_with_results(new_case("Doomed"), full_batch())
            .await
            .unwrap();
        store.clear_all().await.unwrap();

        assert_eq!(store.count_cases().await.unwrap(), 0);
        assert!(store.all_cases().await.unwrap().is_empty());
    }
}
