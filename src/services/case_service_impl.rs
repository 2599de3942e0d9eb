//! `SeaORM` implementation of the `CaseService` trait.

use crate::clients::{CaseSource, ScrapeError};
use crate::constants::limits::RECENT_CASES;
use crate::db::{NewSearch, Store};
use crate::domain::{CaseId, CaseStatus, SearchQuery, current_year};
use crate::models::{CaseRecord, Dashboard, HistoryPage, ScrapedCase};
use crate::services::case_service::{CaseError, CaseService, FailureKind, SearchOutcome};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// SeaORM-based implementation of [`CaseService`].
pub struct SeaOrmCaseService {
    store: Store,
    source: Arc<dyn CaseSource>,
    case_types: Vec<String>,
}

impl SeaOrmCaseService {
    /// Creates a new instance of the service.
    #[must_use]
    pub fn new(store: Store, source: Arc<dyn CaseSource>, case_types: Vec<String>) -> Self {
        Self {
            store,
            source,
            case_types,
        }
    }

    async fn record(
        &self,
        query: &SearchQuery,
        scraped: &Result<ScrapedCase, ScrapeError>,
    ) -> Result<CaseId, CaseError> {
        let (status, payload, case) = match scraped {
            Ok(case) => (
                CaseStatus::Found,
                json!({ "success": true, "case": case }),
                Some(case),
            ),
            Err(ScrapeError::NotFound) => (
                CaseStatus::NotFound,
                json!({ "success": false, "error": ScrapeError::NotFound.to_string() }),
                None,
            ),
            Err(e) => (
                CaseStatus::Error,
                json!({ "success": false, "error": e.to_string() }),
                None,
            ),
        };

        let case_id = self
            .store
            .insert_search(NewSearch {
                query,
                status,
                response_data: Some(payload.to_string()),
                scraped: case,
            })
            .await
            .inspect_err(|e| error!(query = %query, error = %e, "Failed to record search"))?;

        Ok(case_id)
    }
}

#[async_trait::async_trait]
impl CaseService for SeaOrmCaseService {
    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, CaseError> {
        let scraped = self.source.fetch_case(query).await;
        let case_id = self.record(query, &scraped).await?;

        let outcome = match scraped {
            Ok(_) => {
                let record = self
                    .store
                    .get_case_record(case_id)
                    .await?
                    .ok_or(CaseError::CaseNotFound(case_id))?;
                SearchOutcome::Found(record)
            }
            Err(ScrapeError::NotFound) => SearchOutcome::NotFound { case_id },
            Err(e) => {
                warn!(case_id = case_id.value(), query = %query, error = %e, "Court search failed");
                let kind = if e.is_network() {
                    FailureKind::Unreachable
                } else {
                    FailureKind::Unreadable
                };
                SearchOutcome::Failed {
                    case_id,
                    kind,
                    message: e.to_string(),
                }
            }
        };

        metrics::counter!("court_searches_total", "outcome" => outcome.status().as_str())
            .increment(1);

        info!(
            event = "case_search_recorded",
            case_id = case_id.value(),
            query = %query,
            outcome = %outcome.status(),
            "Search recorded"
        );

        Ok(outcome)
    }

    async fn retry(&self, id: CaseId) -> Result<SearchOutcome, CaseError> {
        let case = self
            .store
            .get_case(id)
            .await?
            .ok_or(CaseError::CaseNotFound(id))?;

        let query = SearchQuery::parse(
            &case.case_type,
            &case.case_number,
            &case.filing_year.to_string(),
            &self.case_types,
            current_year(),
        )?;

        info!(case_id = id.value(), query = %query, "Retrying case search");
        self.search(&query).await
    }

    async fn get_record(&self, id: CaseId) -> Result<CaseRecord, CaseError> {
        self.store
            .get_case_record(id)
            .await?
            .ok_or(CaseError::CaseNotFound(id))
    }

    async fn latest_by_number(&self, case_number: &str) -> Result<Option<CaseRecord>, CaseError> {
        Ok(self.store.latest_case_by_number(case_number).await?)
    }

    async fn history(&self, page: u64, per_page: u64) -> Result<HistoryPage, CaseError> {
        Ok(self.store.case_history(page, per_page).await?)
    }

    async fn dashboard(&self) -> Result<Dashboard, CaseError> {
        let stats = self.store.search_stats().await?;
        let recent = self.store.recent_cases(RECENT_CASES).await?;
        Ok(Dashboard { stats, recent })
    }
}
