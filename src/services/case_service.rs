//! Domain service for case searches and the search history.
//!
//! This module provides the [`CaseService`] trait, which ties the court
//! scraper to the append-only `cases` table.

use crate::domain::{CaseId, CaseStatus, QueryError, SearchQuery};
use crate::models::{CaseRecord, Dashboard, HistoryPage};
use thiserror::Error;

/// Domain errors for case operations.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Case not found: {0}")]
    CaseNotFound(CaseId),

    #[error("{0}")]
    Validation(#[from] QueryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for CaseError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Why a recorded search produced no case data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Timeout, connection failure or an upstream 5xx.
    Unreachable,

    /// The site answered but the page could not be used.
    Unreadable,
}

/// Result of a search that passed validation. Every variant has a stored case row.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(CaseRecord),

    NotFound {
        case_id: CaseId,
    },

    Failed {
        case_id: CaseId,
        kind: FailureKind,
        message: String,
    },
}

impl SearchOutcome {
    #[must_use]
    pub fn case_id(&self) -> CaseId {
        match self {
            Self::Found(record) => CaseId::new(record.case.id),
            Self::NotFound { case_id } | Self::Failed { case_id, .. } => *case_id,
        }
    }

    #[must_use]
    pub const fn status(&self) -> CaseStatus {
        match self {
            Self::Found(_) => CaseStatus::Found,
            Self::NotFound { .. } => CaseStatus::NotFound,
            Self::Failed { .. } => CaseStatus::Error,
        }
    }

    /// One-line message suitable for showing to the person who searched.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Found(_) => "Case data retrieved successfully!".to_string(),
            Self::NotFound { .. } => "No record found for the specified case.".to_string(),
            Self::Failed {
                kind: FailureKind::Unreachable,
                ..
            } => "The court website could not be reached. Please try again later.".to_string(),
            Self::Failed { message, .. } => format!("Error retrieving case data: {message}"),
        }
    }
}

/// Domain service trait for case searches.
#[async_trait::async_trait]
pub trait CaseService: Send + Sync {
    /// Runs a search against the court site and records it.
    ///
    /// Exactly one case row is appended whatever the scrape outcome.
    ///
    /// # Errors
    ///
    /// - Returns [`CaseError::Database`] if the search could not be recorded
    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, CaseError>;

    /// Repeats the search behind a stored case, appending a new case row.
    ///
    /// # Errors
    ///
    /// - Returns [`CaseError::CaseNotFound`] if `id` does not exist
    /// - Returns [`CaseError::Validation`] if the stored parameters are no longer searchable
    async fn retry(&self, id: CaseId) -> Result<SearchOutcome, CaseError>;

    /// Loads a stored case with its detail and orders.
    ///
    /// # Errors
    ///
    /// - Returns [`CaseError::CaseNotFound`] if `id` does not exist
    async fn get_record(&self, id: CaseId) -> Result<CaseRecord, CaseError>;

    /// The most recent search for a case number.
    async fn latest_by_number(&self, case_number: &str) -> Result<Option<CaseRecord>, CaseError>;

    /// A page of the search history, newest first.
    async fn history(&self, page: u64, per_page: u64) -> Result<HistoryPage, CaseError>;

    /// Counts and most recent searches for the dashboard.
    async fn dashboard(&self) -> Result<Dashboard, CaseError>;
}
