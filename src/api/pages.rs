//! Server-rendered HTML routes.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{info, warn};

use super::flash::{self, Flash};
use super::types::{HistoryParams, SearchFormInput};
use super::{ApiError, AppState, validation};
use crate::domain::{CaseId, current_year};
use crate::services::{CaseError, PdfError, SearchOutcome};
use crate::views::{self, FormValues};

/// An error rendered as an HTML page instead of a JSON body.
#[derive(Debug)]
pub struct PageError {
    status: StatusCode,
    message: String,
}

impl PageError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    fn title(&self) -> &'static str {
        match self.status {
            StatusCode::NOT_FOUND => "Not found",
            StatusCode::BAD_REQUEST => "Invalid request",
            StatusCode::BAD_GATEWAY => "Court website unavailable",
            _ => "Something went wrong",
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let html = views::error_page(self.status.as_u16(), self.title(), &self.message, &[]);
        (self.status, Html(html)).into_response()
    }
}

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        let (status, message) = err.status_and_message();
        Self::new(status, message)
    }
}

impl From<CaseError> for PageError {
    fn from(err: CaseError) -> Self {
        ApiError::from(err).into()
    }
}

impl From<PdfError> for PageError {
    fn from(err: PdfError) -> Self {
        ApiError::from(err).into()
    }
}

pub(super) fn case_id(raw: &str) -> Result<CaseId, PageError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .map(CaseId::new)
        .ok_or_else(|| PageError::not_found("Case not found"))
}

fn outcome_flash(outcome: &SearchOutcome) -> Flash {
    let message = outcome.user_message();
    match outcome {
        SearchOutcome::Found(_) => Flash::success(message),
        SearchOutcome::NotFound { .. } => Flash::warning(message),
        SearchOutcome::Failed { .. } => Flash::error(message),
    }
}

/// `GET /`
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Html<String>, PageError> {
    let flashes = flash::take(&session).await;
    let data = state.case_service().dashboard().await?;

    Ok(Html(views::dashboard(
        &data,
        &state.config().scraper.case_types,
        current_year(),
        FormValues::default(),
        None,
        &flashes,
    )))
}

/// `POST /search`
///
/// Bad input re-renders the dashboard with a 400; anything that reaches the
/// court site is recorded and redirects to the new case page.
pub async fn search(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(input): Form<SearchFormInput>,
) -> Result<Response, PageError> {
    let config = state.config();
    let query = match validation::search_query(
        &input.case_type,
        &input.case_number,
        &input.filing_year,
        &config.scraper.case_types,
    ) {
        Ok(query) => query,
        Err(e) => {
            info!(error = %e, "Rejected search input");
            let data = state.case_service().dashboard().await?;
            let flashes = flash::take(&session).await;
            let form = FormValues {
                case_type: &input.case_type,
                case_number: &input.case_number,
                filing_year: &input.filing_year,
            };
            let html = views::dashboard(
                &data,
                &config.scraper.case_types,
                current_year(),
                form,
                Some(&e.to_string()),
                &flashes,
            );
            return Ok((StatusCode::BAD_REQUEST, Html(html)).into_response());
        }
    };

    let outcome = state.case_service().search(&query).await?;
    flash::push(&session, outcome_flash(&outcome)).await;

    Ok(Redirect::to(&format!("/case/{}", outcome.case_id())).into_response())
}

/// `GET /case/{id}`
pub async fn case_detail(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let id = case_id(&raw_id)?;
    let record = state.case_service().get_record(id).await?;
    let flashes = flash::take(&session).await;

    Ok(Html(views::case_detail(
        &record,
        &flashes,
        state.config().server.debug,
    )))
}

/// `POST /case/{id}/retry`
pub async fn retry(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(raw_id): Path<String>,
) -> Result<Redirect, PageError> {
    let id = case_id(&raw_id)?;

    match state.case_service().retry(id).await {
        Ok(outcome) => {
            info!(
                original_case_id = id.value(),
                case_id = outcome.case_id().value(),
                status = %outcome.status(),
                "Search retried"
            );
            flash::push(
                &session,
                Flash::info(format!("Search repeated. The earlier result is kept as search #{id}.")),
            )
            .await;
            flash::push(&session, outcome_flash(&outcome)).await;
            Ok(Redirect::to(&format!("/case/{}", outcome.case_id())))
        }
        Err(CaseError::Validation(e)) => {
            warn!(case_id = id.value(), error = %e, "Stored search can no longer be retried");
            flash::push(&session, Flash::error(format!("Cannot retry this search: {e}"))).await;
            Ok(Redirect::to(&format!("/case/{id}")))
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /history`
pub async fn history(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(params): Query<HistoryParams>,
) -> Result<Html<String>, PageError> {
    let page = validation::page_number(params.page.as_deref());
    let per_page = validation::page_size(params.per_page.as_deref());

    let history = state.case_service().history(page, per_page).await?;
    let flashes = flash::take(&session).await;

    Ok(Html(views::history(&history, &flashes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_id_rejects_garbage() {
        assert_eq!(case_id("7").ok().map(|id| id.value()), Some(7));
        for bad in ["0", "-3", "abc", "", "7.0"] {
            assert_eq!(
                case_id(bad).err().map(|e| e.status()),
                Some(StatusCode::NOT_FOUND),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_page_error_keeps_api_status() {
        let err = PageError::from(ApiError::court_error("connect refused"));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(!err.message.contains("refused"));
    }

    #[test]
    fn test_outcome_flash_levels() {
        let flash = outcome_flash(&SearchOutcome::NotFound {
            case_id: CaseId::new(1),
        });
        assert_eq!(flash.level, flash::FlashLevel::Warning);
    }
}
