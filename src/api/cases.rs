use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use super::types::{ApiResponse, CaseDto, SearchRequest};
use super::{ApiError, AppState, validation};
use crate::clients::CaptchaProbe;
use crate::domain::is_valid_case_number;
use crate::services::{FailureKind, SearchOutcome};

/// `GET /api/case/{case_number}`
///
/// The most recent search recorded for a case number.
pub async fn get_case(
    State(state): State<Arc<AppState>>,
    Path(case_number): Path<String>,
) -> Result<Json<ApiResponse<CaseDto>>, ApiError> {
    let case_number = case_number.trim();
    if !is_valid_case_number(case_number) {
        return Err(ApiError::NotFound("Case not found".to_string()));
    }

    let record = state
        .case_service()
        .latest_by_number(case_number)
        .await?
        .ok_or_else(|| ApiError::NotFound("Case not found".to_string()))?;

    Ok(Json(ApiResponse::success(CaseDto::from(record))))
}

/// `POST /api/search`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    let query = validation::search_query(
        &request.case_type,
        &request.case_number.into_string(),
        &request.filing_year.into_string(),
        &state.config().scraper.case_types,
    )
    .map_err(|e| ApiError::validation(e.to_string()))?;

    let outcome = state.case_service().search(&query).await?;
    let case_id = outcome.case_id().value();

    match outcome {
        SearchOutcome::Found(record) => {
            info!(case_id, query = %query, "Search answered over API");
            Ok(Json(ApiResponse::success(CaseDto::from(record))).into_response())
        }
        SearchOutcome::NotFound { .. } => {
            info!(case_id, query = %query, "No record found");
            Err(ApiError::NotFound(
                "No record found for the specified case".to_string(),
            ))
        }
        SearchOutcome::Failed {
            kind: FailureKind::Unreachable,
            message,
            ..
        } => {
            warn!(case_id, query = %query, error = %message, "Court website unreachable");
            Err(ApiError::court_error(message))
        }
        SearchOutcome::Failed { message, .. } => {
            warn!(case_id, query = %query, error = %message, "Search failed");
            Err(ApiError::internal(format!("case {case_id}: {message}")))
        }
    }
}

/// `GET /api/debug/captcha`
///
/// Loads the live search form and reports the CAPTCHA it shows. Only routed
/// when debug mode is on.
pub async fn debug_captcha(State(state): State<Arc<AppState>>) -> Response {
    match state.court().probe_captcha().await {
        Ok(probe) => {
            info!(kind = probe.kind, detected = probe.detected(), "CAPTCHA probe");
            (StatusCode::OK, Json(ApiResponse::<CaptchaProbe>::success(probe))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
