//! Process-level endpoints: health probe.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use super::{ApiResponse, AppState, HealthResponse};

/// `GET /health`
///
/// Reports whether the database answers. Responds 503 when it does not.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let db_ready = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    let status = if db_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthResponse {
            status: if db_ready { "healthy" } else { "unhealthy" },
            database: if db_ready { "connected" } else { "unreachable" },
            uptime_seconds: state.start_time.elapsed().as_secs(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}
