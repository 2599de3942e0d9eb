use axum::{
    Router,
    http::Uri,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{
    Expiry, MemoryStore, SessionManagerLayer,
    cookie::{Key, SameSite},
};

use time;

use crate::clients::CaseSource;
use crate::config::Config;
use crate::db::Store;
use crate::services::{CaseService, PdfService};
use crate::state::SharedState;

mod assets;
mod cases;
pub mod downloads;
mod error;
pub mod flash;
mod observability;
pub mod pages;
mod system;
mod types;
pub mod validation;

pub use error::ApiError;
pub use pages::PageError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

/// Fixed salt for stretching the configured secret into a cookie signing key.
const SESSION_KEY_SALT: &[u8] = b"court-fetcher/session-cookie";

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn court(&self) -> &Arc<dyn CaseSource> {
        &self.shared.court
    }

    #[must_use]
    pub fn case_service(&self) -> &Arc<dyn CaseService> {
        &self.shared.case_service
    }

    #[must_use]
    pub fn pdf_service(&self) -> &Arc<PdfService> {
        &self.shared.pdf_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Derives the 64-byte key that signs session cookies.
pub fn session_key(secret: &str) -> anyhow::Result<Key> {
    let mut bytes = [0u8; 64];
    argon2::Argon2::default()
        .hash_password_into(secret.as_bytes(), SESSION_KEY_SALT, &mut bytes)
        .map_err(|e| anyhow::anyhow!("Failed to derive session key: {e}"))?;

    Key::try_from(&bytes[..]).map_err(|e| anyhow::anyhow!("Invalid session key: {e}"))
}

pub fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let (key, secure_cookies, debug) = {
        let config = state.config();
        (
            session_key(&config.server.secret_key)?,
            config.server.secure_cookies,
            config.server.debug,
        )
    };

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_signed(key)
        .with_secure(secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(60)));

    let mut api_router = Router::new()
        .route("/case/{case_number}", get(cases::get_case))
        .route("/search", post(cases::search));

    if debug {
        api_router = api_router.route("/debug/captcha", get(cases::debug_captcha));
    }

    Ok(Router::new()
        .route("/", get(pages::dashboard))
        .route("/search", post(pages::search))
        .route("/case/{id}", get(pages::case_detail))
        .route("/case/{id}/retry", post(pages::retry))
        .route("/case/{id}/orders.zip", get(downloads::download_case_archive))
        .route("/history", get(pages::history))
        .route("/download/{file_id}", get(downloads::download_file))
        .route("/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
        .route("/static/{*path}", get(assets::serve_asset))
        .nest("/api", api_router)
        .fallback(not_found)
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        )))
}

async fn not_found(uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        ApiError::NotFound("Endpoint not found".to_string()).into_response()
    } else {
        PageError::not_found("The page you requested does not exist.").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_is_stable_per_secret() {
        let a = session_key("first secret").unwrap();
        let b = session_key("first secret").unwrap();
        let c = session_key("second secret").unwrap();
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
