use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_http::services::ServeFile;
use tower_sessions::Session;
use tracing::warn;

use super::flash::{self, Flash};
use super::pages::{self, PageError};
use super::{ApiError, AppState, validation};
use crate::services::PdfError;

pub const DOWNLOAD_FAILED: &str =
    "Could not download the PDF from the court website. Please try again later.";

pub const ARCHIVE_FAILED: &str =
    "Could not download any of the order PDFs. Please try the individual downloads later.";

/// `GET /download/{file_id}`
///
/// Serves an order PDF as an attachment, fetching it from the court site the
/// first time. When the court site fails the user is sent back to the case
/// page with a notice.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(raw_id): Path<String>,
) -> Result<Response, PageError> {
    let id = validation::file_id(&raw_id).ok_or_else(|| PageError::not_found("File not found"))?;

    let stored = match state.pdf_service().fetch_order_pdf(id).await {
        Ok(stored) => stored,
        Err(PdfError::Upstream(e)) => {
            warn!(order_id = id.value(), error = %e, "Could not fetch PDF from court site");
            let Some(case_id) = state.pdf_service().case_for_order(id).await? else {
                return Err(PageError::not_found("File not found"));
            };
            flash::push(&session, Flash::error(DOWNLOAD_FAILED)).await;
            return Ok(Redirect::to(&format!("/case/{case_id}")).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let req = Request::builder()
        .body(Body::empty())
        .map_err(|e| ApiError::internal(format!("Failed to build request: {e}")))?;

    let mut response = ServeFile::new_with_mime(&stored.path, &mime_guess::mime::APPLICATION_PDF)
        .try_call(req)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read PDF: {e}")))?
        .into_response();

    let disposition = format!("attachment; filename=\"{}\"", stored.filename);
    let value = HeaderValue::from_str(&disposition)
        .map_err(|e| ApiError::internal(format!("Invalid filename header: {e}")))?;
    response
        .headers_mut()
        .insert(header::CONTENT_DISPOSITION, value);

    Ok(response)
}

/// `GET /case/{id}/orders.zip`
///
/// Bundles every order PDF of a case into one archive. Orders whose PDF cannot
/// be fetched are left out; if none can be fetched the user goes back to the
/// case page.
pub async fn download_case_archive(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(raw_id): Path<String>,
) -> Result<Response, PageError> {
    let case_id = pages::case_id(&raw_id)?;

    let archive = match state.pdf_service().archive_case_orders(case_id).await {
        Ok(archive) => archive,
        Err(PdfError::NoOrders(_)) => {
            flash::push(&session, Flash::error("No orders found for this case.")).await;
            return Ok(Redirect::to(&format!("/case/{case_id}")).into_response());
        }
        Err(PdfError::NothingFetched(_)) => {
            flash::push(&session, Flash::error(ARCHIVE_FAILED)).await;
            return Ok(Redirect::to(&format!("/case/{case_id}")).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    if archive.skipped > 0 {
        warn!(
            case_id = case_id.value(),
            skipped = archive.skipped,
            included = archive.included,
            "Serving partial order archive"
        );
    }

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", archive.filename))
        .map_err(|e| ApiError::internal(format!("Invalid filename header: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive.bytes,
    )
        .into_response())
}
