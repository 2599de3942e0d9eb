//! Retrieval and local storage of order PDFs.

use crate::clients::{CaseSource, ScrapeError};
use crate::constants::limits::FILENAME_MAX_CHARS;
use crate::db::Store;
use crate::domain::{CaseId, OrderId};
use crate::entities::{cases, orders};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Order {0} has no PDF link")]
    NoSource(OrderId),

    #[error("Case not found: {0}")]
    CaseNotFound(CaseId),

    #[error("Case {0} has no orders with a PDF link")]
    NoOrders(CaseId),

    #[error("None of the order PDFs for case {0} could be downloaded")]
    NothingFetched(CaseId),

    #[error("Could not build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("PDF download failed: {0}")]
    Upstream(#[from] ScrapeError),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// A PDF on local disk, ready to be served.
#[derive(Debug, Clone)]
pub struct StoredPdf {
    pub order_id: OrderId,

    /// Case the order belongs to.
    pub case_id: i32,

    pub path: PathBuf,

    /// Name offered to the browser.
    pub filename: String,
}

/// Every order PDF of one case that could be fetched, zipped.
#[derive(Debug)]
pub struct OrderArchive {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub included: usize,
    pub skipped: usize,
}

pub struct PdfService {
    store: Store,
    source: Arc<dyn CaseSource>,
    downloads_dir: PathBuf,
}

impl PdfService {
    #[must_use]
    pub fn new(store: Store, source: Arc<dyn CaseSource>, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            source,
            downloads_dir: downloads_dir.into(),
        }
    }

    #[must_use]
    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    /// The case an order belongs to, if the order exists.
    pub async fn case_for_order(&self, id: OrderId) -> Result<Option<i32>, PdfError> {
        Ok(self.store.get_order(id).await?.map(|order| order.case_id))
    }

    /// Returns the local copy of an order's PDF, downloading it the first time.
    pub async fn fetch_order_pdf(&self, id: OrderId) -> Result<StoredPdf, PdfError> {
        let (order, case) = self
            .store
            .get_order_with_case(id)
            .await?
            .ok_or(PdfError::OrderNotFound(id))?;

        let filename = pdf_filename(&order, &case);

        if let Some(local) = order.local_pdf_path.as_deref()
            && tokio::fs::try_exists(local).await.unwrap_or(false)
        {
            debug!(order_id = id.value(), path = local, "Serving stored PDF");
            metrics::counter!("pdf_downloads_total", "source" => "local").increment(1);
            return Ok(StoredPdf {
                order_id: id,
                case_id: case.id,
                path: PathBuf::from(local),
                filename,
            });
        }

        let url = order
            .pdf_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(PdfError::NoSource(id))?;

        let bytes = self.source.download_pdf(url).await.inspect_err(|e| {
            warn!(order_id = id.value(), url, error = %e, "PDF download failed");
        })?;

        tokio::fs::create_dir_all(&self.downloads_dir).await?;
        let path = self.downloads_dir.join(&filename);
        tokio::fs::write(&path, &bytes).await?;

        self.store
            .set_order_local_path(id, &path.to_string_lossy())
            .await?;

        metrics::counter!("pdf_downloads_total", "source" => "remote").increment(1);
        info!(
            order_id = id.value(),
            path = %path.display(),
            bytes = bytes.len(),
            "PDF saved locally"
        );

        Ok(StoredPdf {
            order_id: id,
            case_id: case.id,
            path,
            filename,
        })
    }

    /// Zips the PDFs of all orders of a case, fetching any that are not stored yet.
    /// Orders whose PDF cannot be fetched are left out.
    pub async fn archive_case_orders(&self, case_id: CaseId) -> Result<OrderArchive, PdfError> {
        let record = self
            .store
            .get_case_record(case_id)
            .await?
            .ok_or(PdfError::CaseNotFound(case_id))?;

        let sources: Vec<OrderId> = record
            .orders
            .iter()
            .filter(|o| o.pdf_url.as_deref().is_some_and(|url| !url.trim().is_empty()))
            .map(|o| OrderId::new(o.id))
            .collect();
        if sources.is_empty() {
            return Err(PdfError::NoOrders(case_id));
        }

        let mut entries = Vec::with_capacity(sources.len());
        let mut skipped = 0;
        for id in sources {
            let fetched = match self.fetch_order_pdf(id).await {
                Ok(stored) => tokio::fs::read(&stored.path)
                    .await
                    .map(|bytes| (stored.filename, bytes))
                    .map_err(PdfError::from),
                Err(e) => Err(e),
            };
            match fetched {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(case_id = case_id.value(), order_id = id.value(), error = %e, "Leaving order out of archive");
                    skipped += 1;
                }
            }
        }

        if entries.is_empty() {
            return Err(PdfError::NothingFetched(case_id));
        }

        let included = entries.len();
        let bytes = write_archive(&entries)?;
        metrics::counter!("pdf_archives_total").increment(1);
        info!(
            case_id = case_id.value(),
            included,
            skipped,
            bytes = bytes.len(),
            "Order archive built"
        );

        Ok(OrderArchive {
            filename: archive_filename(&record.case),
            bytes,
            included,
            skipped,
        })
    }
}

fn write_archive(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, zip::result::ZipError> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        writer.start_file(name.as_str(), options)?;
        writer.write_all(bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// `case_<case number>_orders.zip`
#[must_use]
pub fn archive_filename(case: &cases::Model) -> String {
    format!("case_{}_orders.zip", sanitize_filename(&case.case_number))
}

/// `<order id>_<case number>_<order type>_<date>.pdf`, sanitized.
#[must_use]
pub fn pdf_filename(order: &orders::Model, case: &cases::Model) -> String {
    let order_type = order.order_type.as_deref().unwrap_or("order");
    let date = order.order_date.as_deref().unwrap_or("unknown");
    let stem = sanitize_filename(&format!(
        "{}_{}_{}_{}",
        order.id, case.case_number, order_type, date
    ));
    format!("{stem}.pdf")
}

/// Replaces characters unsafe in file names, collapses underscores and caps the length.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '-' | '.') {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let trimmed: String = out
        .trim_matches(|c| c == '_' || c == '.')
        .chars()
        .take(FILENAME_MAX_CHARS)
        .collect();

    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed
    }
}
