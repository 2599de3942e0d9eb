//! HTTP client for the court's case-status site.
//!
//! Each attempt runs in its own [`CourtSession`]: a fresh `reqwest::Client`
//! with a private cookie jar that is dropped when the attempt ends, so no
//! session state leaks between searches.

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ScraperConfig;
use crate::constants::defaults::ORDER_TYPE;
use crate::domain::SearchQuery;
use crate::models::{ScrapedCase, ScrapedOrder};
use crate::parser::case_results::dedup_links;
use crate::parser::search_form::FormMethod;
use crate::parser::{
    Captcha, OrderLink, ParseError, ResultPage, SearchForm, parse_order_links, parse_results,
};

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("No record found for the specified case")]
    NotFound,

    #[error("Court website timed out")]
    Timeout,

    #[error("Court website unreachable: {0}")]
    Unreachable(String),

    #[error("Court website returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("Could not read the court response: {0}")]
    Parse(#[from] ParseError),

    #[error("The search page uses an image CAPTCHA, which is not supported")]
    UnsupportedCaptcha,

    #[error("The linked document is not a PDF")]
    NotPdf,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ScrapeError {
    /// Only network failures are worth another attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Unreachable(_) => true,
            Self::UpstreamStatus(status) => *status >= 500,
            _ => false,
        }
    }

    /// Whether the site could not be reached at all, as opposed to answering badly.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Unreachable(_) | Self::UpstreamStatus(_)
        )
    }

    const fn metric_label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Timeout => "timeout",
            Self::Unreachable(_) => "unreachable",
            Self::UpstreamStatus(_) => "upstream_status",
            Self::Parse(_) => "parse_error",
            Self::UnsupportedCaptcha => "unsupported_captcha",
            Self::NotPdf => "not_pdf",
            Self::InvalidUrl(_) => "invalid_url",
        }
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::UpstreamStatus(status.as_u16())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

/// What the live search page shows as a CAPTCHA.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CaptchaProbe {
    pub page_url: String,

    pub form_action: String,

    /// `numeric`, `image` or `none`.
    pub kind: &'static str,

    pub value: Option<String>,
}

impl CaptchaProbe {
    #[must_use]
    pub fn detected(&self) -> bool {
        self.value.is_some()
    }
}

/// A source of case data. [`CourtClient`] is the live implementation.
#[async_trait]
pub trait CaseSource: Send + Sync {
    /// Searches the court site for `query`.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::NotFound`] when the site has no record of the case
    /// - [`ScrapeError::Timeout`] / [`ScrapeError::Unreachable`] after retries are exhausted
    /// - [`ScrapeError::Parse`] when the response cannot be read
    async fn fetch_case(&self, query: &SearchQuery) -> Result<ScrapedCase, ScrapeError>;

    /// Downloads a PDF, rejecting anything that is not one.
    async fn download_pdf(&self, url: &str) -> Result<Vec<u8>, ScrapeError>;

    /// Loads the search page and reports the CAPTCHA it carries.
    async fn probe_captcha(&self) -> Result<CaptchaProbe, ScrapeError>;
}

pub struct CourtClient {
    config: ScraperConfig,
    base_url: Url,
    search_url: Url,
}

impl CourtClient {
    pub fn new(config: &ScraperConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let search_url = config.search_url()?;

        Ok(Self {
            config: config.clone(),
            base_url,
            search_url,
        })
    }

    #[must_use]
    pub const fn search_url(&self) -> &Url {
        &self.search_url
    }

    fn session(&self) -> Result<CourtSession, ScrapeError> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(self.config.user_agent.clone())
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .build()
            .map_err(|e| ScrapeError::Unreachable(format!("Failed to build HTTP client: {e}")))?;

        Ok(CourtSession { http })
    }

    /// Runs `op` up to `max_retries` times, retrying only network failures.
    async fn with_retries<T, F, Fut>(&self, what: &str, op: F) -> Result<T, ScrapeError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ScrapeError>>,
    {
        let attempts = self.config.max_retries.max(1);

        for attempt in 1..=attempts {
            debug!(what, attempt, attempts, "Court request attempt");

            match op().await {
                Ok(value) => {
                    metrics::counter!("court_scrape_attempts_total", "result" => "success")
                        .increment(1);
                    return Ok(value);
                }
                Err(e) => {
                    metrics::counter!("court_scrape_attempts_total", "result" => e.metric_label())
                        .increment(1);

                    if !e.is_retryable() || attempt == attempts {
                        return Err(e);
                    }

                    warn!(what, attempt, attempts, error = %e, "Court request failed, retrying");
                    tokio::time::sleep(Duration::from_secs(self.config.retry_delay_seconds)).await;
                }
            }
        }

        Err(ScrapeError::Unreachable(format!("{what}: no attempts made")))
    }

    async fn search_once(&self, query: &SearchQuery) -> Result<ScrapedCase, ScrapeError> {
        let session = self.session()?;

        let page = session.get_text(&self.search_url).await?;
        let form = SearchForm::parse(&page, &self.search_url)?;

        if form.captcha() == &Captcha::Image {
            return Err(ScrapeError::UnsupportedCaptcha);
        }
        if let Captcha::Numeric { value, .. } = form.captcha() {
            debug!(captcha = %value, "Read numeric CAPTCHA from page");
        }

        let fields = form.fill(query)?;

        if self.config.request_delay_seconds > 0 {
            tokio::time::sleep(Duration::from_secs(self.config.request_delay_seconds)).await;
        }

        let results = session.submit(&form, &fields).await?;
        let parsed = match parse_results(&results, &self.base_url)? {
            ResultPage::NotFound => return Err(ScrapeError::NotFound),
            ResultPage::Found(parsed) => parsed,
        };

        let mut links = parsed.row_links;

        if links.is_empty()
            && let Some(orders_url) = &parsed.orders_page
        {
            match session.get_text(orders_url).await {
                Ok(html) => match parse_order_links(&html, &self.base_url) {
                    Ok(found) => links = found,
                    Err(e) => warn!(url = %orders_url, error = %e, "Could not read orders page"),
                },
                Err(e) => warn!(url = %orders_url, error = %e, "Could not load orders page"),
            }
        }

        if links.is_empty() {
            links = parsed.page_links;
        }

        let filing_date = parsed.filing_date;
        let orders = dedup_links(links)
            .into_iter()
            .map(|link| to_order(link, filing_date))
            .collect();

        Ok(ScrapedCase {
            parties: parsed.parties,
            filing_date,
            next_hearing: parsed.next_hearing,
            status: parsed.status,
            orders,
        })
    }

    async fn download_once(&self, url: &Url) -> Result<Vec<u8>, ScrapeError> {
        let session = self.session()?;
        let response = session.http.get(url.clone()).send().await?;
        let response = check_status(response)?;

        let is_pdf_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.to_ascii_lowercase().starts_with("application/pdf"));

        let bytes = response.bytes().await?;

        if is_pdf_type || bytes.starts_with(PDF_MAGIC) {
            Ok(bytes.to_vec())
        } else {
            Err(ScrapeError::NotPdf)
        }
    }
}

#[async_trait]
impl CaseSource for CourtClient {
    async fn fetch_case(&self, query: &SearchQuery) -> Result<ScrapedCase, ScrapeError> {
        info!(query = %query, "Searching court website");
        self.with_retries("case search", || self.search_once(query))
            .await
    }

    async fn download_pdf(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let url = Url::parse(url).map_err(|_| ScrapeError::InvalidUrl(url.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScrapeError::InvalidUrl(url.to_string()));
        }

        self.with_retries("pdf download", || self.download_once(&url))
            .await
    }

    async fn probe_captcha(&self) -> Result<CaptchaProbe, ScrapeError> {
        let page = self
            .with_retries("captcha probe", || async {
                self.session()?.get_text(&self.search_url).await
            })
            .await?;

        let form = SearchForm::parse(&page, &self.search_url)?;
        let (kind, value) = match form.captcha() {
            Captcha::Numeric { value, .. } => ("numeric", Some(value.clone())),
            Captcha::Image => ("image", None),
            Captcha::None => ("none", None),
        };

        Ok(CaptchaProbe {
            page_url: self.search_url.to_string(),
            form_action: form.action().to_string(),
            kind,
            value,
        })
    }
}

/// One scraping session. Cookies live only as long as this value.
struct CourtSession {
    http: Client,
}

impl CourtSession {
    async fn get_text(&self, url: &Url) -> Result<String, ScrapeError> {
        let response = self.http.get(url.clone()).send().await?;
        Ok(check_status(response)?.text().await?)
    }

    async fn submit(
        &self,
        form: &SearchForm,
        fields: &[(String, String)],
    ) -> Result<String, ScrapeError> {
        let request = match form.method() {
            FormMethod::Post => self.http.post(form.action().clone()).form(fields),
            FormMethod::Get => {
                let mut url = form.action().clone();
                url.query_pairs_mut().extend_pairs(fields);
                self.http.get(url)
            }
        };

        let response = request.send().await?;
        Ok(check_status(response)?.text().await?)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ScrapeError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!(url = %response.url(), %status, "Court page returned an error status");
        Err(ScrapeError::UpstreamStatus(status.as_u16()))
    }
}

fn to_order(link: OrderLink, filing_date: Option<chrono::NaiveDate>) -> ScrapedOrder {
    ScrapedOrder {
        date: link.date.or(filing_date),
        order_type: link
            .label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| ORDER_TYPE.to_string()),
        pdf_url: link.url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_retryable_errors() {
        assert!(ScrapeError::Timeout.is_retryable());
        assert!(ScrapeError::Unreachable("refused".into()).is_retryable());
        assert!(ScrapeError::UpstreamStatus(503).is_retryable());
        assert!(!ScrapeError::UpstreamStatus(404).is_retryable());
        assert!(!ScrapeError::NotFound.is_retryable());
        assert!(!ScrapeError::Parse(ParseError::MissingTable).is_retryable());
        assert!(!ScrapeError::UnsupportedCaptcha.is_retryable());
    }

    #[test]
    fn test_orders_default_to_filing_date_and_type() {
        let filed = NaiveDate::from_ymd_opt(2023, 1, 15);
        let link = OrderLink {
            url: Url::parse("https://court.example/o/1.pdf").unwrap(),
            date: None,
            label: None,
        };
        let order = to_order(link, filed);
        assert_eq!(order.date, filed);
        assert_eq!(order.order_type, "Order");
        assert_eq!(order.pdf_url, "https://court.example/o/1.pdf");

        let dated = OrderLink {
            url: Url::parse("https://court.example/o/2.pdf").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 3, 2),
            label: Some("Final Judgment".to_string()),
        };
        let order = to_order(dated, filed);
        assert_eq!(order.date, NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(order.order_type, "Final Judgment");
    }

    #[tokio::test]
    async fn test_download_rejects_non_http_urls() {
        let client = CourtClient::new(&ScraperConfig::default()).unwrap();
        assert!(matches!(
            client.download_pdf("file:///etc/passwd").await,
            Err(ScrapeError::InvalidUrl(_))
        ));
        assert!(matches!(
            client.download_pdf("not a url").await,
            Err(ScrapeError::InvalidUrl(_))
        ));
    }
}
