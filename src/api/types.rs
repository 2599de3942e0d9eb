use serde::{Deserialize, Serialize};

use crate::models::CaseRecord;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CaseDto {
    pub case_id: i32,
    pub case_number: String,
    pub case_type: String,
    pub filing_year: i32,
    pub status: String,
    pub search_timestamp: String,
    pub details: Option<CaseDetailsDto>,
    pub orders: Vec<OrderDto>,
}

#[derive(Debug, Serialize)]
pub struct CaseDetailsDto {
    pub parties_plaintiff: Option<String>,
    pub parties_defendant: Option<String>,
    pub filing_date: Option<String>,
    pub next_hearing_date: Option<String>,
    pub case_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: i32,
    pub order_date: Option<String>,
    pub order_type: Option<String>,
    pub pdf_url: Option<String>,
    pub has_local_file: bool,
    pub download_url: String,
}

impl From<CaseRecord> for CaseDto {
    fn from(record: CaseRecord) -> Self {
        let CaseRecord {
            case,
            detail,
            orders,
        } = record;

        Self {
            case_id: case.id,
            case_number: case.case_number,
            case_type: case.case_type,
            filing_year: case.filing_year,
            status: case.status,
            search_timestamp: case.search_timestamp,
            details: detail.map(|d| CaseDetailsDto {
                parties_plaintiff: d.parties_plaintiff,
                parties_defendant: d.parties_defendant,
                filing_date: d.filing_date,
                next_hearing_date: d.next_hearing_date,
                case_status: d.case_status,
            }),
            orders: orders
                .into_iter()
                .map(|o| OrderDto {
                    id: o.id,
                    download_url: format!("/download/{}", o.id),
                    has_local_file: o
                        .local_pdf_path
                        .as_deref()
                        .is_some_and(|path| std::path::Path::new(path).is_file()),
                    order_date: o.order_date,
                    order_type: o.order_type,
                    pdf_url: o.pdf_url,
                })
                .collect(),
        }
    }
}

/// A JSON field that clients send either as a string or as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextOrNumber {
    Text(String),
    Number(i64),
}

impl Default for TextOrNumber {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl TextOrNumber {
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub case_number: TextOrNumber,
    #[serde(default)]
    pub filing_year: TextOrNumber,
}

/// Fields posted by the dashboard search form.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchFormInput {
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub case_number: String,
    #[serde(default)]
    pub filing_year: String,
}

/// Raw `?page=&per_page=` values; garbage falls back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub uptime_seconds: u64,
    pub timestamp: String,
}
