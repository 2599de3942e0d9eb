use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::{case_details, cases, orders};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parties {
    pub plaintiff: String,

    pub defendant: String,
}

/// An order or judgment link discovered while scraping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapedOrder {
    pub date: Option<NaiveDate>,

    pub order_type: String,

    pub pdf_url: String,
}

/// Case data read from the court's result page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapedCase {
    pub parties: Parties,

    pub filing_date: Option<NaiveDate>,

    pub next_hearing: Option<NaiveDate>,

    pub status: String,

    pub orders: Vec<ScrapedOrder>,
}

/// A stored search with its children.
#[derive(Debug, Clone, Serialize)]
pub struct CaseRecord {
    pub case: cases::Model,

    pub detail: Option<case_details::Model>,

    pub orders: Vec<orders::Model>,
}

impl CaseRecord {
    #[must_use]
    pub fn status(&self) -> Option<crate::domain::CaseStatus> {
        self.case.status.parse().ok()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct SearchStats {
    pub total: u64,

    pub found: u64,

    pub not_found: u64,

    pub error: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub cases: Vec<cases::Model>,

    pub page: u64,

    pub per_page: u64,

    pub total_items: u64,

    pub total_pages: u64,
}

impl HistoryPage {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: SearchStats,

    pub recent: Vec<cases::Model>,
}
