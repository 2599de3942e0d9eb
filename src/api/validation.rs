use crate::constants::limits::{DEFAULT_HISTORY_PAGE_SIZE, MAX_HISTORY_PAGE_SIZE};
use crate::domain::{OrderId, QueryError, SearchQuery, current_year};

fn parse_count(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// 1-based page number; missing, zero or unparseable means the first page.
#[must_use]
pub fn page_number(page: Option<&str>) -> u64 {
    parse_count(page).unwrap_or(1).max(1)
}

/// Page size, defaulting to 20 and capped at 100.
#[must_use]
pub fn page_size(per_page: Option<&str>) -> u64 {
    parse_count(per_page)
        .unwrap_or(DEFAULT_HISTORY_PAGE_SIZE)
        .clamp(1, MAX_HISTORY_PAGE_SIZE)
}

/// Validates raw search input against the configured case types and this year.
pub fn search_query(
    case_type: &str,
    case_number: &str,
    filing_year: &str,
    case_types: &[String],
) -> Result<SearchQuery, QueryError> {
    SearchQuery::parse(case_type, case_number, filing_year, case_types, current_year())
}

/// File ids are order ids; anything that is not a positive integer matches nothing.
#[must_use]
pub fn file_id(raw: &str) -> Option<OrderId> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .map(OrderId::new)
}
