//! Domain types for case searches with strong typing.
//!
//! Newtype ids keep case and order identifiers from being mixed up, and
//! [`SearchQuery`] can only be built through validation, so anything holding
//! one is safe to send to the court site.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::search::{MAX_CASE_NUMBER_DIGITS, MIN_FILING_YEAR};

/// Identifier of a recorded search (a row in `cases`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(i32);

impl CaseId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for CaseId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Identifier of an order row; doubles as the public file id for PDF downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i32);

impl OrderId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for OrderId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Outcome recorded for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Found,
    NotFound,
    Error,
}

impl CaseStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Found => "Found",
            Self::NotFound => "Not found",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "found" => Ok(Self::Found),
            "not_found" => Ok(Self::NotFound),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown case status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid case number format: use up to {MAX_CASE_NUMBER_DIGITS} digits")]
    InvalidCaseNumber,

    #[error("Invalid filing year format")]
    InvalidFilingYear,

    #[error("Filing year must be between {min} and {max}")]
    FilingYearOutOfRange { min: i32, max: i32 },

    #[error("Unknown case type '{0}'")]
    UnknownCaseType(String),
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    case_type: String,
    case_number: String,
    filing_year: i32,
}

impl SearchQuery {
    /// Validates raw form input against the allowed case types and the current year.
    ///
    /// Surrounding whitespace is ignored; the case type is normalized to the
    /// spelling in `allowed_case_types`.
    pub fn parse(
        case_type: &str,
        case_number: &str,
        filing_year: &str,
        allowed_case_types: &[String],
        current_year: i32,
    ) -> Result<Self, QueryError> {
        let case_type = case_type.trim();
        let case_number = case_number.trim();
        let filing_year = filing_year.trim();

        if case_type.is_empty() || case_number.is_empty() || filing_year.is_empty() {
            return Err(QueryError::MissingFields);
        }

        if !is_valid_case_number(case_number) {
            return Err(QueryError::InvalidCaseNumber);
        }

        let year: i32 = filing_year
            .parse()
            .map_err(|_| QueryError::InvalidFilingYear)?;
        if !(MIN_FILING_YEAR..=current_year).contains(&year) {
            return Err(QueryError::FilingYearOutOfRange {
                min: MIN_FILING_YEAR,
                max: current_year,
            });
        }

        let case_type = allowed_case_types
            .iter()
            .find(|known| known.eq_ignore_ascii_case(case_type))
            .ok_or_else(|| QueryError::UnknownCaseType(case_type.to_string()))?;

        Ok(Self {
            case_type: case_type.clone(),
            case_number: case_number.to_string(),
            filing_year: year,
        })
    }

    #[must_use]
    pub fn case_type(&self) -> &str {
        &self.case_type
    }

    #[must_use]
    pub fn case_number(&self) -> &str {
        &self.case_number
    }

    #[must_use]
    pub const fn filing_year(&self) -> i32 {
        self.filing_year
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}",
            self.case_type, self.case_number, self.filing_year
        )
    }
}

#[must_use]
pub fn is_valid_case_number(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_CASE_NUMBER_DIGITS
        && value.bytes().all(|b| b.is_ascii_digit())
}

#[must_use]
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types() -> Vec<String> {
        vec!["Civil Appeal".to_string(), "Bail Application".to_string()]
    }

    fn parse(number: &str, year: &str) -> Result<SearchQuery, QueryError> {
        SearchQuery::parse("Civil Appeal", number, year, &types(), 2025)
    }

    #[test]
    fn test_accepts_valid_query() {
        let query = SearchQuery::parse(" civil appeal ", " 1234 ", "2023", &types(), 2025).unwrap();
        assert_eq!(query.case_type(), "Civil Appeal");
        assert_eq!(query.case_number(), "1234");
        assert_eq!(query.filing_year(), 2023);
    }

    #[test]
    fn test_rejects_non_digit_case_numbers() {
        for bad in ["abc123", "12a", "12/2023", "1-2", "１２", "12 3", "+12", "-5"] {
            assert_eq!(parse(bad, "2023"), Err(QueryError::InvalidCaseNumber), "{bad}");
        }
        assert_eq!(parse("12345678901", "2023"), Err(QueryError::InvalidCaseNumber));
        assert!(parse("1234567890", "2023").is_ok());
    }

    #[test]
    fn test_rejects_years_out_of_range() {
        assert!(matches!(
            parse("1", "1949"),
            Err(QueryError::FilingYearOutOfRange { min: 1950, max: 2025 })
        ));
        assert!(matches!(
            parse("1", "2026"),
            Err(QueryError::FilingYearOutOfRange { .. })
        ));
        assert!(parse("1", "1950").is_ok());
        assert!(parse("1", "2025").is_ok());
        assert_eq!(parse("1", "20x3"), Err(QueryError::InvalidFilingYear));
    }

    #[test]
    fn test_rejects_missing_fields_and_unknown_types() {
        assert_eq!(parse("", "2023"), Err(QueryError::MissingFields));
        assert_eq!(
            SearchQuery::parse("  ", "1", "2023", &types(), 2025),
            Err(QueryError::MissingFields)
        );
        assert_eq!(
            SearchQuery::parse("Tax Appeal", "1", "2023", &types(), 2025),
            Err(QueryError::UnknownCaseType("Tax Appeal".to_string()))
        );
    }

    #[test]
    fn test_case_status_round_trip() {
        for status in [CaseStatus::Found, CaseStatus::NotFound, CaseStatus::Error] {
            assert_eq!(status.as_str().parse::<CaseStatus>(), Ok(status));
        }
        assert!("pending".parse::<CaseStatus>().is_err());
    }
}
