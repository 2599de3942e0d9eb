//! HTML parsing for the court's case-status pages.
//!
//! Everything here works on borrowed markup and returns owned values, so a
//! parsed `scraper::Html` never has to live across an `.await`.

pub mod case_results;
pub mod dates;
pub mod search_form;

use scraper::{ElementRef, Selector};
use std::sync::OnceLock;
use thiserror::Error;

pub use case_results::{OrderLink, ParsedCase, ResultPage, parse_order_links, parse_results};
pub use search_form::{Captcha, SearchForm};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("search form not found on the page")]
    MissingForm,

    #[error("{0} field not found on the search form")]
    MissingField(&'static str),

    #[error("'{value}' is not offered by the {field} field")]
    UnknownOption { field: &'static str, value: String },

    #[error("invalid form action '{0}'")]
    InvalidAction(String),

    #[error("results table not found on the page")]
    MissingTable,

    #[error("HTML selectors failed to initialize")]
    Selectors,
}

/// CSS selectors shared by the page parsers.
pub(crate) struct Selectors {
    pub form: Selector,
    pub select: Selector,
    pub option: Selector,
    pub input: Selector,
    pub img: Selector,
    pub span: Selector,
    pub any: Selector,
    pub table: Selector,
    pub row: Selector,
    pub cell: Selector,
    pub header_cell: Selector,
    pub link: Selector,
}

impl Selectors {
    pub(crate) fn get() -> Result<&'static Self, ParseError> {
        static INSTANCE: OnceLock<Option<Selectors>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                Some(Self {
                    form: Selector::parse("form").ok()?,
                    select: Selector::parse("select").ok()?,
                    option: Selector::parse("option").ok()?,
                    input: Selector::parse("input").ok()?,
                    img: Selector::parse("img").ok()?,
                    span: Selector::parse("span").ok()?,
                    any: Selector::parse("*").ok()?,
                    table: Selector::parse("table").ok()?,
                    row: Selector::parse("tr").ok()?,
                    cell: Selector::parse("td").ok()?,
                    header_cell: Selector::parse("th").ok()?,
                    link: Selector::parse("a[href]").ok()?,
                })
            })
            .as_ref()
            .ok_or(ParseError::Selectors)
    }
}

/// Visible text of an element with runs of whitespace collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased `id`, `name` and `class` attributes, for fuzzy field matching.
pub(crate) fn attr_haystack(element: ElementRef<'_>) -> String {
    let value = element.value();
    [value.attr("id"), value.attr("name"), value.attr("class")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = Html::parse_document(
            "<table><tr><td>  ACME   Ltd <br/>\n VS.  <b>State</b> </td></tr></table>",
        );
        let selectors = Selectors::get().unwrap();
        let cell = html.select(&selectors.cell).next().unwrap();
        assert_eq!(element_text(cell), "ACME Ltd VS. State");
    }
}
