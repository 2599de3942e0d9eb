//! Parsing of the search result page and the linked orders page.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::OnceLock;
use url::Url;

use super::dates::{find_dates, first_date};
use super::{ParseError, Selectors, element_text};
use crate::constants::defaults::{CASE_STATUS, MISSING_PARTY};
use crate::models::Parties;

const NOT_FOUND_PHRASES: &[&str] = &["no record found", "no data found", "record not found"];

/// A PDF link with whatever context the page gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLink {
    pub url: Url,

    pub date: Option<NaiveDate>,

    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCase {
    pub parties: Parties,

    pub filing_date: Option<NaiveDate>,

    pub next_hearing: Option<NaiveDate>,

    pub status: String,

    /// PDF links inside the result row.
    pub row_links: Vec<OrderLink>,

    /// Link to a separate orders listing, when the page has one.
    pub orders_page: Option<Url>,

    /// Every PDF link on the page.
    pub page_links: Vec<OrderLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPage {
    NotFound,
    Found(ParsedCase),
}

struct ResultRegex {
    status: Regex,
    versus: Regex,
}

impl ResultRegex {
    fn get() -> Option<&'static Self> {
        static INSTANCE: OnceLock<Option<ResultRegex>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                Some(Self {
                    status: Regex::new(r"\[\s*([^\]\[]+?)\s*\]").ok()?,
                    versus: Regex::new(r"(?i)\s*\bvs\.\s*").ok()?,
                })
            })
            .as_ref()
    }
}

/// Parses the page returned by a search submission. `base` resolves relative links.
pub fn parse_results(html: &str, base: &Url) -> Result<ResultPage, ParseError> {
    let lowered = html.to_lowercase();
    if NOT_FOUND_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
        return Ok(ResultPage::NotFound);
    }

    let selectors = Selectors::get()?;
    let regex = ResultRegex::get().ok_or(ParseError::Selectors)?;
    let document = Html::parse_document(html);

    let table = document
        .select(&selectors.table)
        .next()
        .ok_or(ParseError::MissingTable)?;

    let Some(row) = table.select(&selectors.row).find(|row| {
        row.select(&selectors.cell).next().is_some()
            && row.select(&selectors.header_cell).next().is_none()
    }) else {
        return Ok(ResultPage::NotFound);
    };

    let cells: Vec<ElementRef<'_>> = row.select(&selectors.cell).collect();

    let parties = cells
        .get(2)
        .map(|cell| split_parties(&element_text(*cell), &regex.versus))
        .unwrap_or_else(|| Parties {
            plaintiff: String::new(),
            defendant: MISSING_PARTY.to_string(),
        });

    let listing_dates = cells
        .get(3)
        .map(|cell| find_dates(&element_text(*cell)))
        .unwrap_or_default();

    let status = regex
        .status
        .captures(&element_text(row))
        .map_or_else(|| CASE_STATUS.to_string(), |caps| caps[1].to_string());

    let row_links = pdf_links(row, selectors, base)
        .into_iter()
        .map(|url| OrderLink {
            url,
            date: None,
            label: None,
        })
        .collect();

    let orders_page = orders_link(row, selectors, base)
        .or_else(|| orders_link(document.root_element(), selectors, base));

    let page_links = pdf_links(document.root_element(), selectors, base)
        .into_iter()
        .map(|url| OrderLink {
            url,
            date: None,
            label: None,
        })
        .collect();

    Ok(ResultPage::Found(ParsedCase {
        parties,
        filing_date: listing_dates.first().copied(),
        next_hearing: listing_dates.get(1).copied(),
        status,
        row_links,
        orders_page,
        page_links,
    }))
}

/// PDF links on an orders listing, each dated by the first date in its table row
/// and labelled with its link text.
pub fn parse_order_links(html: &str, base: &Url) -> Result<Vec<OrderLink>, ParseError> {
    let selectors = Selectors::get()?;
    let document = Html::parse_document(html);

    let links = document
        .select(&selectors.link)
        .filter(|a| is_pdf_href(a.value().attr("href")))
        .filter_map(|a| {
            let url = resolve(base, a.value().attr("href")?)?;
            let date = a
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "tr")
                .and_then(|tr| first_date(&element_text(tr)));
            let label = Some(element_text(a)).filter(|text| !text.is_empty());
            Some(OrderLink { url, date, label })
        })
        .collect();

    Ok(links)
}

/// Drops repeated URLs, keeping the first occurrence.
#[must_use]
pub fn dedup_links(links: Vec<OrderLink>) -> Vec<OrderLink> {
    let mut seen = std::collections::HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}

fn split_parties(text: &str, versus: &Regex) -> Parties {
    let mut parts = versus.splitn(text, 2);
    let plaintiff = parts.next().unwrap_or_default().trim().to_string();
    match parts.next() {
        Some(defendant) => Parties {
            plaintiff,
            defendant: defendant.trim().to_string(),
        },
        None => Parties {
            plaintiff,
            defendant: MISSING_PARTY.to_string(),
        },
    }
}

fn is_pdf_href(href: Option<&str>) -> bool {
    href.is_some_and(|h| h.to_ascii_lowercase().contains(".pdf"))
}

fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.to_ascii_lowercase().starts_with("javascript:")
    {
        return None;
    }
    base.join(href).ok()
}

fn pdf_links(scope: ElementRef<'_>, selectors: &Selectors, base: &Url) -> Vec<Url> {
    scope
        .select(&selectors.link)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            is_pdf_href(Some(href)).then(|| resolve(base, href)).flatten()
        })
        .collect()
}

/// A non-PDF link whose text mentions orders, else one whose href does.
fn orders_link(scope: ElementRef<'_>, selectors: &Selectors, base: &Url) -> Option<Url> {
    let candidates: Vec<ElementRef<'_>> = scope
        .select(&selectors.link)
        .filter(|a| !is_pdf_href(a.value().attr("href")))
        .collect();

    candidates
        .iter()
        .find(|a| element_text(**a).to_lowercase().contains("order"))
        .or_else(|| {
            candidates.iter().find(|a| {
                a.value()
                    .attr("href")
                    .is_some_and(|h| h.to_lowercase().contains("order"))
            })
        })
        .and_then(|a| resolve(base, a.value().attr("href")?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://court.example/").unwrap()
    }

    const RESULT_PAGE: &str = r#"
        <html><body>
        <table class="table">
            <tr><th>S.No.</th><th>Case</th><th>Parties</th><th>Listing</th></tr>
            <tr>
                <td>1</td>
                <td>CA 1234/2023 [PENDING]</td>
                <td>ACME INDUSTRIES LTD. Vs. UNION OF INDIA &amp; ORS.</td>
                <td>Filed: 15/01/2023 Next Date: 20/08/2025 Court No. 4</td>
                <td><a href="/files/order-1.pdf">Order</a> <a href="files/order-2.PDF">Judgment</a></td>
            </tr>
        </table>
        <a href="/files/order-1.pdf">duplicate</a>
        </body></html>
    "#;

    #[test]
    fn test_parses_first_data_row() {
        let ResultPage::Found(case) = parse_results(RESULT_PAGE, &base()).unwrap() else {
            panic!("expected a found case");
        };

        assert_eq!(case.parties.plaintiff, "ACME INDUSTRIES LTD.");
        assert_eq!(case.parties.defendant, "UNION OF INDIA & ORS.");
        assert_eq!(case.filing_date, NaiveDate::from_ymd_opt(2023, 1, 15));
        assert_eq!(case.next_hearing, NaiveDate::from_ymd_opt(2025, 8, 20));
        assert_eq!(case.status, "PENDING");
        assert_eq!(
            case.row_links
                .iter()
                .map(|l| l.url.as_str())
                .collect::<Vec<_>>(),
            vec![
                "https://court.example/files/order-1.pdf",
                "https://court.example/files/order-2.PDF"
            ]
        );
        assert_eq!(case.page_links.len(), 3);
        assert_eq!(dedup_links(case.page_links).len(), 2);
    }

    #[test]
    fn test_not_found_phrases() {
        for html in [
            "<p>No Record Found</p>",
            "<div>no data found for the given input</div>",
            "<table><tr><td>Record not found</td></tr></table>",
        ] {
            assert_eq!(parse_results(html, &base()).unwrap(), ResultPage::NotFound);
        }
    }

    #[test]
    fn test_empty_table_and_missing_table() {
        let header_only = "<table><tr><th>Case</th><th>Parties</th></tr></table>";
        assert_eq!(
            parse_results(header_only, &base()).unwrap(),
            ResultPage::NotFound
        );
        assert_eq!(
            parse_results("<p>Service unavailable</p>", &base()),
            Err(ParseError::MissingTable)
        );
    }

    #[test]
    fn test_defaults_without_separator_or_status() {
        let html = r#"
            <table><tr><td>1</td><td>X</td><td>JOHN DOE</td><td>pending listing</td>
            <td><a href="/case/77/orders">View Orders</a></td></tr></table>
        "#;
        let ResultPage::Found(case) = parse_results(html, &base()).unwrap() else {
            panic!("expected a found case");
        };
        assert_eq!(case.parties.plaintiff, "JOHN DOE");
        assert_eq!(case.parties.defendant, "N/A");
        assert_eq!(case.status, "Active");
        assert_eq!(case.filing_date, None);
        assert!(case.row_links.is_empty());
        assert_eq!(
            case.orders_page.as_ref().map(Url::as_str),
            Some("https://court.example/case/77/orders")
        );
    }

    #[test]
    fn test_order_links_take_row_dates() {
        let html = r#"
            <table>
                <tr><th>Date</th><th>Document</th></tr>
                <tr><td>02/03/2024</td><td><a href="/o/1.pdf">Interim Order</a></td></tr>
                <tr><td>n/a</td><td><a href="/o/2.pdf"></a></td></tr>
            </table>
        "#;
        let links = parse_order_links(html, &base()).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].date, NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(links[0].label.as_deref(), Some("Interim Order"));
        assert_eq!(links[1].date, None);
        assert_eq!(links[1].label, None);
    }
}
