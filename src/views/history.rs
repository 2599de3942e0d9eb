use std::fmt::Write as _;

use super::{display_timestamp, layout, status_badge, text};
use crate::api::flash::Flash;
use crate::models::HistoryPage;

#[must_use]
pub fn history(page: &HistoryPage, flashes: &[Flash]) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<section class="card"><h1>Search history</h1><p class="muted">{} searches recorded</p>"#,
        page.total_items
    );

    if page.cases.is_empty() {
        body.push_str(r#"<p class="muted">Nothing on this page.</p>"#);
    } else {
        body.push_str(
            "<table><thead><tr><th>#</th><th>Case type</th><th>Number</th><th>Year</th><th>Searched</th><th>Status</th><th></th></tr></thead><tbody>",
        );
        for case in &page.cases {
            let _ = write!(
                body,
                r#"<tr><td>{id}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><a href="/case/{id}">View</a></td></tr>"#,
                text(&case.case_type),
                text(&case.case_number),
                case.filing_year,
                text(&display_timestamp(&case.search_timestamp)),
                status_badge(&case.status),
                id = case.id,
            );
        }
        body.push_str("</tbody></table>");
    }

    body.push_str(r#"<nav class="pagination">"#);
    if page.has_previous() {
        let _ = write!(
            body,
            r#"<a href="/history?page={}&amp;per_page={}">Previous</a>"#,
            page.page - 1,
            page.per_page
        );
    }
    let _ = write!(
        body,
        "<span>Page {} of {}</span>",
        page.page,
        page.total_pages.max(1)
    );
    if page.has_next() {
        let _ = write!(
            body,
            r#"<a href="/history?page={}&amp;per_page={}">Next</a>"#,
            page.page + 1,
            page.per_page
        );
    }
    body.push_str("</nav></section>");

    layout("History", flashes, &body)
}
