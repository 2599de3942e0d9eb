use std::fmt::Write as _;

use super::{attr, display_date, display_timestamp, layout, status_badge, text};
use crate::api::flash::Flash;
use crate::domain::CaseStatus;
use crate::models::CaseRecord;

#[must_use]
pub fn case_detail(record: &CaseRecord, flashes: &[Flash], debug: bool) -> String {
    let case = &record.case;
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<section class="card">
<h1>{} {}/{}</h1>
<p>{} <span class="muted">Searched {}</span></p>"#,
        text(&case.case_type),
        text(&case.case_number),
        case.filing_year,
        status_badge(&case.status),
        text(&display_timestamp(&case.search_timestamp)),
    );

    if record.status() != Some(CaseStatus::Found) {
        let _ = write!(
            body,
            r#"<form method="post" action="/case/{}/retry"><button type="submit">Retry search</button></form>"#,
            case.id
        );
    }
    body.push_str("</section>");

    if let Some(detail) = &record.detail {
        let _ = write!(
            body,
            r#"<section class="card"><h2>Case details</h2><dl>
<dt>Petitioner</dt><dd>{}</dd>
<dt>Respondent</dt><dd>{}</dd>
<dt>Filing date</dt><dd>{}</dd>
<dt>Next hearing</dt><dd>{}</dd>
<dt>Status</dt><dd>{}</dd>
</dl></section>"#,
            text(detail.parties_plaintiff.as_deref().unwrap_or("")),
            text(detail.parties_defendant.as_deref().unwrap_or("")),
            text(&display_date(detail.filing_date.as_deref())),
            text(&display_date(detail.next_hearing_date.as_deref())),
            text(detail.case_status.as_deref().unwrap_or("")),
        );
    }

    body.push_str(r#"<section class="card"><h2>Orders &amp; judgments</h2>"#);
    if record.orders.is_empty() {
        body.push_str(r#"<p class="muted">No orders recorded for this search.</p>"#);
    } else {
        body.push_str(
            "<table><thead><tr><th>Date</th><th>Type</th><th>Source</th><th></th></tr></thead><tbody>",
        );
        for order in &record.orders {
            let source = order.pdf_url.as_deref().map_or_else(String::new, |url| {
                format!(
                    r#"<a href="{}" rel="noopener noreferrer">court link</a>"#,
                    attr(url)
                )
            });
            let _ = write!(
                body,
                r#"<tr><td>{}</td><td>{}</td><td>{source}</td><td><a class="button" href="/download/{}">Download PDF</a></td></tr>"#,
                text(&display_date(order.order_date.as_deref())),
                text(order.order_type.as_deref().unwrap_or("Order")),
                order.id,
            );
        }
        body.push_str("</tbody></table>");
        if record.orders.iter().any(|o| o.pdf_url.is_some()) {
            let _ = write!(
                body,
                r#"<p><a class="button" href="/case/{}/orders.zip">Download all as ZIP</a></p>"#,
                case.id
            );
        }
    }
    body.push_str("</section>");

    if debug && let Some(raw) = &case.response_data {
        let _ = write!(
            body,
            r#"<section class="card"><h2>Raw response</h2><pre>{}</pre></section>"#,
            text(raw)
        );
    }

    let title = format!("{} {}/{}", case.case_type, case.case_number, case.filing_year);
    layout(&title, flashes, &body)
}
