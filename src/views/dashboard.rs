use std::fmt::Write as _;

use super::{attr, display_timestamp, layout, status_badge, text};
use crate::api::flash::Flash;
use crate::constants::search::MIN_FILING_YEAR;
use crate::models::Dashboard;

/// Values to pre-fill the search form with.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormValues<'a> {
    pub case_type: &'a str,
    pub case_number: &'a str,
    pub filing_year: &'a str,
}

/// The home page: search form, counts and the latest searches.
#[must_use]
pub fn dashboard(
    data: &Dashboard,
    case_types: &[String],
    current_year: i32,
    form: FormValues<'_>,
    error: Option<&str>,
    flashes: &[Flash],
) -> String {
    let mut body = String::new();

    body.push_str(r#"<section class="card"><h1>Search a case</h1>"#);
    if let Some(error) = error {
        let _ = write!(body, r#"<div class="flash flash-error">{}</div>"#, text(error));
    }
    body.push_str(&search_form(case_types, current_year, form));
    body.push_str("</section>");

    let stats = &data.stats;
    let _ = write!(
        body,
        r#"<section class="stats">
<div class="stat"><span class="stat-value">{}</span><span class="stat-label">Total searches</span></div>
<div class="stat"><span class="stat-value">{}</span><span class="stat-label">Found</span></div>
<div class="stat"><span class="stat-value">{}</span><span class="stat-label">Not found</span></div>
<div class="stat"><span class="stat-value">{}</span><span class="stat-label">Errors</span></div>
</section>"#,
        stats.total, stats.found, stats.not_found, stats.error
    );

    body.push_str(r#"<section class="card"><h2>Recent searches</h2>"#);
    if data.recent.is_empty() {
        body.push_str(r#"<p class="muted">No searches yet.</p>"#);
    } else {
        body.push_str(
            "<table><thead><tr><th>Case</th><th>Searched</th><th>Status</th><th></th></tr></thead><tbody>",
        );
        for case in &data.recent {
            let _ = write!(
                body,
                r#"<tr><td>{} {}/{}</td><td>{}</td><td>{}</td><td><a href="/case/{}">View</a></td></tr>"#,
                text(&case.case_type),
                text(&case.case_number),
                case.filing_year,
                text(&display_timestamp(&case.search_timestamp)),
                status_badge(&case.status),
                case.id
            );
        }
        body.push_str("</tbody></table>");
    }
    body.push_str(r#"<p><a href="/history">Full history</a></p></section>"#);

    layout("Dashboard", flashes, &body)
}

fn search_form(case_types: &[String], current_year: i32, form: FormValues<'_>) -> String {
    let mut types = String::from(r#"<option value="">Select case type</option>"#);
    for case_type in case_types {
        let selected = if case_type.eq_ignore_ascii_case(form.case_type.trim()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            types,
            r#"<option value="{}"{selected}>{}</option>"#,
            attr(case_type),
            text(case_type)
        );
    }

    let mut years = String::from(r#"<option value="">Select year</option>"#);
    for year in (MIN_FILING_YEAR..=current_year).rev() {
        let selected = if form.filing_year.trim() == year.to_string() {
            " selected"
        } else {
            ""
        };
        let _ = write!(years, r#"<option value="{year}"{selected}>{year}</option>"#);
    }

    format!(
        r#"<form class="search-form" method="post" action="/search">
<label>Case type<select name="case_type" required>{types}</select></label>
<label>Case number<input type="text" name="case_number" value="{number}" maxlength="10" pattern="[0-9]{{1,10}}" inputmode="numeric" required></label>
<label>Filing year<select name="filing_year" required>{years}</select></label>
<button type="submit">Search</button>
</form>"#,
        number = attr(form.case_number),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::cases;
    use crate::models::SearchStats;

    fn case(id: i32, number: &str, status: &str) -> cases::Model {
        cases::Model {
            id,
            case_type: "Civil Appeal".to_string(),
            case_number: number.to_string(),
            filing_year: 2023,
            search_timestamp: "2025-08-01T10:30:00.000000Z".to_string(),
            response_data: None,
            status: status.to_string(),
        }
    }

    #[test]
    fn test_renders_stats_and_recent_cases() {
        let data = Dashboard {
            stats: SearchStats {
                total: 3,
                found: 1,
                not_found: 1,
                error: 1,
            },
            recent: vec![case(3, "77", "error"), case(2, "1234", "found")],
        };
        let types = vec!["Civil Appeal".to_string()];
        let html = dashboard(&data, &types, 2025, FormValues::default(), None, &[]);

        assert!(html.contains(r#"<span class="stat-value">3</span>"#));
        assert!(html.contains(r#"href="/case/3""#));
        assert!(html.contains("Civil Appeal 1234/2023"));
        assert!(html.contains(r#"<option value="1950">1950</option>"#));
    }

    #[test]
    fn test_keeps_submitted_values_and_error() {
        let data = Dashboard {
            stats: SearchStats::default(),
            recent: Vec::new(),
        };
        let types = vec!["Civil Appeal".to_string(), "Bail Application".to_string()];
        let form = FormValues {
            case_type: "bail application",
            case_number: "12\"a",
            filing_year: "2024",
        };
        let html = dashboard(
            &data,
            &types,
            2025,
            form,
            Some("Invalid case number format"),
            &[],
        );

        assert!(html.contains(r#"<option value="Bail Application" selected>"#));
        assert!(html.contains(r#"<option value="2024" selected>"#));
        assert!(html.contains("12&quot;a"));
        assert!(html.contains("Invalid case number format"));
        assert!(html.contains("No searches yet."));
    }
}
