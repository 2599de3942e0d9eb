//! Server-rendered HTML pages.
//!
//! Pages are assembled with `format!`; every value that came from a user or
//! from the court site goes through [`text`] or [`attr`] first.

use chrono::{DateTime, NaiveDate, Utc};
use std::borrow::Cow;
use std::fmt::Write as _;

use crate::api::flash::Flash;

pub mod case_detail;
pub mod dashboard;
pub mod error;
pub mod history;

pub use case_detail::case_detail;
pub use dashboard::{FormValues, dashboard};
pub use error::error_page;
pub use history::history;

pub(crate) fn text(value: &str) -> Cow<'_, str> {
    html_escape::encode_text(value)
}

pub(crate) fn attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// Wraps page content in the shared layout with navigation and flash messages.
#[must_use]
pub fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    let mut notices = String::new();
    for flash in flashes {
        let _ = write!(
            notices,
            r#"<div class="flash {}">{}</div>"#,
            flash.level.css_class(),
            text(&flash.message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Court Data Fetcher</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header class="site-header">
  <a class="brand" href="/">Court Data Fetcher</a>
  <nav><a href="/">Dashboard</a><a href="/history">History</a></nav>
</header>
<main>
{notices}
{body}
</main>
</body>
</html>
"#,
        title = text(title),
    )
}

/// `2023-01-15` as `15 January 2023`; anything unparseable is shown as stored.
#[must_use]
pub fn display_date(value: Option<&str>) -> String {
    match value {
        None | Some("") => "Not available".to_string(),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_or_else(|_| raw.to_string(), |d| d.format("%d %B %Y").to_string()),
    }
}

#[must_use]
pub fn display_timestamp(value: &str) -> String {
    DateTime::parse_from_rfc3339(value).map_or_else(
        |_| value.to_string(),
        |t| t.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}

pub(crate) fn status_badge(status: &str) -> String {
    let (class, label) = match status.parse::<crate::domain::CaseStatus>() {
        Ok(s) => (s.as_str(), s.label()),
        Err(_) => ("unknown", status),
    };
    format!(
        r#"<span class="badge badge-{}">{}</span>"#,
        attr(class),
        text(label)
    )
}
