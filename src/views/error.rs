use super::{layout, text};
use crate::api::flash::Flash;

#[must_use]
pub fn error_page(status: u16, title: &str, message: &str, flashes: &[Flash]) -> String {
    let body = format!(
        r#"<section class="card error-page"><h1>{status} · {}</h1><p>{}</p><p><a href="/">Back to dashboard</a></p></section>"#,
        text(title),
        text(message)
    );
    layout(title, flashes, &body)
}
