//! End-to-end scraping against a fake court site served on localhost.

use axum::{
    Form, Router,
    body::Body,
    extract::Path,
    http::{HeaderMap, Request, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use court_fetcher::api::{create_app_state, router};
use court_fetcher::clients::{CaseSource, CourtClient, ScrapeError};
use court_fetcher::config::Config;
use court_fetcher::domain::{CaseId, OrderId, SearchQuery};
use court_fetcher::state::SharedState;
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

const SESSION_COOKIE: &str = "court_session=s-777";

const FORM_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<form action="/app/get-case-type-status" method="POST">
    <input type="hidden" name="_token" value="tok-123">
    <select id="case_type" name="case_type">
        <option value="">Select</option>
        <option value="CA">Civil Appeal</option>
        <option value="CRL.A.">Criminal Appeal</option>
    </select>
    <input type="text" id="case_number" name="case_number" placeholder="Case Number">
    <select id="case_year" name="case_year">
        <option value="2022">2022</option>
        <option value="2023">2023</option>
    </select>
    <label>Enter code: <span id="captcha-code">48213</span></label>
    <input type="text" id="captchaInput" name="captcha">
    <button type="submit">Submit</button>
</form>
</body></html>"#;

async fn form_page() -> Response {
    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/"))],
        Html(FORM_PAGE),
    )
        .into_response()
}

fn result_row(number: &str, links: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body>
<table class="table">
<tr><th>S.No.</th><th>Case</th><th>Parties</th><th>Listing</th><th>Orders</th></tr>
<tr>
  <td>1</td>
  <td>CA {number}/2023 [PENDING]</td>
  <td>ACME INDUSTRIES LTD. VS. UNION OF INDIA</td>
  <td>Filed: 15/01/2023 Next Date: 20/08/2025</td>
  <td>{links}</td>
</tr>
</table>
</body></html>"#
    )
}

async fn search_results(headers: HeaderMap, Form(fields): Form<HashMap<String, String>>) -> Response {
    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(SESSION_COOKIE));

    let field = |name: &str| fields.get(name).map(String::as_str).unwrap_or_default();

    if !has_cookie || field("_token") != "tok-123" || field("captcha") != "48213" {
        return (StatusCode::FORBIDDEN, "Invalid session or captcha").into_response();
    }
    if field("case_type") != "CA" || field("case_year") != "2023" {
        return Html("<p>No record found</p>".to_string()).into_response();
    }

    match field("case_number") {
        "1234" => Html(result_row(
            "1234",
            r#"<a href="/files/order-1.pdf">Order</a> <a href="/files/order-2.pdf">Judgment</a>"#,
        ))
        .into_response(),
        "4321" => Html(result_row("4321", r#"<a href="/orders/4321">View Orders</a>"#)).into_response(),
        "7777" => Html("<p>Temporarily garbled</p>".to_string()).into_response(),
        _ => Html(
            "<div class=\"alert\">No Record Found for the given input</div>".to_string(),
        )
        .into_response(),
    }
}

async fn orders_page(Path(number): Path<String>) -> Html<String> {
    Html(format!(
        r#"<table>
<tr><th>Date</th><th>Order</th></tr>
<tr><td>02/03/2024</td><td><a href="/files/o-{number}-1.pdf">Final Judgment</a></td></tr>
<tr><td>11/11/2023</td><td><a href="/files/o-{number}-2.pdf">Interim Order</a></td></tr>
</table>"#
    ))
}

async fn pdf_file(Path(name): Path<String>) -> Response {
    if name.starts_with("missing") {
        return StatusCode::NOT_FOUND.into_response();
    }
    (
        [(header::CONTENT_TYPE, "application/pdf")],
        format!("%PDF-1.4 {name}"),
    )
        .into_response()
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// The fake court, plus a counter of how many times the search form was loaded.
async fn spawn_counted_court() -> (String, Arc<AtomicUsize>) {
    let form_loads = Arc::new(AtomicUsize::new(0));
    let counter = form_loads.clone();

    let app = Router::new()
        .route(
            "/app/get-case-type-status",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                form_page()
            })
            .post(search_results),
        )
        .route("/orders/{number}", get(orders_page))
        .route("/files/{name}", get(pdf_file));

    (serve(app).await, form_loads)
}

async fn spawn_court() -> String {
    spawn_counted_court().await.0
}

/// A court site whose search page always answers with `status` and `page`.
async fn spawn_fixed_court(status: StatusCode, page: String) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().route(
        "/app/get-case-type-status",
        get(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let page = page.clone();
            async move { (status, Html(page)) }
        }),
    );

    (serve(app).await, hits)
}

#[tokio::test]
async fn test_client_reads_case_and_row_links() {
    let base = spawn_court().await;
    let client = CourtClient::new(&config_for(&base).scraper).unwrap();

    let case = client.fetch_case(&query("1234")).await.unwrap();

    assert_eq!(case.parties.plaintiff, "ACME INDUSTRIES LTD.");
    assert_eq!(case.parties.defendant, "UNION OF INDIA");
    assert_eq!(case.filing_date, NaiveDate::from_ymd_opt(2023, 1, 15));
    assert_eq!(case.next_hearing, NaiveDate::from_ymd_opt(2025, 8, 20));
    assert_eq!(case.status, "PENDING");
    assert_eq!(
        case.orders.iter().map(|o| o.pdf_url.as_str()).collect::<Vec<_>>(),
        vec![
            format!("{base}/files/order-1.pdf"),
            format!("{base}/files/order-2.pdf")
        ]
    );
    assert!(case.orders.iter().all(|o| o.order_type == "Order"));
    assert!(case.orders.iter().all(|o| o.date == case.filing_date));
}

#[tokio::test]
async fn test_client_follows_orders_page() {
    let base = spawn_court().await;
    let client = CourtClient::new(&config_for(&base).scraper).unwrap();

    let case = client.fetch_case(&query("4321")).await.unwrap();

    assert_eq!(case.orders.len(), 2);
    assert_eq!(case.orders[0].order_type, "Final Judgment");
    assert_eq!(case.orders[0].date, NaiveDate::from_ymd_opt(2024, 3, 2));
    assert_eq!(case.orders[1].order_type, "Interim Order");
    assert_eq!(case.orders[1].date, NaiveDate::from_ymd_opt(2023, 11, 11));
}

#[tokio::test]
async fn test_client_error_kinds() {
    let base = spawn_court().await;
    let client = CourtClient::new(&config_for(&base).scraper).unwrap();

    assert!(matches!(
        client.fetch_case(&query("9999")).await,
        Err(ScrapeError::NotFound)
    ));
    assert!(matches!(
        client.fetch_case(&query("7777")).await,
        Err(ScrapeError::Parse(_))
    ));

    let refused = CourtClient::new(&config_for("http://127.0.0.1:1").scraper).unwrap();
    let err = refused.fetch_case(&query("1234")).await.unwrap_err();
    assert!(err.is_network(), "{err:?}");

    assert!(matches!(
        client
            .download_pdf(&format!("{base}/app/get-case-type-status"))
            .await,
        Err(ScrapeError::NotPdf)
    ));
    assert!(matches!(
        client.download_pdf(&format!("{base}/files/missing.pdf")).await,
        Err(ScrapeError::UpstreamStatus(404))
    ));
}

#[tokio::test]
async fn test_captcha_probe_reads_numeric_code() {
    let base = spawn_court().await;
    let client = CourtClient::new(&config_for(&base).scraper).unwrap();

    let probe = client.probe_captcha().await.unwrap();
    assert_eq!(probe.kind, "numeric");
    assert_eq!(probe.value.as_deref(), Some("48213"));
    assert_eq!(probe.form_action, format!("{base}/app/get-case-type-status"));
}

#[tokio::test]
async fn test_search_and_download_through_the_dashboard() {
    let base = spawn_court().await;
    let shared = SharedState::new(config_for(&base)).await.unwrap();
    let state = create_app_state(Arc::new(shared), None);
    let app = router(state.clone()).unwrap();

    let response = app.clone().oneshot(post_search("1234")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/case/1");

    let record = state
        .store()
        .get_case_record(CaseId::new(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.case.status, "found");
    assert_eq!(record.orders.len(), 2);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download/2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"%PDF-1.4 order-2.pdf");

    let order = state
        .store()
        .get_order(OrderId::new(2))
        .await
        .unwrap()
        .unwrap();
    assert!(order.local_pdf_path.is_some());

    let response = app.clone().oneshot(post_search("9999")).await.unwrap();
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/case/2");

    let not_found = state.store().get_case(CaseId::new(2)).await.unwrap().unwrap();
    assert_eq!(not_found.status, "not_found");
    assert_eq!(state.store().count_orders().await.unwrap(), 2);
}

#[tokio::test]
async fn test_unreachable_site_records_error_row() {
    let shared = SharedState::new(config_for("http://127.0.0.1:1")).await.unwrap();
    let state = create_app_state(Arc::new(shared), None);
    let app = router(state.clone()).unwrap();

    let response = app.clone().oneshot(post_search("1234")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let case = state.store().get_case(CaseId::new(1)).await.unwrap().unwrap();
    assert_eq!(case.status, "error");
    assert!(
        case.response_data
            .as_deref()
            .is_some_and(|raw| raw.contains(r#""success":false"#))
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/search")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"case_type":"Civil Appeal","case_number":"1234","filing_year":2023}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(state.store().count_cases().await.unwrap(), 2);
}

#[tokio::test]
async fn test_server_errors_are_retried_up_to_the_limit() {
    let (base, hits) =
        spawn_fixed_court(StatusCode::SERVICE_UNAVAILABLE, "maintenance".to_string()).await;
    let mut config = config_for(&base);
    config.scraper.max_retries = 3;
    let client = CourtClient::new(&config.scraper).unwrap();

    let err = client.fetch_case(&query("1234")).await.unwrap_err();

    assert!(matches!(err, ScrapeError::UpstreamStatus(503)), "{err:?}");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_answers_from_the_court_are_not_retried() {
    let (base, form_loads) = spawn_counted_court().await;
    let mut config = config_for(&base);
    config.scraper.max_retries = 3;
    let client = CourtClient::new(&config.scraper).unwrap();

    assert!(matches!(
        client.fetch_case(&query("9999")).await,
        Err(ScrapeError::NotFound)
    ));
    assert_eq!(form_loads.load(Ordering::SeqCst), 1);

    assert!(matches!(
        client.fetch_case(&query("7777")).await,
        Err(ScrapeError::Parse(_))
    ));
    assert_eq!(form_loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_image_captcha_is_reported_as_unsupported() {
    let page = FORM_PAGE.replace(
        r#"<label>Enter code: <span id="captcha-code">48213</span></label>"#,
        r#"<img src="/captcha/image.png" alt="captcha">"#,
    );
    assert!(!page.contains("48213"));

    let (base, hits) = spawn_fixed_court(StatusCode::OK, page).await;
    let client = CourtClient::new(&config_for(&base).scraper).unwrap();

    assert!(matches!(
        client.fetch_case(&query("1234")).await,
        Err(ScrapeError::UnsupportedCaptcha)
    ));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

fn config_for(base: &str) -> Config {
    let id = uuid::Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("court-fetcher-flow-test-{id}.db"));
    let downloads = std::env::temp_dir().join(format!("court-fetcher-flow-test-{id}-pdfs"));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.general.downloads_path = downloads.display().to_string();
    config.scraper.base_url = base.to_string();
    config.scraper.request_delay_seconds = 0;
    config.scraper.retry_delay_seconds = 0;
    config
}

fn query(number: &str) -> SearchQuery {
    let types = vec!["Civil Appeal".to_string()];
    SearchQuery::parse("Civil Appeal", number, "2023", &types, 2025).unwrap()
}

fn post_search(number: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "case_type=Civil+Appeal&case_number={number}&filing_year=2023"
        )))
        .unwrap()
}
