use axum::body::{to_bytes, Body};
use axum::http::Request;
use serde_json::{json, Value};
use tower::ServiceExt;

use leadscout_workflow::testing::{test_lead, MockProvider, MockScraper};
use leadscout_workflow::PgLeadStore;

use super::*;

fn app_with(pool: PgPool, provider: MockProvider, scraper: MockScraper) -> Router {
    let state = AppState::new(
        pool.clone(),
        Arc::new(provider),
        Arc::new(scraper),
        Arc::new(PgLeadStore::new(pool)),
        20,
    );
    build_app(state)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    };
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_session(app: &Router) -> String {
    let (status, body) = send_json(app, "POST", "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::OK, "session creation failed: {body}");
    body["data"]["session_id"]
        .as_str()
        .expect("session_id")
        .to_owned()
}

fn search_body() -> Value {
    json!({"term": "bakery", "locations": ["10001"], "radius_m": 5000})
}

// ---------------------------------------------------------------------------
// Serialization and error-mapping units (no DB)
// ---------------------------------------------------------------------------

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_session_busy_maps_to_conflict() {
    let response = ApiError::new("req-1", "session_busy", "busy").into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[test]
fn api_error_upstream_error_maps_to_bad_gateway() {
    let response = ApiError::new("req-1", "upstream_error", "provider down").into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn api_error_unknown_code_maps_to_internal_error() {
    let response = ApiError::new("req-1", "mystery", "??").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn map_workflow_error_gives_each_kind_a_distinct_code() {
    use leadscout_core::QueryError;

    let cases = [
        (
            WorkflowError::Validation(QueryError::EmptyTerm),
            "validation_error",
        ),
        (
            WorkflowError::ListNameConflict {
                name: "Leads1".into(),
            },
            "conflict",
        ),
        (
            WorkflowError::ListNotFound { id: Uuid::new_v4() },
            "not_found",
        ),
    ];
    for (error, expected) in cases {
        let mapped = map_workflow_error("req-1".to_owned(), &error);
        assert_eq!(mapped.error.code, expected, "wrong code for {error}");
    }
}

// ---------------------------------------------------------------------------
// Session routes (DB-backed, provider/scraper mocked)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn search_returns_the_visible_window(pool: PgPool) {
    let provider = MockProvider::new().with_page(
        vec![test_lead("Near Bakery", None), test_lead("Far Bakery", None)],
        None,
    );
    let app = app_with(pool, provider, MockScraper::new());
    let session = create_session(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "search failed: {body}");
    let results = body["data"]["results"].as_array().expect("results");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["name"], "Near Bakery");
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["has_more_pages"], false);
    assert_eq!(body["data"]["all_shown"], true);
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_on_unknown_session_is_404(pool: PgPool) {
    let app = app_with(pool, MockProvider::new(), MockScraper::new());
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/search", Uuid::new_v4()),
        Some(search_body()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_with_empty_term_is_a_validation_error(pool: PgPool) {
    let app = app_with(pool, MockProvider::new(), MockScraper::new());
    let session = create_session(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(json!({"term": "   ", "locations": ["10001"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_provider_failure_is_bad_gateway(pool: PgPool) {
    let provider = MockProvider::new().with_failure("provider exploded");
    let app = app_with(pool, provider, MockScraper::new());
    let session = create_session(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "upstream_error");
}

#[sqlx::test(migrations = "../../migrations")]
async fn pagination_walkthrough_appends_then_goes_quiet(pool: PgPool) {
    let provider = MockProvider::new()
        .with_page(vec![test_lead("A", None), test_lead("B", None)], Some("t1"))
        .with_page(vec![test_lead("C", None)], None);
    let app = app_with(pool, provider, MockScraper::new());
    let session = create_session(&app).await;

    let (_, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["has_more_pages"], true);

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/load-more"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["appended"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["has_more_pages"], false);

    // No token left: a further load-more appends nothing.
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/load-more"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["appended"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["data"]["total"], 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn show_more_reveals_the_next_page_locally(pool: PgPool) {
    let leads: Vec<_> = (0..30)
        .map(|i| test_lead(&format!("Lead {i}"), None))
        .collect();
    let provider = MockProvider::new().with_page(leads, None);
    let app = app_with(pool, provider, MockScraper::new());
    let session = create_session(&app).await;

    let (_, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;
    assert_eq!(body["data"]["results"].as_array().map(Vec::len), Some(20));
    assert_eq!(body["data"]["all_shown"], false);

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/show-more"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["results"].as_array().map(Vec::len), Some(30));
    assert_eq!(body["data"]["all_shown"], true);
}

#[sqlx::test(migrations = "../../migrations")]
async fn enrich_one_returns_the_updated_lead(pool: PgPool) {
    let provider = MockProvider::new().with_page(
        vec![test_lead("Bakery", Some("https://bakery.example"))],
        None,
    );
    let scraper = MockScraper::new().with_emails("https://bakery.example", &["hi@bakery.example"]);
    let app = app_with(pool, provider, scraper);
    let session = create_session(&app).await;

    send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/enrich"),
        Some(json!({"index": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lead"]["emails"][0], "hi@bakery.example");
}

#[sqlx::test(migrations = "../../migrations")]
async fn enrich_all_reports_partial_failures(pool: PgPool) {
    let provider = MockProvider::new().with_page(
        vec![
            test_lead("One", Some("https://one.example")),
            test_lead("Two", Some("https://two.example")),
        ],
        None,
    );
    let scraper = MockScraper::new()
        .with_emails("https://one.example", &["a@one.example"])
        .with_failure("https://two.example", "blocked");
    let app = app_with(pool, provider, scraper);
    let session = create_session(&app).await;

    send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/enrich-all"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["emails_found"], 1);
    assert_eq!(body["data"]["items_with_emails"], 1);
    assert_eq!(body["data"]["failures"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["failures"][0]["name"], "Two");
}

// ---------------------------------------------------------------------------
// Saves and list routes (fully DB-backed)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn save_all_creates_a_list_and_name_reuse_conflicts(pool: PgPool) {
    let provider = MockProvider::new()
        .with_page(vec![test_lead("A", None), test_lead("B", None)], None)
        .with_page(vec![test_lead("C", None)], None);
    let app = app_with(pool, provider, MockScraper::new());

    let session = create_session(&app).await;
    send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/save"),
        Some(json!({"new_name": "Leads1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "save failed: {body}");
    assert_eq!(body["data"]["name"], "Leads1");
    assert_eq!(body["data"]["item_count"], 2);

    // A second session saving under the same name must conflict.
    let session2 = create_session(&app).await;
    send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session2}/search"),
        Some(search_body()),
    )
    .await;
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session2}/save"),
        Some(json!({"new_name": "Leads1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    // The original list is unaffected by the failed save.
    let (_, body) = send_json(&app, "GET", "/api/v1/lists", None).await;
    let lists = body["data"].as_array().expect("lists");
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0]["item_count"], 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn save_one_appends_to_an_existing_list(pool: PgPool) {
    let provider = MockProvider::new().with_page(
        vec![test_lead("A", None), test_lead("B", None)],
        None,
    );
    let app = app_with(pool, provider, MockScraper::new());
    let session = create_session(&app).await;
    send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;

    let (_, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/save"),
        Some(json!({"new_name": "Leads1"})),
    )
    .await;
    let list_id = body["data"]["id"].as_str().expect("list id").to_owned();

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/save"),
        Some(json!({"index": 0, "list_id": list_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item_count"], 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn save_requires_exactly_one_target(pool: PgPool) {
    let provider = MockProvider::new().with_page(vec![test_lead("A", None)], None);
    let app = app_with(pool, provider, MockScraper::new());
    let session = create_session(&app).await;
    send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/save"),
        Some(json!({"new_name": "X", "list_id": Uuid::new_v4()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_detail_delete_roundtrip(pool: PgPool) {
    let provider = MockProvider::new().with_page(vec![test_lead("A", None)], None);
    let app = app_with(pool, provider, MockScraper::new());
    let session = create_session(&app).await;
    send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;
    let (_, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/save"),
        Some(json!({"new_name": "Leads1"})),
    )
    .await;
    let list_id = body["data"]["id"].as_str().expect("list id").to_owned();

    let (status, body) = send_json(&app, "GET", &format!("/api/v1/lists/{list_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));

    let (status, _) = send_json(&app, "DELETE", &format!("/api/v1/lists/{list_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, "GET", &format!("/api/v1/lists/{list_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[sqlx::test(migrations = "../../migrations")]
async fn export_serves_a_csv_attachment(pool: PgPool) {
    let provider = MockProvider::new().with_page(
        vec![test_lead("Corner Bakery", Some("https://corner.example"))],
        None,
    );
    let app = app_with(pool, provider, MockScraper::new());
    let session = create_session(&app).await;
    send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;
    let (_, body) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/save"),
        Some(json!({"new_name": "May Leads"})),
    )
    .await;
    let list_id = body["data"]["id"].as_str().expect("list id").to_owned();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/lists/{list_id}/export"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(content_type.starts_with("text/csv"), "got {content_type}");
    let disposition = response
        .headers()
        .get(axum::http::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(
        disposition.contains("May_Leads.csv"),
        "got {disposition}"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(text.starts_with("Business Name,"));
    assert!(text.contains("Corner Bakery"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleted_session_is_gone(pool: PgPool) {
    let app = app_with(pool, MockProvider::new(), MockScraper::new());
    let session = create_session(&app).await;

    let (status, _) = send_json(&app, "DELETE", &format!("/api/v1/sessions/{session}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session}/search"),
        Some(search_body()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
