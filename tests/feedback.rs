//! Router-level tests for the feedback route, driving the real handlers with
//! an in-memory row store and a scripted enricher.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use resena::agents::{EnrichError, Enricher};
use resena::config::{Config, Enrichment};
use resena::routes;
use resena::sheets::{RowStore, StoreError};
use resena::state::AppState;

#[derive(Default)]
struct MemoryRows {
    rows: Mutex<Vec<Vec<String>>>,
}

impl MemoryRows {
    fn snapshot(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RowStore for MemoryRows {
    async fn append_row(&self, cells: &[String]) -> Result<(), StoreError> {
        self.rows.lock().unwrap().push(cells.to_vec());
        Ok(())
    }
}

struct ScriptedEnricher {
    reply: String,
    image_url: String,
}

impl ScriptedEnricher {
    fn new(reply: &str, image_url: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            image_url: image_url.to_string(),
        })
    }
}

#[async_trait]
impl Enricher for ScriptedEnricher {
    async fn summarize(&self, _feedback: &str) -> Result<String, EnrichError> {
        Ok(self.reply.clone())
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String, EnrichError> {
        Ok(self.image_url.clone())
    }
}

fn test_app(
    enrichment: Enrichment,
    rows: Arc<MemoryRows>,
    enricher: Arc<dyn Enricher>,
) -> Router {
    let config = Config {
        google_credentials_json: String::new(),
        spreadsheet_id: "test-sheet".to_string(),
        sheet_range: "Sheet1".to_string(),
        openai_api_key: String::new(),
        enrichment,
        host: "127.0.0.1".to_string(),
        port: 0,
    };

    let state = Arc::new(AppState {
        rows,
        enricher,
        config: Arc::new(config),
    });

    routes::router(state)
}

fn baseline_app(rows: Arc<MemoryRows>) -> Router {
    test_app(
        Enrichment::None,
        rows,
        ScriptedEnricher::new("unused", "unused"),
    )
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, body: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/feedback")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn form_round_trips_query_parameters() {
    let rows = Arc::new(MemoryRows::default());
    let app = baseline_app(rows);

    let response = get(
        &app,
        "/feedback?pr_url=https%3A%2F%2Fx%2Fpr%2F1&reviewer=alice",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    // tera autoescaping renders `/` as &#x2F; inside attribute values.
    assert!(body.contains(r#"name="pr_url" value="https:&#x2F;&#x2F;x&#x2F;pr&#x2F;1""#));
    assert!(body.contains(r#"name="reviewer" value="alice""#));
}

#[tokio::test]
async fn form_defaults_to_empty_hidden_fields() {
    let rows = Arc::new(MemoryRows::default());
    let app = baseline_app(rows);

    let body = body_string(get(&app, "/feedback").await).await;
    assert!(body.contains(r#"name="pr_url" value="""#));
    assert!(body.contains(r#"name="reviewer" value="""#));
}

#[tokio::test]
async fn get_never_appends_a_row() {
    let rows = Arc::new(MemoryRows::default());
    let app = baseline_app(rows.clone());

    get(&app, "/feedback?pr_url=u&reviewer=r").await;
    get(&app, "/feedback").await;

    assert!(rows.snapshot().is_empty());
}

#[tokio::test]
async fn baseline_post_appends_four_cell_row() {
    let rows = Arc::new(MemoryRows::default());
    let app = baseline_app(rows.clone());

    let response = post_form(
        &app,
        "rating=4&feedback=Nice+work&pr_url=https%3A%2F%2Fx%2Fpr%2F1&reviewer=alice",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        rows.snapshot(),
        vec![vec![
            "https://x/pr/1".to_string(),
            "alice".to_string(),
            "4".to_string(),
            "Nice work".to_string(),
        ]]
    );

    let body = body_string(response).await;
    assert!(body.contains("Thank you for your feedback!"));
    assert!(!body.contains("<img"));
}

#[tokio::test]
async fn every_valid_rating_appends_exactly_one_row() {
    for rating in 1..=5 {
        let rows = Arc::new(MemoryRows::default());
        let app = baseline_app(rows.clone());

        let response =
            post_form(&app, &format!("rating={rating}&feedback=ok&pr_url=u&reviewer=r")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let stored = rows.snapshot();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0],
            vec![
                "u".to_string(),
                "r".to_string(),
                rating.to_string(),
                "ok".to_string(),
            ]
        );
    }
}

#[tokio::test]
async fn duplicate_posts_append_two_rows() {
    let rows = Arc::new(MemoryRows::default());
    let app = baseline_app(rows.clone());

    post_form(&app, "rating=5&feedback=again&pr_url=u&reviewer=r").await;
    post_form(&app, "rating=5&feedback=again&pr_url=u&reviewer=r").await;

    assert_eq!(rows.snapshot().len(), 2);
}

#[tokio::test]
async fn missing_optional_fields_become_empty_cells() {
    let rows = Arc::new(MemoryRows::default());
    let app = baseline_app(rows.clone());

    let response = post_form(&app, "rating=5").await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        rows.snapshot(),
        vec![vec![
            String::new(),
            String::new(),
            "5".to_string(),
            String::new(),
        ]]
    );
}

#[tokio::test]
async fn invalid_rating_is_rejected_without_a_row() {
    let rows = Arc::new(MemoryRows::default());
    let app = baseline_app(rows.clone());

    for body in ["rating=0&feedback=x", "rating=6", "rating=abc", "feedback=x"] {
        let response = post_form(&app, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
    }

    assert!(rows.snapshot().is_empty());
}

#[tokio::test]
async fn enriched_post_appends_seven_cell_row_and_shows_image() {
    let rows = Arc::new(MemoryRows::default());
    let enricher = ScriptedEnricher::new(
        "Summary: Great work\nDALL·E Prompt: a glowing checkmark",
        "https://img.example/pic.png",
    );
    let app = test_app(Enrichment::SummarizeAndImage, rows.clone(), enricher);

    let response = post_form(
        &app,
        "rating=5&feedback=Clean+refactor&pr_url=u&reviewer=bob",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        rows.snapshot(),
        vec![vec![
            "u".to_string(),
            "bob".to_string(),
            "5".to_string(),
            "Clean refactor".to_string(),
            "Great work".to_string(),
            "a glowing checkmark".to_string(),
            "https://img.example/pic.png".to_string(),
        ]]
    );

    let body = body_string(response).await;
    assert!(body.contains("Great work"));
    assert!(body.contains("Clean refactor"));
    assert!(body.contains("pic.png"));
}

#[tokio::test]
async fn summarize_mode_appends_six_cells_without_image() {
    let rows = Arc::new(MemoryRows::default());
    let enricher = ScriptedEnricher::new(
        "Summary: Solid tests\nDALL·E Prompt: a safety net",
        "https://img.example/unused.png",
    );
    let app = test_app(Enrichment::Summarize, rows.clone(), enricher);

    let response = post_form(&app, "rating=3&feedback=More+tests&pr_url=u&reviewer=r").await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        rows.snapshot(),
        vec![vec![
            "u".to_string(),
            "r".to_string(),
            "3".to_string(),
            "More tests".to_string(),
            "Solid tests".to_string(),
            "a safety net".to_string(),
        ]]
    );

    let body = body_string(response).await;
    assert!(body.contains("Solid tests"));
    assert!(!body.contains("<img"));
}

#[tokio::test]
async fn malformed_reply_falls_back_to_raw_feedback() {
    let rows = Arc::new(MemoryRows::default());
    let enricher = ScriptedEnricher::new("one unlabeled line", "https://img.example/pic.png");
    let app = test_app(Enrichment::SummarizeAndImage, rows.clone(), enricher);

    let response = post_form(&app, "rating=2&feedback=Too+terse&pr_url=u&reviewer=r").await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = rows.snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0][4], "Too terse");
    assert_eq!(stored[0][5], "Too terse");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let rows = Arc::new(MemoryRows::default());
    let app = baseline_app(rows);

    let response = get(&app, "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
