//! End-to-end tests: real router over HTTP, stubbed model client.

use std::sync::Arc;

use async_trait::async_trait;
use trendsniper::analyze::Analyzer;
use trendsniper::api::{build_app, AppState};
use trendsniper::client::ModelClient;
use trendsniper::config::Config;
use trendsniper::error::AnalyzeError;
use trendsniper::leaderboard::{InMemoryStore, Leaderboard};

const CONTENT: &str =
    "This page shows a wireless earbuds ad with heavy engagement and thousands of reviews.";

struct StubModel(String);

#[async_trait]
impl ModelClient for StubModel {
    async fn complete(&self, _prompt: &str) -> Result<String, AnalyzeError> {
        Ok(self.0.clone())
    }
}

/// Binds the full application on an ephemeral port and returns its base URL.
async fn spawn_app(model_reply: &str) -> String {
    let config = Config::default();
    let model = Arc::new(StubModel(model_reply.to_string()));
    let leaderboard = Leaderboard::new(Arc::new(InMemoryStore::new()));
    let analyzer = Arc::new(Analyzer::new(model, leaderboard.clone(), &config));

    let state = AppState {
        analyzer,
        leaderboard,
        verify_codes: Arc::new(config.verify.codes.clone()),
        proxy_client: reqwest::Client::new(),
        top_limit: config.leaderboard.top_limit,
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_app(state)).await.unwrap();
    });

    format!("http://{addr}")
}

fn stub_items(n: usize) -> String {
    let items: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "name": format!("Product {i}"),
                "category": "Tech",
                "confidence": 0.9
            })
        })
        .collect();
    format!("Here you go:\n{}\nHope that helps!", serde_json::to_string(&items).unwrap())
}

#[tokio::test]
async fn analyze_returns_capped_items_and_feeds_leaderboard() {
    let base = spawn_app(&stub_items(8)).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/analyze-multi"))
        .json(&serde_json::json!({ "content": CONTENT, "pro": false, "type": "products" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["name"], "Product 0");
    assert_eq!(items[0]["confidence"], 90);
    assert_eq!(items[0]["category"], "Tech");

    // The rationed collection was aggregated before the response returned.
    let board: serde_json::Value = client
        .get(format!("{base}/leaderboard"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let top = board["top"].as_array().unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0]["count"], 1);
}

#[tokio::test]
async fn pro_tier_gets_the_expanded_cap() {
    let base = spawn_app(&stub_items(14)).await;

    let body: serde_json::Value = reqwest::Client::new()
        .post(format!("{base}/analyze-multi"))
        .json(&serde_json::json!({ "content": CONTENT, "pro": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn short_content_is_rejected_with_400() {
    let base = spawn_app(&stub_items(1)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/analyze-multi"))
        .json(&serde_json::json!({ "content": "too short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("too short"));
    assert!(body.get("raw").is_none());
}

#[tokio::test]
async fn malformed_model_reply_is_500_with_raw_diagnostics() {
    let base = spawn_app("[{\"name\": }]").await;

    let response = reqwest::Client::new()
        .post(format!("{base}/analyze-multi"))
        .json(&serde_json::json!({ "content": CONTENT }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid JSON"));
    assert_eq!(body["raw"], "[{\"name\": }]");
}

#[tokio::test]
async fn videos_hint_marks_items_has_video() {
    let base = spawn_app(&stub_items(2)).await;

    let body: serde_json::Value = reqwest::Client::new()
        .post(format!("{base}/analyze-multi"))
        .json(&serde_json::json!({
            "content": CONTENT,
            "videos": ["https://cdn.example.com/ad.mp4"]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["items"][0]["hasVideo"], true);
}

#[tokio::test]
async fn verify_checks_the_allow_list() {
    let base = spawn_app(&stub_items(1)).await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .get(format!("{base}/verify?code=PURL2024"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["valid"], true);

    let body: serde_json::Value = client
        .get(format!("{base}/verify?code=NOPE"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let base = spawn_app(&stub_items(1)).await;

    let body: serde_json::Value = reqwest::Client::new()
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}
