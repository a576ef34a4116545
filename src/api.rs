//! HTTP surface: routing, wire shapes, error mapping.
//!
//! The router is deliberately thin - all pipeline behavior lives in
//! [`crate::analyze`]; handlers translate between wire shapes and the
//! orchestrator and map [`AnalyzeError`] onto status codes.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::analyze::Analyzer;
use crate::error::AnalyzeError;
use crate::leaderboard::Leaderboard;
use crate::models::{AnalysisRequest, AnalysisType, Item, LeaderboardEntry, Tier};

/// Analyze request bodies are capped; page dumps from the extension can be
/// large but 2 MB is already generous.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub leaderboard: Leaderboard,
    pub verify_codes: Arc<Vec<String>>,
    pub proxy_client: reqwest::Client,
    pub top_limit: usize,
}

/// Structured error body. `raw` carries the model's text for parse
/// failures only - callers need it to debug prompt/model drift.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            raw: None,
            status,
        }
    }
}

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        let status = match err {
            AnalyzeError::InputTooShort { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            raw: err.raw_output().map(ToOwned::to_owned),
            error: err.to_string(),
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeMultiBody {
    #[serde(default)]
    content: String,
    #[serde(default)]
    pro: bool,
    #[serde(default = "default_analysis_type", rename = "type")]
    analysis_type: AnalysisType,
    #[serde(default)]
    videos: Vec<String>,
}

fn default_analysis_type() -> AnalysisType {
    AnalysisType::Product
}

#[derive(Debug, Serialize)]
struct ItemsResponse {
    items: Vec<Item>,
}

#[derive(Debug, Serialize)]
struct LeaderboardResponse {
    top: Vec<LeaderboardEntry>,
}

#[derive(Debug, Deserialize)]
struct VerifyQuery {
    #[serde(default)]
    code: String,
}

#[derive(Debug, Serialize)]
struct VerifyResponse {
    valid: bool,
}

#[derive(Debug, Deserialize)]
struct ProxyQuery {
    url: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
}

async fn analyze_multi(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeMultiBody>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let request = AnalysisRequest {
        content: body.content,
        tier: if body.pro { Tier::Pro } else { Tier::Free },
        analysis_type: body.analysis_type,
        has_video_hint: !body.videos.is_empty(),
    };

    let items = state.analyzer.analyze(request).await?;
    Ok(Json(ItemsResponse { items }))
}

async fn leaderboard_top(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let top = state.leaderboard.top(state.top_limit).await.map_err(|e| {
        tracing::error!("leaderboard read failed: {e}");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to read leaderboard",
        )
    })?;
    Ok(Json(LeaderboardResponse { top }))
}

async fn verify(State(state): State<AppState>, Query(q): Query<VerifyQuery>) -> Json<VerifyResponse> {
    let valid = state.verify_codes.iter().any(|code| code == &q.code);
    Json(VerifyResponse { valid })
}

/// Opaque passthrough fetch, mainly for product images the extension
/// cannot load cross-origin itself.
async fn proxy(
    State(state): State<AppState>,
    Query(q): Query<ProxyQuery>,
) -> Result<Response, ApiError> {
    if !q.url.starts_with("http://") && !q.url.starts_with("https://") {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "proxy url must be http or https",
        ));
    }

    let upstream = state
        .proxy_client
        .get(&q.url)
        .send()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, format!("proxy fetch failed: {e}")))?;

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, format!("proxy read failed: {e}")))?;

    Ok((status, [(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

async fn health() -> Json<HealthData> {
    Json(HealthData { status: "ok" })
}

/// Builds the application router. CORS is wide open: the callers are
/// browser extensions running on arbitrary origins.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/analyze-multi",
            post(analyze_multi).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route("/leaderboard", get(leaderboard_top))
        .route("/verify", get(verify))
        .route("/proxy", get(proxy))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_too_short_maps_to_bad_request() {
        let api: ApiError = AnalyzeError::InputTooShort {
            actual: 5,
            minimum: 30,
        }
        .into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.raw.is_none());
    }

    #[test]
    fn test_parse_failures_carry_raw_output() {
        let api: ApiError = AnalyzeError::MalformedJson {
            message: "expected value".to_string(),
            raw: "[{oops".to_string(),
        }
        .into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.raw.as_deref(), Some("[{oops"));
    }

    #[test]
    fn test_upstream_failures_hide_raw() {
        let api: ApiError = AnalyzeError::UpstreamModel("timeout".to_string()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.raw.is_none());
    }

    #[test]
    fn test_analyze_body_defaults() {
        let body: AnalyzeMultiBody =
            serde_json::from_str(r#"{"content": "some page text"}"#).unwrap();
        assert!(!body.pro);
        assert_eq!(body.analysis_type, AnalysisType::Product);
        assert!(body.videos.is_empty());

        let body: AnalyzeMultiBody =
            serde_json::from_str(r#"{"content": "x", "pro": true, "type": "ads"}"#).unwrap();
        assert!(body.pro);
        assert_eq!(body.analysis_type, AnalysisType::Ad);
    }
}
