//! Analysis orchestrator: the request pipeline.
//!
//! Validates the request, calls the model, pipes the raw reply through
//! extraction and normalization, rations the result by tier, and folds the
//! final collection into the leaderboard.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::ModelClient;
use crate::config::{Config, TiersConfig};
use crate::error::AnalyzeError;
use crate::extract;
use crate::leaderboard::Leaderboard;
use crate::models::{AnalysisRequest, Item};
use crate::normalize;
use crate::prompt;
use crate::tier;

pub struct Analyzer {
    model: Arc<dyn ModelClient>,
    leaderboard: Leaderboard,
    min_content_length: usize,
    tiers: TiersConfig,
}

impl Analyzer {
    pub fn new(model: Arc<dyn ModelClient>, leaderboard: Leaderboard, config: &Config) -> Self {
        Self {
            model,
            leaderboard,
            min_content_length: config.analysis.min_content_length,
            tiers: config.tiers.clone(),
        }
    }

    /// Runs one analysis call end to end.
    ///
    /// Leaderboard aggregation is best-effort relative to the primary
    /// response: a store failure is logged, never propagated, since losing
    /// a popularity count is recoverable but losing the caller's answer is
    /// not. No aggregation happens on any failure path - partial analyses
    /// are never partially aggregated.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<Vec<Item>, AnalyzeError> {
        let content = request.content.trim();
        let length = content.chars().count();
        if length < self.min_content_length {
            return Err(AnalyzeError::InputTooShort {
                actual: length,
                minimum: self.min_content_length,
            });
        }

        let cap = tier::cap_for(request.tier, request.analysis_type, &self.tiers);
        let prompt = prompt::build_prompt(request.analysis_type, cap, content);

        debug!(
            tier = %request.tier,
            analysis_type = %request.analysis_type,
            content_chars = length,
            "dispatching model request"
        );
        let raw = self.model.complete(&prompt).await?;

        let records = extract::extract_records(&raw)?;
        let items: Vec<Item> = records
            .iter()
            .filter_map(|record| normalize::normalize_record(record, request.has_video_hint))
            .collect();

        let dropped = records.len() - items.len();
        if dropped > 0 {
            debug!(dropped, "discarded records without a usable name");
        }

        let items = tier::apply_cap(items, cap);
        info!(count = items.len(), "analysis complete");

        // Aggregation runs on a detached task: once the model call has
        // returned, a client disconnect must not leave the batch half
        // counted. Awaiting the handle keeps the response and the counter
        // in step for callers that do stay around; if this future is
        // dropped mid-await, the spawned task still runs to completion.
        let leaderboard = self.leaderboard.clone();
        let batch = items.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = leaderboard.record(&batch).await {
                warn!("leaderboard update failed: {e}");
            }
        });
        let _ = handle.await;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::InMemoryStore;
    use crate::models::{AnalysisType, Tier};
    use async_trait::async_trait;

    struct StubModel(String);

    #[async_trait]
    impl ModelClient for StubModel {
        async fn complete(&self, _prompt: &str) -> Result<String, AnalyzeError> {
            Ok(self.0.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ModelClient for FailingModel {
        async fn complete(&self, _prompt: &str) -> Result<String, AnalyzeError> {
            Err(AnalyzeError::UpstreamModel("connection refused".to_string()))
        }
    }

    fn analyzer_with(model: Arc<dyn ModelClient>) -> (Analyzer, Leaderboard) {
        let leaderboard = Leaderboard::new(Arc::new(InMemoryStore::new()));
        let analyzer = Analyzer::new(model, leaderboard.clone(), &Config::default());
        (analyzer, leaderboard)
    }

    fn request(content: &str, tier: Tier) -> AnalysisRequest {
        AnalysisRequest {
            content: content.to_string(),
            tier,
            analysis_type: AnalysisType::Product,
            has_video_hint: false,
        }
    }

    fn long_content() -> String {
        "This page shows a wireless earbuds ad with heavy engagement.".to_string()
    }

    #[tokio::test]
    async fn test_short_content_rejected_before_model_call() {
        let (analyzer, leaderboard) = analyzer_with(Arc::new(FailingModel));
        // FailingModel would error if reached; the length check fires first.
        let err = analyzer.analyze(request("too short", Tier::Free)).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::InputTooShort { .. }));
        assert!(leaderboard.top(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_happy_path_extracts_normalizes_and_caps() {
        let reply: Vec<serde_json::Value> = (0..8)
            .map(|i| serde_json::json!({"name": format!("Product {i}"), "confidence": 0.9}))
            .collect();
        let raw = format!("Sure! Here you go:\n{}", serde_json::to_string(&reply).unwrap());

        let (analyzer, leaderboard) = analyzer_with(Arc::new(StubModel(raw)));
        let items = analyzer.analyze(request(&long_content(), Tier::Free)).await.unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].name, "Product 0");
        assert_eq!(items[0].confidence, 90);

        // Only the rationed collection is aggregated.
        let top = leaderboard.top(10).await.unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].count, 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_surfaces_without_aggregation() {
        let (analyzer, leaderboard) = analyzer_with(Arc::new(FailingModel));
        let err = analyzer.analyze(request(&long_content(), Tier::Pro)).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::UpstreamModel(_)));
        assert!(leaderboard.top(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_model_output_leaves_aggregator_untouched() {
        let (analyzer, leaderboard) = analyzer_with(Arc::new(StubModel("   ".to_string())));
        let err = analyzer.analyze(request(&long_content(), Tier::Free)).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::EmptyOutput));
        assert!(leaderboard.top(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nameless_records_dropped_not_surfaced() {
        let raw = r#"[{"name": "Widget"}, {"confidence": 99}, {"name": ""}]"#.to_string();
        let (analyzer, _) = analyzer_with(Arc::new(StubModel(raw)));
        let items = analyzer.analyze(request(&long_content(), Tier::Pro)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Widget");
    }
}
