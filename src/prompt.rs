//! Prompt construction for the model call.
//!
//! The wording leans hard on "array only, no commentary" because the
//! extractor downstream is strict about array interiors; the less prose
//! the model wraps around the array, the fewer salvage paths fire.

use crate::models::AnalysisType;

/// Builds the analysis prompt for one request. `cap` is the tier's item
/// cap, embedded so the model does not over-produce for free callers.
pub fn build_prompt(analysis_type: AnalysisType, cap: usize, content: &str) -> String {
    match analysis_type {
        AnalysisType::Product => build_product_prompt(cap, content),
        AnalysisType::Ad => build_ad_prompt(cap, content),
    }
}

fn build_product_prompt(cap: usize, content: &str) -> String {
    format!(
        r#"You are a strict JSON generator.

Given the following page content:
"""{content}"""

Extract up to {cap} winning products in pure JSON array format ONLY.
Each object should have:
- name (short and clear)
- url
- image
- category
- confidence (0-100)
- summary
- demandSignal
- trendTiming
- verdict
- advice

Respond ONLY with the array. No commentary. No wrapping."#
    )
}

fn build_ad_prompt(cap: usize, content: &str) -> String {
    format!(
        r#"You are a strict JSON generator.

Given the following page content:
"""{content}"""

Extract up to {cap} ad insights in pure JSON array format ONLY.
Each object should have:
- name (short and clear)
- url
- category
- confidence (0-100)
- adPlatform
- adAngle
- targetAudience
- adScript
- adQuality
- engagement
- summary
- verdict
- advice

Respond ONLY with the array. No commentary. No wrapping."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_cap_and_content() {
        let prompt = build_prompt(AnalysisType::Product, 3, "page text here");
        assert!(prompt.contains("up to 3 winning products"));
        assert!(prompt.contains("page text here"));
    }

    #[test]
    fn test_ad_prompt_asks_for_ad_fields() {
        let prompt = build_prompt(AnalysisType::Ad, 10, "x");
        assert!(prompt.contains("adPlatform"));
        assert!(prompt.contains("targetAudience"));
        assert!(!prompt.contains("demandSignal"));
    }
}
