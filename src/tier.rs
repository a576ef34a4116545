//! Tier policy: result-count rationing.
//!
//! Truncation preserves the order the model produced (assumed to reflect
//! its own confidence ranking) and never pads short results.

use crate::config::TiersConfig;
use crate::models::{AnalysisType, Item, Tier};

/// Resolves the item cap for one request.
///
/// Pro ad analyses may be granted a higher bound via `tiers.pro_ad_cap`;
/// unset means the plain pro cap applies to both analysis types.
pub fn cap_for(tier: Tier, analysis_type: AnalysisType, tiers: &TiersConfig) -> usize {
    match tier {
        Tier::Free => tiers.free_cap,
        Tier::Pro => match analysis_type {
            AnalysisType::Ad => tiers.pro_ad_cap.unwrap_or(tiers.pro_cap),
            AnalysisType::Product => tiers.pro_cap,
        },
    }
}

/// Truncates the collection to `cap`, keeping the original relative order.
pub fn apply_cap(mut items: Vec<Item>, cap: usize) -> Vec<Item> {
    items.truncate(cap);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item {
                name: format!("item-{i}"),
                ..Item::default()
            })
            .collect()
    }

    #[test]
    fn test_free_tier_caps_at_three() {
        let tiers = TiersConfig::default();
        let cap = cap_for(Tier::Free, AnalysisType::Product, &tiers);
        let capped = apply_cap(items(8), cap);
        assert_eq!(capped.len(), 3);
        // Original order preserved, no re-sorting.
        assert_eq!(capped[0].name, "item-0");
        assert_eq!(capped[2].name, "item-2");
    }

    #[test]
    fn test_pro_tier_caps_at_ten() {
        let tiers = TiersConfig::default();
        let cap = cap_for(Tier::Pro, AnalysisType::Product, &tiers);
        assert_eq!(apply_cap(items(14), cap).len(), 10);
    }

    #[test]
    fn test_short_results_are_never_padded() {
        let tiers = TiersConfig::default();
        let cap = cap_for(Tier::Pro, AnalysisType::Product, &tiers);
        assert_eq!(apply_cap(items(2), cap).len(), 2);
    }

    #[test]
    fn test_pro_ad_override() {
        let tiers = TiersConfig {
            pro_ad_cap: Some(15),
            ..TiersConfig::default()
        };
        assert_eq!(cap_for(Tier::Pro, AnalysisType::Ad, &tiers), 15);
        assert_eq!(cap_for(Tier::Pro, AnalysisType::Product, &tiers), 10);
        assert_eq!(cap_for(Tier::Free, AnalysisType::Ad, &tiers), 3);
    }
}
