//! Field-level normalization of raw extracted records.
//!
//! Maps whatever shape the model produced onto the canonical [`Item`].
//! Normalization is idempotent: running an already-normalized record
//! through again yields an identical result.

use serde_json::Value;

use crate::models::{Category, Item};

/// Score assumed when the model omitted one or produced garbage.
const DEFAULT_CONFIDENCE: u8 = 50;

/// Maps a raw record onto the canonical [`Item`] shape.
///
/// Returns `None` when the record has no usable name - such records cannot
/// be displayed or aggregated and are dropped, not surfaced.
pub fn normalize_record(raw: &Value, has_video: bool) -> Option<Item> {
    let obj = raw.as_object()?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");
    if name.is_empty() {
        return None;
    }

    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .map(Category::from)
        .unwrap_or(Category::Other);

    Some(Item {
        name: name.to_string(),
        url: text_field(obj, "url"),
        image: text_field(obj, "image"),
        category,
        confidence: normalize_confidence(obj.get("confidence")),
        ad_platform: text_field(obj, "adPlatform"),
        ad_angle: text_field(obj, "adAngle"),
        target_audience: text_field(obj, "targetAudience"),
        ad_script: text_field(obj, "adScript"),
        summary: text_field(obj, "summary"),
        verdict: text_field(obj, "verdict"),
        advice: text_field(obj, "advice"),
        demand_signal: text_field(obj, "demandSignal"),
        ad_quality: text_field(obj, "adQuality"),
        trend_timing: text_field(obj, "trendTiming"),
        engagement: text_field(obj, "engagement"),
        has_video,
    })
}

fn text_field(obj: &serde_json::Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
        .to_string()
}

/// Canonicalizes a confidence score to an integer in 0-100.
///
/// The source models disagree on whether confidence is a 0-100 integer or
/// a 0-1 fraction, so both are accepted: values with a fractional part or
/// lying in [0, 1] are treated as fractions and scaled x100 (`1.5` is a
/// scaling artifact, not 1.5%). Everything clamps to [0, 100] afterwards,
/// which keeps already-normalized integers stable under re-normalization.
fn normalize_confidence(value: Option<&Value>) -> u8 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    let Some(mut score) = parsed else {
        return DEFAULT_CONFIDENCE;
    };
    if !score.is_finite() {
        return DEFAULT_CONFIDENCE;
    }

    if score.fract() != 0.0 || (0.0..=1.0).contains(&score) {
        score *= 100.0;
    }

    score.round().clamp(0.0, 100.0) as u8
}
