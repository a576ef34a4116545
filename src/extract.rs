//! Response extraction from raw model output.
//!
//! Generative models routinely wrap JSON in prose, code fences, or truncate
//! it outright. The extractor is tolerant of formatting noise *around* a
//! valid array while staying strict about the array's internal validity:
//! corrupted data never passes silently.

use serde_json::Value;

use crate::error::AnalyzeError;

/// Replies shorter than this are treated as the model refusing or timing
/// out upstream.
const MIN_OUTPUT_LEN: usize = 10;

/// Parses zero-or-more raw (un-normalized) item records out of the model's
/// reply.
///
/// Strategy order: locate the outermost `[` .. `]` pair and parse the slice
/// as JSON; if no array boundaries exist at all, fall back to a
/// line-oriented `Label: value` parser. The fallback is never consulted
/// when array markers are present but their interior is malformed - that
/// stays a hard [`AnalyzeError::MalformedJson`], since ambiguous output
/// should not be silently reinterpreted.
pub fn extract_records(raw: &str) -> Result<Vec<Value>, AnalyzeError> {
    let trimmed = raw.trim();
    if trimmed.len() < MIN_OUTPUT_LEN {
        return Err(AnalyzeError::EmptyOutput);
    }

    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if start < end {
            let slice = &trimmed[start..=end];
            let value: Value =
                serde_json::from_str(slice).map_err(|e| AnalyzeError::MalformedJson {
                    message: e.to_string(),
                    raw: trimmed.to_string(),
                })?;
            return match value {
                Value::Array(records) => Ok(records),
                _ => Err(AnalyzeError::SchemaViolation {
                    raw: trimmed.to_string(),
                }),
            };
        }
    }

    // No array boundaries anywhere. A reply that is still valid JSON (e.g.
    // a single bare object) violated the array contract; everything else
    // goes through the line-oriented salvage.
    if serde_json::from_str::<Value>(trimmed).is_ok() {
        return Err(AnalyzeError::SchemaViolation {
            raw: trimmed.to_string(),
        });
    }

    let records = parse_labeled_lines(trimmed);
    if records.is_empty() {
        Err(AnalyzeError::NoArrayFound {
            raw: trimmed.to_string(),
        })
    } else {
        Ok(records)
    }
}

/// Line-oriented fallback for partially-structured free-text answers.
///
/// Lines matching `Label: value` accumulate into a running record; a
/// recognized name-equivalent label starting over begins a new record.
/// All values stay strings - the normalizer parses numbers later.
fn parse_labeled_lines(text: &str) -> Vec<Value> {
    let mut records = Vec::new();
    let mut current = serde_json::Map::new();

    for line in text.lines() {
        let line = strip_list_marker(line.trim());
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        // Tolerate markdown emphasis around the label ("**Product**: ...").
        let label = label.trim().trim_matches('*').trim().to_lowercase();
        let Some(key) = canonical_key(&label) else {
            continue;
        };

        if key == "name" && current.contains_key("name") {
            records.push(Value::Object(std::mem::take(&mut current)));
        }
        current.insert(key.to_string(), Value::String(value.to_string()));
    }

    if current.contains_key("name") {
        records.push(Value::Object(current));
    }

    records
}

/// Strips list bullets and numbering ("1. ", "- ", "* ") off a line.
fn strip_list_marker(line: &str) -> &str {
    line.trim_start_matches(|c: char| {
        c.is_ascii_digit() || matches!(c, '-' | '*' | '.' | ')' | ' ')
    })
}

/// Maps a free-text label onto the canonical record key, or `None` for
/// lines that are not fields at all.
fn canonical_key(label: &str) -> Option<&'static str> {
    match label {
        "name" | "product" | "item" | "product name" => Some("name"),
        "confidence" | "confidence score" | "score" => Some("confidence"),
        "category" => Some("category"),
        "url" | "link" | "product url" => Some("url"),
        "image" | "image url" => Some("image"),
        "platform" | "ad platform" => Some("adPlatform"),
        "angle" | "ad angle" => Some("adAngle"),
        "audience" | "target audience" => Some("targetAudience"),
        "script" | "ad script" => Some("adScript"),
        "summary" => Some("summary"),
        "verdict" => Some("verdict"),
        "advice" => Some("advice"),
        _ => None,
    }
}
