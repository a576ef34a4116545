//! Error types for the analysis pipeline.

use thiserror::Error;

/// Failure modes of one analysis call, from input validation through
/// extraction. Parse failures carry the raw model text so callers can
/// diagnose prompt or model drift.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("content too short for analysis: {actual} chars (minimum {minimum})")]
    InputTooShort { actual: usize, minimum: usize },

    #[error("model returned empty output")]
    EmptyOutput,

    #[error("no JSON array found in model output")]
    NoArrayFound { raw: String },

    #[error("model returned invalid JSON: {message}")]
    MalformedJson { message: String, raw: String },

    #[error("model output is valid JSON but not an array")]
    SchemaViolation { raw: String },

    #[error("model request failed: {0}")]
    UpstreamModel(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AnalyzeError {
    /// Raw model text attached to parse failures, if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            AnalyzeError::NoArrayFound { raw }
            | AnalyzeError::MalformedJson { raw, .. }
            | AnalyzeError::SchemaViolation { raw } => Some(raw),
            _ => None,
        }
    }
}

/// Leaderboard store failure. Non-fatal to the analysis response: the
/// orchestrator logs it and still returns the extracted items.
#[derive(Debug, Error)]
#[error("leaderboard store failure: {0}")]
pub struct StoreError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_output_attached_to_parse_failures() {
        let err = AnalyzeError::MalformedJson {
            message: "expected value".to_string(),
            raw: "[{broken".to_string(),
        };
        assert_eq!(err.raw_output(), Some("[{broken"));

        let err = AnalyzeError::EmptyOutput;
        assert_eq!(err.raw_output(), None);
    }
}
