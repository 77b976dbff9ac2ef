//! The text-understanding collaborator boundary.
//!
//! The pipeline treats feature extraction as a black box: given one piece
//! of comment text, the extractor returns the feature schema or a typed
//! failure. The hydrator treats any `ExtractionError` as a per-item soft
//! failure and the candidate continues with default features.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::CandidateFeatures;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("empty response from feature extractor")]
    EmptyResponse,

    #[error("malformed feature payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("feature extraction failed: {0}")]
    Upstream(String),
}

/// Extracts engagement-probability features from a single piece of text.
#[async_trait]
pub trait TextFeatureExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<CandidateFeatures, ExtractionError>;
}

/// Parse a raw extractor response into the feature schema.
///
/// Missing fields default to 0.0/empty and unknown fields are ignored, so
/// partial responses still hydrate. An empty body or non-JSON payload is an
/// error for that one item only.
pub fn parse_feature_response(raw: &str) -> Result<CandidateFeatures, ExtractionError> {
    if raw.trim().is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_response_fills_defaults() {
        let features =
            parse_feature_response(r#"{"purchase_intent": 0.8, "keywords": ["가격"]}"#).unwrap();
        assert!((features.purchase_intent - 0.8).abs() < 1e-9);
        assert_eq!(features.toxicity, 0.0);
        assert_eq!(features.keywords, vec!["가격".to_string()]);
        assert!(features.topics.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let features =
            parse_feature_response(r#"{"viral_potential": 0.5, "model_version": "v3"}"#).unwrap();
        assert!((features.viral_potential - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_response_is_an_error() {
        assert!(matches!(
            parse_feature_response("   "),
            Err(ExtractionError::EmptyResponse)
        ));
    }

    #[test]
    fn malformed_response_is_an_error() {
        assert!(matches!(
            parse_feature_response("not json at all"),
            Err(ExtractionError::Malformed(_))
        ));
    }
}
