use async_trait::async_trait;

use crate::filter::{Filter, FilterResult};
use crate::types::{Candidate, InsightQuery};

/// Spam markers matched as raw substrings, no word-boundary check.
/// Covers the ad/gambling/open-chat spam endemic to Korean comment sections.
pub const SPAM_KEYWORDS: [&str; 6] = ["광고", "홍보", "http", "카톡", "사다리", "토토"];

/// Minimum trimmed content length, in characters.
const MIN_CONTENT_LENGTH: usize = 5;

/// Hard toxicity ceiling. Before hydration every candidate reads 0.0 here,
/// so the pre-hydration pass only applies the structural checks; the same
/// filter instance becomes a toxicity gate once features are populated.
const MAX_TOXICITY: f64 = 0.8;

/// Rule-based elimination of spam, too-short, and toxic comments.
///
/// Deliberately runs twice per pipeline: once before hydration to avoid
/// paying extraction cost for obvious garbage, and once after, when the
/// toxicity check has data to act on.
pub struct QualityFilter {
    custom_banned_keywords: Vec<String>,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl QualityFilter {
    /// Create a filter with an additional brand-specific banned-keyword
    /// list (same substring semantics as the fixed spam list).
    pub fn new(custom_banned_keywords: Vec<String>) -> Self {
        Self {
            custom_banned_keywords: custom_banned_keywords
                .into_iter()
                .map(|keyword| keyword.trim().to_string())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    fn is_eligible(&self, candidate: &Candidate) -> bool {
        if candidate.content.trim().chars().count() < MIN_CONTENT_LENGTH {
            return false;
        }

        for keyword in SPAM_KEYWORDS {
            if candidate.content.contains(keyword) {
                return false;
            }
        }

        for keyword in &self.custom_banned_keywords {
            if candidate.content.contains(keyword.as_str()) {
                return false;
            }
        }

        !(candidate.features.toxicity > MAX_TOXICITY)
    }
}

#[async_trait]
impl Filter<InsightQuery, Candidate> for QualityFilter {
    async fn filter(
        &self,
        _query: &InsightQuery,
        candidates: Vec<Candidate>,
    ) -> Result<FilterResult<Candidate>, String> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| self.is_eligible(candidate));

        Ok(FilterResult { kept, removed })
    }
}
