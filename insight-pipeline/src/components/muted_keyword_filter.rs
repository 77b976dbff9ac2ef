use async_trait::async_trait;
use regex::Regex;

use crate::filter::{Filter, FilterResult};
use crate::types::{Candidate, InsightQuery};

/// Keywords muted by default across all products.
pub const DEFAULT_MUTED: [&str; 6] = ["광고", "홍보", "스팸", "카톡", "텔레그램", "링크"];

/// Removes comments containing muted keywords, matched on word boundaries
/// and case-insensitively (unlike the quality filter's raw substring
/// check, "promotion" does not match inside "compromise").
pub struct MutedKeywordFilter {
    pattern: Option<Regex>,
}

impl MutedKeywordFilter {
    pub fn new<I, S>(keywords: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternation = keywords
            .into_iter()
            .map(|keyword| regex::escape(keyword.as_ref().trim()))
            .filter(|keyword| !keyword.is_empty())
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
            .map_err(|e| format!("invalid muted keyword pattern: {}", e))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }
}

impl Default for MutedKeywordFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MUTED).unwrap_or_else(|err| {
            log::warn!("default muted keyword pattern failed to build: {}", err);
            Self { pattern: None }
        })
    }
}

#[async_trait]
impl Filter<InsightQuery, Candidate> for MutedKeywordFilter {
    fn enable(&self, _query: &InsightQuery) -> bool {
        self.pattern.is_some()
    }

    async fn filter(
        &self,
        _query: &InsightQuery,
        candidates: Vec<Candidate>,
    ) -> Result<FilterResult<Candidate>, String> {
        let Some(pattern) = &self.pattern else {
            return Ok(FilterResult {
                kept: candidates,
                removed: Vec::new(),
            });
        };

        let (removed, kept): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| pattern.is_match(&candidate.content));

        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(content: &str) -> Candidate {
        Candidate {
            content: content.into(),
            ..Candidate::default()
        }
    }

    #[tokio::test]
    async fn muted_keywords_match_whole_words() {
        let filter = MutedKeywordFilter::new(["spam"]).unwrap();
        let query = InsightQuery::new("req", "prod");
        let result = filter
            .filter(
                &query,
                vec![
                    candidate("this is spam for sure"),
                    candidate("I love spamusement parks"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(result.kept.len(), 1);
        assert!(result.kept[0].content.contains("spamusement"));
    }

    #[tokio::test]
    async fn matching_is_case_insensitive() {
        let filter = MutedKeywordFilter::new(["giveaway"]).unwrap();
        let query = InsightQuery::new("req", "prod");
        let result = filter
            .filter(&query, vec![candidate("Huge GIVEAWAY this weekend")])
            .await
            .unwrap();
        assert!(result.kept.is_empty());
    }

    #[test]
    fn empty_keyword_list_disables_filter() {
        let filter = MutedKeywordFilter::new(Vec::<String>::new()).unwrap();
        assert!(!filter.enable(&InsightQuery::new("req", "prod")));
    }
}
