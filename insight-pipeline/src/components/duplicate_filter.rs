use async_trait::async_trait;
use std::collections::HashSet;

use crate::filter::{Filter, FilterResult};
use crate::types::{Candidate, InsightQuery};

/// Removes exact duplicates by trimmed content, keeping the first
/// occurrence. Candidates whose content trims to empty are removed too.
#[derive(Default)]
pub struct DuplicateFilter;

#[async_trait]
impl Filter<InsightQuery, Candidate> for DuplicateFilter {
    async fn filter(
        &self,
        _query: &InsightQuery,
        candidates: Vec<Candidate>,
    ) -> Result<FilterResult<Candidate>, String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut kept = Vec::new();
        let mut removed = Vec::new();

        for candidate in candidates {
            let text = candidate.content.trim().to_string();
            if text.is_empty() || !seen.insert(text) {
                removed.push(candidate);
            } else {
                kept.push(candidate);
            }
        }

        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, content: &str) -> Candidate {
        Candidate {
            id: id.into(),
            content: content.into(),
            ..Candidate::default()
        }
    }

    #[tokio::test]
    async fn keeps_first_occurrence_only() {
        let filter = DuplicateFilter;
        let query = InsightQuery::new("req", "prod");
        let result = filter
            .filter(
                &query,
                vec![
                    candidate("a", "배송 빨라요"),
                    candidate("b", "  배송 빨라요  "),
                    candidate("c", "품질 좋아요"),
                    candidate("d", "   "),
                ],
            )
            .await
            .unwrap();
        let kept_ids: Vec<&str> = result.kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(kept_ids, vec!["a", "c"]);
        assert_eq!(result.removed.len(), 2);
    }
}
