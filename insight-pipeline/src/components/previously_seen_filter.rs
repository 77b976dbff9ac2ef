use async_trait::async_trait;
use std::collections::HashSet;

use crate::bloom::BloomFilter;
use crate::filter::{Filter, FilterResult};
use crate::types::{Candidate, InsightQuery};

/// Backing store for seen-id membership: exact for small histories, Bloom
/// for large ones where a small false-positive rate is acceptable.
pub enum SeenStore {
    Exact(HashSet<String>),
    Bloom(BloomFilter),
}

/// Removes candidates whose ids surfaced in a previous run.
pub struct PreviouslySeenFilter {
    seen: SeenStore,
}

impl PreviouslySeenFilter {
    pub fn exact<I, S>(seen_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seen: SeenStore::Exact(
                seen_ids
                    .into_iter()
                    .map(Into::into)
                    .filter(|id| !id.is_empty())
                    .collect(),
            ),
        }
    }

    pub fn bloom(filter: BloomFilter) -> Self {
        Self {
            seen: SeenStore::Bloom(filter),
        }
    }

    fn is_seen(&self, id: &str) -> bool {
        match &self.seen {
            SeenStore::Exact(ids) => ids.contains(id),
            SeenStore::Bloom(filter) => filter.contains(id),
        }
    }

    fn is_empty(&self) -> bool {
        match &self.seen {
            SeenStore::Exact(ids) => ids.is_empty(),
            SeenStore::Bloom(filter) => filter.is_empty(),
        }
    }
}

#[async_trait]
impl Filter<InsightQuery, Candidate> for PreviouslySeenFilter {
    fn enable(&self, _query: &InsightQuery) -> bool {
        !self.is_empty()
    }

    async fn filter(
        &self,
        _query: &InsightQuery,
        candidates: Vec<Candidate>,
    ) -> Result<FilterResult<Candidate>, String> {
        let (removed, kept): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| self.is_seen(&candidate.id));

        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str) -> Candidate {
        Candidate {
            id: id.into(),
            ..Candidate::default()
        }
    }

    #[tokio::test]
    async fn exact_store_removes_seen_ids() {
        let filter = PreviouslySeenFilter::exact(["c-1", "c-3"]);
        let query = InsightQuery::new("req", "prod");
        let result = filter
            .filter(&query, vec![candidate("c-1"), candidate("c-2"), candidate("c-3")])
            .await
            .unwrap();
        let kept: Vec<&str> = result.kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(kept, vec!["c-2"]);
    }

    #[tokio::test]
    async fn bloom_store_never_resurfaces_seen_ids() {
        let mut bloom = BloomFilter::new(100, 0.01);
        bloom.add("c-1");
        bloom.add("c-2");
        let filter = PreviouslySeenFilter::bloom(bloom);
        let query = InsightQuery::new("req", "prod");
        let result = filter
            .filter(&query, vec![candidate("c-1"), candidate("c-2")])
            .await
            .unwrap();
        assert!(result.kept.is_empty());
        assert_eq!(result.removed.len(), 2);
    }

    #[test]
    fn empty_history_disables_filter() {
        let filter = PreviouslySeenFilter::exact(Vec::<String>::new());
        assert!(!filter.enable(&InsightQuery::new("req", "prod")));
    }
}
