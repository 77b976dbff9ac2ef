use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::filter::{Filter, FilterResult};
use crate::types::{Candidate, InsightQuery};

/// Removes comments older than the staleness window.
pub struct AgeFilter {
    max_age: Duration,
}

impl AgeFilter {
    pub fn new(max_age_days: i64) -> Self {
        Self {
            max_age: Duration::days(max_age_days),
        }
    }
}

impl Default for AgeFilter {
    fn default() -> Self {
        Self::new(30)
    }
}

#[async_trait]
impl Filter<InsightQuery, Candidate> for AgeFilter {
    async fn filter(
        &self,
        _query: &InsightQuery,
        candidates: Vec<Candidate>,
    ) -> Result<FilterResult<Candidate>, String> {
        let now = Utc::now();
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| now - candidate.created_at < self.max_age);

        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stale_comments_are_removed() {
        let filter = AgeFilter::new(7);
        let query = InsightQuery::new("req", "prod");
        let fresh = Candidate::default();
        let stale = Candidate {
            created_at: Utc::now() - Duration::days(30),
            ..Candidate::default()
        };
        let result = filter.filter(&query, vec![fresh, stale]).await.unwrap();
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.removed.len(), 1);
    }
}
