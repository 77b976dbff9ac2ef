use async_trait::async_trait;
use std::collections::HashSet;

use crate::filter::{Filter, FilterResult};
use crate::types::{Candidate, InsightQuery};

/// Removes comments from blocked authors. An empty blocklist disables the
/// filter entirely.
pub struct AuthorBlockFilter {
    blocked_authors: HashSet<String>,
}

impl AuthorBlockFilter {
    pub fn new<I, S>(blocked_authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked_authors: blocked_authors
                .into_iter()
                .map(Into::into)
                .filter(|author| !author.is_empty())
                .collect(),
        }
    }
}

#[async_trait]
impl Filter<InsightQuery, Candidate> for AuthorBlockFilter {
    fn enable(&self, _query: &InsightQuery) -> bool {
        !self.blocked_authors.is_empty()
    }

    async fn filter(
        &self,
        _query: &InsightQuery,
        candidates: Vec<Candidate>,
    ) -> Result<FilterResult<Candidate>, String> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| !self.blocked_authors.contains(&candidate.author.username));

        Ok(FilterResult { kept, removed })
    }
}
