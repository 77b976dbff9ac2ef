use async_trait::async_trait;

use crate::filter::{Filter, FilterResult};
use crate::types::{Candidate, InsightQuery};

use super::age_filter::AgeFilter;
use super::author_block_filter::AuthorBlockFilter;
use super::duplicate_filter::DuplicateFilter;
use super::muted_keyword_filter::MutedKeywordFilter;
use super::previously_seen_filter::PreviouslySeenFilter;
use super::quality_filter::QualityFilter;

/// Per-user/brand context for the contextual filters.
#[derive(Clone, Debug, Default)]
pub struct FilterContext {
    pub muted_keywords: Vec<String>,
    pub blocked_authors: Vec<String>,
    pub seen_ids: Vec<String>,
}

/// Sequential composition of the structural filter set, cheapest first:
/// duplicate -> age -> quality, then the context-driven filters
/// (muted keywords, blocked authors, previously seen) when context is
/// supplied.
pub struct CompositeFilter {
    duplicate: DuplicateFilter,
    age: AgeFilter,
    quality: QualityFilter,
    contextual: Vec<Box<dyn Filter<InsightQuery, Candidate>>>,
}

impl Default for CompositeFilter {
    fn default() -> Self {
        Self {
            duplicate: DuplicateFilter,
            age: AgeFilter::default(),
            quality: QualityFilter::default(),
            contextual: Vec::new(),
        }
    }
}

impl CompositeFilter {
    pub fn with_context(context: FilterContext) -> Result<Self, String> {
        let mut contextual: Vec<Box<dyn Filter<InsightQuery, Candidate>>> = Vec::new();
        if !context.muted_keywords.is_empty() {
            contextual.push(Box::new(MutedKeywordFilter::new(&context.muted_keywords)?));
        }
        if !context.blocked_authors.is_empty() {
            contextual.push(Box::new(AuthorBlockFilter::new(context.blocked_authors)));
        }
        if !context.seen_ids.is_empty() {
            contextual.push(Box::new(PreviouslySeenFilter::exact(context.seen_ids)));
        }

        Ok(Self {
            contextual,
            ..Self::default()
        })
    }
}

#[async_trait]
impl Filter<InsightQuery, Candidate> for CompositeFilter {
    async fn filter(
        &self,
        query: &InsightQuery,
        candidates: Vec<Candidate>,
    ) -> Result<FilterResult<Candidate>, String> {
        let mut removed = Vec::new();

        let mut result = self.duplicate.filter(query, candidates).await?;
        removed.append(&mut result.removed);

        let mut result = self.age.filter(query, result.kept).await?;
        removed.append(&mut result.removed);

        let mut result = self.quality.filter(query, result.kept).await?;
        removed.append(&mut result.removed);

        let mut kept = result.kept;
        for filter in &self.contextual {
            if !filter.enable(query) {
                continue;
            }
            let mut result = filter.filter(query, kept).await?;
            removed.append(&mut result.removed);
            kept = result.kept;
        }

        Ok(FilterResult { kept, removed })
    }
}
