use async_trait::async_trait;
use std::collections::HashMap;

use crate::filter::{Filter, FilterResult};
use crate::types::{Candidate, InsightQuery};

/// Keeps only the highest-scored reply per conversation thread.
///
/// Selects by `final_score`, so this filter must run after the scoring
/// stage: it is a post-scoring filter, never a pre-filter. Candidates
/// without a conversation id pass through untouched, and survivors keep
/// their relative input order.
#[derive(Default)]
pub struct ConversationDedupFilter;

#[async_trait]
impl Filter<InsightQuery, Candidate> for ConversationDedupFilter {
    async fn filter(
        &self,
        _query: &InsightQuery,
        candidates: Vec<Candidate>,
    ) -> Result<FilterResult<Candidate>, String> {
        // index of the best-scored candidate per conversation
        let mut best_per_thread: HashMap<String, usize> = HashMap::new();
        for (idx, candidate) in candidates.iter().enumerate() {
            if let Some(conversation_id) = &candidate.conversation_id {
                best_per_thread
                    .entry(conversation_id.clone())
                    .and_modify(|best| {
                        if candidate.score.final_score > candidates[*best].score.final_score {
                            *best = idx;
                        }
                    })
                    .or_insert(idx);
            }
        }

        let mut kept = Vec::new();
        let mut removed = Vec::new();
        for (idx, candidate) in candidates.into_iter().enumerate() {
            let keep = match &candidate.conversation_id {
                None => true,
                Some(conversation_id) => best_per_thread[conversation_id] == idx,
            };
            if keep {
                kept.push(candidate);
            } else {
                removed.push(candidate);
            }
        }

        Ok(FilterResult { kept, removed })
    }
}
