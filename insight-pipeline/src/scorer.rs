use async_trait::async_trait;

use crate::util;

/// Scorers compute or adjust ranking scores for a batch of candidates.
///
/// The returned vector is index-aligned with the input; the orchestrator
/// applies each scored result back via `update` and re-sorts afterwards,
/// so scorers themselves never reorder the pipeline's candidate list.
#[async_trait]
pub trait Scorer<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this scorer should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Score the candidates, returning an index-aligned vector carrying
    /// this scorer's fields.
    async fn score(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, String>;

    /// Apply the scored fields back onto the pipeline's candidate.
    fn update(&self, candidate: &mut C, scored: C);

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
