use async_trait::async_trait;

use crate::util;

/// Hydrators enrich candidates with derived data from external systems.
///
/// A hydrator never removes candidates: the returned vector has the same
/// length and index order as the input, and a candidate whose enrichment
/// failed comes back with its fields untouched.
#[async_trait]
pub trait Hydrator<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this hydrator should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Hydrate the candidates, returning an index-aligned vector with this
    /// hydrator's fields populated.
    async fn hydrate(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, String>;

    /// Apply the hydrated fields back onto the pipeline's candidate.
    /// Only the fields this hydrator is responsible for should be copied.
    fn update(&self, candidate: &mut C, hydrated: C);

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
