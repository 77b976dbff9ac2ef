use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration};

use crate::cache::FeatureCache;
use crate::extractor::TextFeatureExtractor;
use crate::hydrator::Hydrator;
use crate::types::{Candidate, InsightQuery};

/// Upper bound on in-flight extractor calls.
const MAX_CONCURRENT_REQUESTS: usize = 5;

/// Pacing delay applied before each extractor call so a large batch does
/// not burst the provider's rate limit the moment permits free up.
const PACING_DELAY: Duration = Duration::from_millis(200);

/// Enriches candidates with engagement-probability features via the
/// external text-understanding extractor.
///
/// Identical content is served from the TTL cache by content hash. Cache
/// misses fan out as one extractor call per candidate, bounded by a
/// semaphore; results are gathered back into original index order by task
/// index. One candidate's failure never cancels its siblings; the failed
/// candidate simply continues with default features.
pub struct FeatureHydrator {
    extractor: Arc<dyn TextFeatureExtractor>,
    cache: Arc<FeatureCache>,
    semaphore: Arc<Semaphore>,
}

impl FeatureHydrator {
    pub fn new(extractor: Arc<dyn TextFeatureExtractor>, cache: Arc<FeatureCache>) -> Self {
        Self {
            extractor,
            cache,
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS)),
        }
    }

    /// Cache key for a piece of comment text.
    pub fn content_key(content: &str) -> String {
        let digest = Sha256::digest(content.as_bytes());
        digest.iter().map(|byte| format!("{:02x}", byte)).collect()
    }
}

#[async_trait]
impl Hydrator<InsightQuery, Candidate> for FeatureHydrator {
    async fn hydrate(
        &self,
        _query: &InsightQuery,
        candidates: &[Candidate],
    ) -> Result<Vec<Candidate>, String> {
        let mut hydrated: Vec<Candidate> = candidates.to_vec();
        if hydrated.is_empty() {
            return Ok(hydrated);
        }

        // Serve repeats from the cache; collect the indexes still needing
        // an extractor call.
        let mut misses: Vec<usize> = Vec::new();
        for (idx, candidate) in hydrated.iter_mut().enumerate() {
            let key = Self::content_key(&candidate.content);
            match self.cache.get(&key) {
                Some(features) => candidate.features = features,
                None => misses.push(idx),
            }
        }
        let cache_hits = hydrated.len() - misses.len();
        if misses.is_empty() {
            log::info!("hydration complete: all {} candidates cached", cache_hits);
            return Ok(hydrated);
        }

        let mut tasks = Vec::with_capacity(misses.len());
        for &idx in &misses {
            let content = hydrated[idx].content.clone();
            let extractor = Arc::clone(&self.extractor);
            let cache = Arc::clone(&self.cache);
            let semaphore = Arc::clone(&self.semaphore);

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return None,
                };
                sleep(PACING_DELAY).await;
                match extractor.extract(&content).await {
                    Ok(features) => {
                        cache.insert(FeatureHydrator::content_key(&content), features.clone());
                        Some(features)
                    }
                    Err(err) => {
                        log::warn!("feature extraction failed, keeping defaults: {}", err);
                        None
                    }
                }
            });
            tasks.push((idx, handle));
        }

        // Gather by task index so results land in original candidate order
        // regardless of completion order.
        let mut extracted = 0usize;
        for (idx, handle) in tasks {
            match handle.await {
                Ok(Some(features)) => {
                    hydrated[idx].features = features;
                    extracted += 1;
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("hydration task for candidate index {} died: {}", idx, err);
                }
            }
        }

        log::info!(
            "hydration complete: extracted={}/{} cached={}",
            extracted,
            misses.len(),
            cache_hits
        );
        Ok(hydrated)
    }

    fn update(&self, candidate: &mut Candidate, hydrated: Candidate) {
        candidate.features = hydrated.features;
    }
}
