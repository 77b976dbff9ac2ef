//! TTL-bound feature cache.
//!
//! Identical comment text appears constantly across batches (copy-paste
//! reviews, platform reposts), so extracted features are cached by content
//! hash for 24 hours. The cache is an explicitly constructed, injected
//! instance rather than a process global, and expiry is checked on read.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::types::CandidateFeatures;

/// Default entry lifetime, matching the hydrator's reuse window.
pub const DEFAULT_FEATURE_TTL: Duration = Duration::from_secs(86_400);

struct CacheEntry {
    features: CandidateFeatures,
    expires_at: Instant,
}

/// Cache occupancy counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
}

/// Time-to-live store of extracted features keyed by content hash.
///
/// Concurrent hydration tasks read and write disjoint keys, so the interior
/// `RwLock` only guards map structure; there are no compound
/// read-modify-write operations across keys.
pub struct FeatureCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl Default for FeatureCache {
    fn default() -> Self {
        Self::new(DEFAULT_FEATURE_TTL)
    }
}

impl FeatureCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Fetch a live entry. Expired entries read as absent and are dropped.
    pub fn get(&self, key: &str) -> Option<CandidateFeatures> {
        let expired = {
            let entries = match self.entries.read() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    log::warn!("feature cache read lock was poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            match entries.get(key) {
                None => return None,
                Some(entry) if Instant::now() <= entry.expires_at => {
                    log::debug!("feature cache hit: key={}...", key.get(..8).unwrap_or(key));
                    return Some(entry.features.clone());
                }
                Some(_) => true,
            }
        };
        if expired {
            self.remove(key);
        }
        None
    }

    /// Store features under the default TTL.
    pub fn insert(&self, key: impl Into<String>, features: CandidateFeatures) {
        self.insert_with_ttl(key, features, self.default_ttl);
    }

    pub fn insert_with_ttl(
        &self,
        key: impl Into<String>,
        features: CandidateFeatures,
        ttl: Duration,
    ) {
        let entry = CacheEntry {
            features,
            expires_at: Instant::now() + ttl,
        };
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(key.into(), entry);
            }
            Err(poisoned) => {
                log::warn!("feature cache write lock was poisoned, recovering");
                poisoned.into_inner().insert(key.into(), entry);
            }
        }
    }

    fn remove(&self, key: &str) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.remove(key);
            }
            Err(poisoned) => {
                log::warn!("feature cache write lock was poisoned, recovering");
                poisoned.into_inner().remove(key);
            }
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        match self.entries.write() {
            Ok(mut entries) => {
                let before = entries.len();
                entries.retain(|_, entry| now <= entry.expires_at);
                before - entries.len()
            }
            Err(poisoned) => {
                log::warn!("feature cache write lock was poisoned, recovering");
                let mut entries = poisoned.into_inner();
                let before = entries.len();
                entries.retain(|_, entry| now <= entry.expires_at);
                before - entries.len()
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("feature cache read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        let active = entries
            .values()
            .filter(|entry| now <= entry.expires_at)
            .count();
        CacheStats {
            total_entries: entries.len(),
            active_entries: active,
            expired_entries: entries.len() - active,
        }
    }
}
