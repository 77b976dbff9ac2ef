//! Per-product preference profiles.
//!
//! After each pipeline run the selected candidates' features are folded
//! into the product's profile with an exponential moving average; the
//! similarity reranker then nudges future rankings toward that profile.
//! Storage is the in-memory variant; durable persistence is an external
//! concern and profiles serialize cleanly for it.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::{CandidateFeatures, UserProfile, FEATURE_KEYS};

/// Default EMA learning rate for preference updates.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// In-memory store of `UserProfile` records keyed by product id.
#[derive(Default)]
pub struct UserProfileManager {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl UserProfileManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a copy of the profile for a product, if one exists.
    pub fn load(&self, product_id: &str) -> Option<UserProfile> {
        let profiles = match self.profiles.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("profile store read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        profiles.get(product_id).cloned()
    }

    /// Store (upsert) a profile under its product id.
    pub fn save(&self, profile: UserProfile) {
        match self.profiles.write() {
            Ok(mut profiles) => {
                profiles.insert(profile.product_id.clone(), profile);
            }
            Err(poisoned) => {
                log::warn!("profile store write lock was poisoned, recovering");
                poisoned
                    .into_inner()
                    .insert(profile.product_id.clone(), profile);
            }
        }
    }

    /// Fold a run's selected features into the product's profile with the
    /// default learning rate, creating the profile on first use.
    pub fn learn_from_selections(&self, product_id: &str, selected: &[CandidateFeatures]) {
        self.learn_with_rate(product_id, selected, DEFAULT_LEARNING_RATE);
    }

    pub fn learn_with_rate(
        &self,
        product_id: &str,
        selected: &[CandidateFeatures],
        learning_rate: f64,
    ) {
        if selected.is_empty() {
            return;
        }
        let mut profile = self.load(product_id).unwrap_or_else(|| UserProfile {
            product_id: product_id.to_string(),
            ..UserProfile::default()
        });
        for features in selected {
            fold_features(&mut profile, features, learning_rate);
        }
        profile.interaction_count += 1;
        self.save(profile);
    }
}

/// Exponential moving average over the scalar feature fields.
/// `keywords`/`topics` are metadata, not preferences, and are skipped.
fn fold_features(profile: &mut UserProfile, features: &CandidateFeatures, learning_rate: f64) {
    for key in FEATURE_KEYS {
        let observed = features.scalar(key);
        let current = profile
            .preferred_features
            .get(key)
            .copied()
            .unwrap_or(0.0);
        profile.preferred_features.insert(
            key.to_string(),
            current * (1.0 - learning_rate) + observed * learning_rate,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features_with_intent(value: f64) -> CandidateFeatures {
        CandidateFeatures {
            purchase_intent: value,
            ..CandidateFeatures::default()
        }
    }

    #[test]
    fn learning_creates_profile_on_first_run() {
        let manager = UserProfileManager::new();
        assert!(manager.load("prod-1").is_none());
        manager.learn_from_selections("prod-1", &[features_with_intent(1.0)]);
        let profile = manager.load("prod-1").unwrap();
        assert_eq!(profile.interaction_count, 1);
        // 0.0 * 0.9 + 1.0 * 0.1
        let learned = profile.preferred_features["purchase_intent"];
        assert!((learned - 0.1).abs() < 1e-9);
    }

    #[test]
    fn ema_converges_toward_observed_value() {
        let manager = UserProfileManager::new();
        for _ in 0..50 {
            manager.learn_from_selections("prod-2", &[features_with_intent(1.0)]);
        }
        let profile = manager.load("prod-2").unwrap();
        let learned = profile.preferred_features["purchase_intent"];
        assert!(learned > 0.9, "EMA should approach 1.0, got {}", learned);
        assert_eq!(profile.interaction_count, 50);
    }

    #[test]
    fn empty_selection_learns_nothing() {
        let manager = UserProfileManager::new();
        manager.learn_from_selections("prod-3", &[]);
        assert!(manager.load("prod-3").is_none());
    }

    #[test]
    fn save_overwrites_existing_profile() {
        let manager = UserProfileManager::new();
        manager.save(UserProfile {
            product_id: "prod-4".into(),
            interaction_count: 7,
            ..UserProfile::default()
        });
        manager.save(UserProfile {
            product_id: "prod-4".into(),
            interaction_count: 8,
            ..UserProfile::default()
        });
        assert_eq!(manager.load("prod-4").unwrap().interaction_count, 8);
    }
}
