use async_trait::async_trait;
use std::sync::Arc;

use crate::side_effect::{SideEffect, SideEffectInput};
use crate::types::{Candidate, CandidateFeatures, InsightQuery};
use crate::user_profile::UserProfileManager;

/// Folds each run's selected candidates into the product's preference
/// profile, so the similarity reranker personalizes future rankings.
pub struct ProfileLearningSideEffect {
    profiles: Arc<UserProfileManager>,
}

impl ProfileLearningSideEffect {
    pub fn new(profiles: Arc<UserProfileManager>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl SideEffect<InsightQuery, Candidate> for ProfileLearningSideEffect {
    async fn run(
        &self,
        input: Arc<SideEffectInput<InsightQuery, Candidate>>,
    ) -> Result<(), String> {
        let selected: Vec<CandidateFeatures> = input
            .selected_candidates
            .iter()
            .map(|candidate| candidate.features.clone())
            .collect();
        if selected.is_empty() {
            return Ok(());
        }

        self.profiles
            .learn_from_selections(&input.query.product_id, &selected);
        log::info!(
            "request_id={} learned preferences from {} selections for product {}",
            input.query.request_id,
            selected.len(),
            input.query.product_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn selections_update_the_product_profile() {
        let profiles = Arc::new(UserProfileManager::new());
        let effect = ProfileLearningSideEffect::new(Arc::clone(&profiles));

        let candidate = Candidate {
            features: CandidateFeatures {
                purchase_intent: 1.0,
                ..CandidateFeatures::default()
            },
            ..Candidate::default()
        };
        let input = Arc::new(SideEffectInput {
            query: Arc::new(InsightQuery::new("req", "prod-9")),
            selected_candidates: vec![candidate],
        });

        effect.run(input).await.unwrap();
        let profile = profiles.load("prod-9").unwrap();
        assert!(profile.preferred_features["purchase_intent"] > 0.0);
        assert_eq!(profile.interaction_count, 1);
    }
}
