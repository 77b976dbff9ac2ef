use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;

use crate::scorer::Scorer;
use crate::types::{Candidate, InsightQuery, UserProfile, FEATURE_KEYS};
use crate::user_profile::UserProfileManager;
use crate::util;

/// Weight kept on the engagement score when blending; the remainder goes
/// to profile similarity. Personalization nudges the ranking, it does not
/// take it over.
pub const DEFAULT_ALPHA: f64 = 0.7;

/// Blends each candidate's score with its cosine similarity to the
/// product's learned preference vector.
///
/// A missing profile, an empty `preferred_features` map, or a
/// zero-magnitude profile vector all mean "no personalization signal":
/// the batch passes through unchanged.
pub struct SimilarityReranker {
    profiles: Arc<UserProfileManager>,
    alpha: f64,
}

impl SimilarityReranker {
    pub fn new(profiles: Arc<UserProfileManager>) -> Self {
        Self {
            profiles,
            alpha: DEFAULT_ALPHA,
        }
    }

    pub fn with_alpha(profiles: Arc<UserProfileManager>, alpha: f64) -> Self {
        Self { profiles, alpha }
    }

    fn profile_vector(profile: &UserProfile) -> Vec<f64> {
        FEATURE_KEYS
            .iter()
            .map(|key| profile.preferred_features.get(*key).copied().unwrap_or(0.0))
            .collect()
    }

    fn magnitude(vector: &[f64]) -> f64 {
        vector.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
        let mag_a = Self::magnitude(a);
        let mag_b = Self::magnitude(b);
        if mag_a == 0.0 || mag_b == 0.0 {
            return 0.0;
        }
        let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        dot / (mag_a * mag_b)
    }

    /// Blend scores in place against an already-resolved profile.
    /// Returns false when there is no usable personalization signal.
    fn apply(&self, candidates: &mut [Candidate], profile: &UserProfile) -> bool {
        if candidates.is_empty() || profile.preferred_features.is_empty() {
            return false;
        }
        let profile_vec = Self::profile_vector(profile);
        if Self::magnitude(&profile_vec) == 0.0 {
            return false;
        }

        let scores: Vec<f64> = candidates.iter().map(|c| c.score.final_score).collect();
        let max_score = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min_score = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let range = if max_score == min_score {
            1.0
        } else {
            max_score - min_score
        };

        for candidate in candidates.iter_mut() {
            let similarity =
                Self::cosine_similarity(&candidate.features.vector(), &profile_vec);
            let normalized = (candidate.score.final_score - min_score) / range;
            let blended = self.alpha * normalized + (1.0 - self.alpha) * similarity;

            candidate.score.final_score = util::round2(blended * range + min_score);
            candidate
                .score
                .weighted_components
                .insert("similarity", util::round3(similarity));
        }
        true
    }

    /// Rerank a batch against an optional profile, returning the
    /// candidates sorted by the blended score.
    pub fn rerank(
        &self,
        mut candidates: Vec<Candidate>,
        profile: Option<&UserProfile>,
    ) -> Vec<Candidate> {
        let applied = match profile {
            Some(profile) => self.apply(&mut candidates, profile),
            None => false,
        };
        if applied {
            candidates.sort_by(|a, b| {
                b.score
                    .final_score
                    .partial_cmp(&a.score.final_score)
                    .unwrap_or(Ordering::Equal)
            });
        }
        candidates
    }
}

#[async_trait]
impl Scorer<InsightQuery, Candidate> for SimilarityReranker {
    async fn score(
        &self,
        query: &InsightQuery,
        candidates: &[Candidate],
    ) -> Result<Vec<Candidate>, String> {
        let mut scored: Vec<Candidate> = candidates.to_vec();
        if let Some(profile) = self.profiles.load(&query.product_id) {
            self.apply(&mut scored, &profile);
        }
        // carry only the score field back, index-aligned
        Ok(scored
            .into_iter()
            .map(|candidate| Candidate {
                score: candidate.score,
                ..Candidate::default()
            })
            .collect())
    }

    fn update(&self, candidate: &mut Candidate, scored: Candidate) {
        candidate.score = scored.score;
    }
}
