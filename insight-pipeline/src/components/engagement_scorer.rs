use async_trait::async_trait;

use crate::scorer::Scorer;
use crate::types::{Candidate, CandidateScore, InsightQuery, ScoreComponents};
use crate::util;

/// Weight applied to each hydrated feature, in computation order.
/// `sentiment_intensity` carries no weight; it only buckets diversity.
const WEIGHTS: [(&str, f64); 18] = [
    ("purchase_intent", 10.0),
    ("share_probability", 8.0),
    ("viral_potential", 7.0),
    ("actionable_insight", 6.0),
    ("constructive_feedback", 5.0),
    ("save_worthy", 5.0),
    ("bookmark_worthy", 5.0),
    ("quote_worthy", 4.0),
    ("follow_author", 4.0),
    ("copy_link_probability", 4.0),
    ("reply_inducing", 3.0),
    ("dm_probability", 3.0),
    ("dwell_time", 2.0),
    ("profile_click", 2.0),
    ("controversy_score", -2.0),
    ("not_interested", -5.0),
    ("report_probability", -50.0),
    ("toxicity", -100.0),
];

/// Fraction of the negative excess (over the positive total) that survives
/// offsetting. Keeps one strongly negative signal from single-handedly
/// burying a comment with real positive merit; the hard toxicity filter
/// handles outright removal separately.
const NEGATIVE_EXCESS_DAMPING: f64 = 0.5;

/// Like-count boost: ln(1 + likes) * scale, capped.
const ENGAGEMENT_BOOST_SCALE: f64 = 1.5;
const MAX_ENGAGEMENT_BOOST: f64 = 5.0;

/// Components whose |contribution| exceeds this make it into the
/// explanation text.
const EXPLANATION_THRESHOLD: f64 = 2.0;

/// Weighted, sign-aware scoring of hydrated candidates.
///
/// final = positive - offset(negative) + log-scaled like boost
pub struct EngagementScorer;

impl EngagementScorer {
    fn score_single(candidate: &Candidate) -> CandidateScore {
        let mut components = ScoreComponents::default();
        let mut positive = 0.0_f64;
        let mut negative = 0.0_f64;
        let mut reasons: Vec<String> = Vec::new();

        for (name, weight) in WEIGHTS {
            let probability = candidate.features.scalar(name);
            // zero weight or zero probability contributes nothing; skipping
            // keeps the component map and explanation sparse
            if weight == 0.0 || probability == 0.0 {
                continue;
            }

            let contribution = weight * probability;
            components.insert(name, contribution);
            if contribution >= 0.0 {
                positive += contribution;
            } else {
                negative += -contribution;
            }

            if contribution.abs() > EXPLANATION_THRESHOLD {
                let effect = if contribution > 0.0 { "raised" } else { "lowered" };
                reasons.push(format!("{}({:.1}) {} the score", name, probability, effect));
            }
        }

        // Score offsetting: only the excess of negative over positive is
        // damped. When positives dominate, negatives apply in full.
        let adjusted_negative = if negative > positive {
            positive + (negative - positive) * NEGATIVE_EXCESS_DAMPING
        } else {
            negative
        };

        let engagement_boost = ((1.0 + candidate.like_count as f64).ln()
            * ENGAGEMENT_BOOST_SCALE)
            .min(MAX_ENGAGEMENT_BOOST);
        if engagement_boost > 0.0 {
            components.insert("engagement_boost", engagement_boost);
        }

        CandidateScore {
            final_score: util::round2(positive - adjusted_negative + engagement_boost),
            raw_score: util::round2(positive - negative),
            positive_score: positive,
            negative_score: negative,
            weighted_components: components,
            explanation: if reasons.is_empty() {
                "ordinary comment".to_string()
            } else {
                reasons.join(", ")
            },
        }
    }
}

#[async_trait]
impl Scorer<InsightQuery, Candidate> for EngagementScorer {
    async fn score(
        &self,
        _query: &InsightQuery,
        candidates: &[Candidate],
    ) -> Result<Vec<Candidate>, String> {
        let scored = candidates
            .iter()
            .map(|candidate| Candidate {
                score: Self::score_single(candidate),
                ..Candidate::default()
            })
            .collect();
        Ok(scored)
    }

    fn update(&self, candidate: &mut Candidate, scored: Candidate) {
        candidate.score = scored.score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateFeatures;

    fn candidate(features: CandidateFeatures, like_count: u64) -> Candidate {
        Candidate {
            features,
            like_count,
            ..Candidate::default()
        }
    }

    #[test]
    fn positive_features_accumulate() {
        let score = EngagementScorer::score_single(&candidate(
            CandidateFeatures {
                purchase_intent: 0.9, // +9.0
                share_probability: 0.5, // +4.0
                ..CandidateFeatures::default()
            },
            0,
        ));
        assert!((score.positive_score - 13.0).abs() < 1e-9);
        assert_eq!(score.negative_score, 0.0);
        assert!((score.final_score - 13.0).abs() < 1e-9);
        assert!((score.raw_score - 13.0).abs() < 1e-9);
    }

    #[test]
    fn offsetting_damps_only_the_negative_excess() {
        // positive = 9.0, negative = 50.0 (toxicity 0.5)
        let score = EngagementScorer::score_single(&candidate(
            CandidateFeatures {
                purchase_intent: 0.9,
                toxicity: 0.5,
                ..CandidateFeatures::default()
            },
            0,
        ));
        // adjusted_negative = 9 + (50 - 9) * 0.5 = 29.5; final = 9 - 29.5
        assert!((score.final_score - (-20.5)).abs() < 1e-9);
        // raw score ignores offsetting
        assert!((score.raw_score - (-41.0)).abs() < 1e-9);
    }

    #[test]
    fn no_damping_when_positive_dominates() {
        // positive = 9.0, negative = 1.0 (controversy 0.5)
        let score = EngagementScorer::score_single(&candidate(
            CandidateFeatures {
                purchase_intent: 0.9,
                controversy_score: 0.5,
                ..CandidateFeatures::default()
            },
            0,
        ));
        assert!((score.final_score - 8.0).abs() < 1e-9);
        assert!((score.final_score - score.raw_score).abs() < 1e-9);
    }

    #[test]
    fn engagement_boost_is_bounded_and_monotone() {
        let boost = |likes: u64| {
            let score = EngagementScorer::score_single(&candidate(
                CandidateFeatures::default(),
                likes,
            ));
            score.final_score
        };
        assert_eq!(boost(0), 0.0);
        let mut previous = -1.0;
        for likes in [0, 1, 2, 5, 10, 100, 1_000, 1_000_000] {
            let value = boost(likes);
            assert!(value >= previous, "boost must be non-decreasing");
            assert!((0.0..=5.0).contains(&value));
            previous = value;
        }
        // ln(1 + 1_000_000) * 1.5 is far above the cap
        assert!((boost(1_000_000) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_probability_components_are_omitted() {
        let score = EngagementScorer::score_single(&candidate(
            CandidateFeatures {
                purchase_intent: 0.9,
                ..CandidateFeatures::default()
            },
            0,
        ));
        assert_eq!(score.weighted_components.len(), 1);
        assert!(score.weighted_components.get("toxicity").is_none());
    }

    #[test]
    fn explanation_names_large_components() {
        let score = EngagementScorer::score_single(&candidate(
            CandidateFeatures {
                purchase_intent: 0.9, // +9.0 -> named
                dwell_time: 0.5,      // +1.0 -> below threshold
                toxicity: 0.1,        // -10.0 -> named
                ..CandidateFeatures::default()
            },
            0,
        ));
        assert!(score.explanation.contains("purchase_intent(0.9) raised the score"));
        assert!(score.explanation.contains("toxicity(0.1) lowered the score"));
        assert!(!score.explanation.contains("dwell_time"));
    }

    #[test]
    fn unremarkable_comment_gets_generic_explanation() {
        let score = EngagementScorer::score_single(&candidate(
            CandidateFeatures {
                dwell_time: 0.3,
                ..CandidateFeatures::default()
            },
            0,
        ));
        assert_eq!(score.explanation, "ordinary comment");
    }

    #[tokio::test]
    async fn scorer_output_is_index_aligned() {
        let scorer = EngagementScorer;
        let query = InsightQuery::new("req", "prod");
        let candidates = vec![
            candidate(
                CandidateFeatures {
                    purchase_intent: 0.2,
                    ..CandidateFeatures::default()
                },
                0,
            ),
            candidate(
                CandidateFeatures {
                    purchase_intent: 0.9,
                    ..CandidateFeatures::default()
                },
                0,
            ),
        ];
        let scored = scorer.score(&query, &candidates).await.unwrap();
        assert_eq!(scored.len(), 2);
        assert!(scored[1].score.final_score > scored[0].score.final_score);
    }
}
