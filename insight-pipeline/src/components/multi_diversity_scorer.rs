use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::scorer::Scorer;
use crate::types::{Candidate, InsightQuery};
use crate::util;

/// One decaying diversity dimension: decay/floor pair plus its own
/// occurrence counters.
#[derive(Clone, Copy, Debug)]
pub struct DimensionConfig {
    pub decay: f64,
    pub floor: f64,
}

impl DimensionConfig {
    fn multiplier(&self, occurrence: usize) -> f64 {
        if occurrence == 0 {
            return 1.0;
        }
        (1.0 - self.floor) * self.decay.powf(occurrence as f64) + self.floor
    }
}

/// Three-dimensional diversity decay: author x topic x sentiment bucket.
///
/// Each dimension tracks its own occurrence counts and the combined
/// multiplier is the product of the three. The topic key is the first
/// extracted topic ("general" when none), and sentiment is discretized
/// into low/mid/high buckets.
pub struct MultiDiversityScorer {
    pub author: DimensionConfig,
    pub topic: DimensionConfig,
    pub sentiment: DimensionConfig,
}

impl Default for MultiDiversityScorer {
    fn default() -> Self {
        Self {
            author: DimensionConfig {
                decay: 0.7,
                floor: 0.3,
            },
            topic: DimensionConfig {
                decay: 0.8,
                floor: 0.5,
            },
            sentiment: DimensionConfig {
                decay: 0.9,
                floor: 0.6,
            },
        }
    }
}

impl MultiDiversityScorer {
    fn sentiment_bucket(candidate: &Candidate) -> &'static str {
        let intensity = candidate.features.sentiment_intensity;
        if intensity < 0.33 {
            "low"
        } else if intensity < 0.66 {
            "mid"
        } else {
            "high"
        }
    }

    fn primary_topic(candidate: &Candidate) -> &str {
        candidate
            .features
            .topics
            .first()
            .map(String::as_str)
            .unwrap_or("general")
    }
}

#[async_trait]
impl Scorer<InsightQuery, Candidate> for MultiDiversityScorer {
    async fn score(
        &self,
        _query: &InsightQuery,
        candidates: &[Candidate],
    ) -> Result<Vec<Candidate>, String> {
        let mut author_counts: HashMap<String, usize> = HashMap::new();
        let mut topic_counts: HashMap<String, usize> = HashMap::new();
        let mut sentiment_counts: HashMap<String, usize> = HashMap::new();
        let mut scored = vec![Candidate::default(); candidates.len()];

        let mut ordered: Vec<(usize, &Candidate)> = candidates.iter().enumerate().collect();
        ordered.sort_by(|(_, a), (_, b)| {
            b.score
                .final_score
                .partial_cmp(&a.score.final_score)
                .unwrap_or(Ordering::Equal)
        });

        for (original_idx, candidate) in ordered {
            let author_key = candidate.author.username.clone();
            let topic_key = Self::primary_topic(candidate).to_string();
            let sentiment_key = Self::sentiment_bucket(candidate).to_string();

            let author_seen = author_counts.entry(author_key).or_insert(0);
            let author_mult = self.author.multiplier(*author_seen);
            *author_seen += 1;

            let topic_seen = topic_counts.entry(topic_key).or_insert(0);
            let topic_mult = self.topic.multiplier(*topic_seen);
            *topic_seen += 1;

            let sentiment_seen = sentiment_counts.entry(sentiment_key).or_insert(0);
            let sentiment_mult = self.sentiment.multiplier(*sentiment_seen);
            *sentiment_seen += 1;

            let combined = author_mult * topic_mult * sentiment_mult;
            let mut score = candidate.score.clone();
            score.final_score *= combined;
            score
                .weighted_components
                .insert("multi_diversity", util::round3(combined));

            scored[original_idx] = Candidate {
                score,
                ..Candidate::default()
            };
        }

        Ok(scored)
    }

    fn update(&self, candidate: &mut Candidate, scored: Candidate) {
        candidate.score = scored.score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthorInfo, CandidateFeatures};

    fn candidate(author: &str, topic: Option<&str>, sentiment: f64, score: f64) -> Candidate {
        let mut c = Candidate {
            author: AuthorInfo::new(author),
            features: CandidateFeatures {
                sentiment_intensity: sentiment,
                topics: topic.map(|t| vec![t.to_string()]).unwrap_or_default(),
                ..CandidateFeatures::default()
            },
            ..Candidate::default()
        };
        c.score.final_score = score;
        c
    }

    #[test]
    fn sentiment_buckets_split_at_thresholds() {
        assert_eq!(
            MultiDiversityScorer::sentiment_bucket(&candidate("a", None, 0.0, 0.0)),
            "low"
        );
        assert_eq!(
            MultiDiversityScorer::sentiment_bucket(&candidate("a", None, 0.33, 0.0)),
            "mid"
        );
        assert_eq!(
            MultiDiversityScorer::sentiment_bucket(&candidate("a", None, 0.66, 0.0)),
            "high"
        );
        assert_eq!(
            MultiDiversityScorer::sentiment_bucket(&candidate("a", None, 1.0, 0.0)),
            "high"
        );
    }

    #[test]
    fn missing_topics_fall_back_to_general() {
        assert_eq!(
            MultiDiversityScorer::primary_topic(&candidate("a", None, 0.0, 0.0)),
            "general"
        );
        assert_eq!(
            MultiDiversityScorer::primary_topic(&candidate("a", Some("배송"), 0.0, 0.0)),
            "배송"
        );
    }

    #[tokio::test]
    async fn distinct_candidates_keep_full_scores() {
        let scorer = MultiDiversityScorer::default();
        let query = InsightQuery::new("req", "prod");
        let candidates = vec![
            candidate("a", Some("가격"), 0.1, 10.0),
            candidate("b", Some("배송"), 0.5, 8.0),
            candidate("c", Some("품질"), 0.9, 6.0),
        ];
        let scored = scorer.score(&query, &candidates).await.unwrap();
        for (idx, original) in [10.0, 8.0, 6.0].iter().enumerate() {
            assert!((scored[idx].score.final_score - original).abs() < 1e-9);
            assert_eq!(
                scored[idx].score.weighted_components.get("multi_diversity"),
                Some(1.0)
            );
        }
    }

    #[tokio::test]
    async fn repeats_compound_across_dimensions() {
        let scorer = MultiDiversityScorer::default();
        let query = InsightQuery::new("req", "prod");
        // same author, same topic, same sentiment bucket
        let candidates = vec![
            candidate("a", Some("가격"), 0.1, 10.0),
            candidate("a", Some("가격"), 0.1, 10.0),
        ];
        let scored = scorer.score(&query, &candidates).await.unwrap();
        // second occurrence: author 0.79 * topic 0.9 * sentiment 0.96
        let expected = 10.0 * (0.7 * 0.7 + 0.3) * (0.5 * 0.8 + 0.5) * (0.4 * 0.9 + 0.6);
        let attenuated = scored
            .iter()
            .map(|c| c.score.final_score)
            .fold(f64::INFINITY, f64::min);
        assert!((attenuated - expected).abs() < 1e-6);
        // and it never dips below the product of floors
        assert!(attenuated >= 10.0 * 0.3 * 0.5 * 0.6);
    }
}
