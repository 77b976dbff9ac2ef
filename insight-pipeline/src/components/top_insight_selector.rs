use crate::selector::Selector;
use crate::types::{Candidate, Insight, InsightFeatures, InsightQuery};

/// Selects the top K candidates by final score and builds the insight
/// projection handed back to callers.
pub struct TopInsightSelector {
    pub k: usize,
}

impl Default for TopInsightSelector {
    fn default() -> Self {
        Self { k: 5 }
    }
}

impl Selector<InsightQuery, Candidate> for TopInsightSelector {
    fn score(&self, candidate: &Candidate) -> f64 {
        candidate.score.final_score
    }

    fn size(&self) -> Option<usize> {
        Some(self.k)
    }
}

impl TopInsightSelector {
    /// Assign 1-based ranks over the already-ranked survivors, mark them
    /// selected, and emit the lightweight projection.
    ///
    /// `features.viral` is read from `reply_inducing`, matching the
    /// long-standing output contract consumers already depend on.
    pub fn project(&self, selected: &mut [Candidate]) -> Vec<Insight> {
        selected
            .iter_mut()
            .enumerate()
            .map(|(idx, candidate)| {
                let rank = idx + 1;
                candidate.is_selected = true;
                candidate.selection_reason =
                    format!("Rank {}: {}", rank, candidate.score.explanation);

                Insight {
                    rank,
                    author: candidate.author.username.clone(),
                    content: candidate.content.clone(),
                    score: candidate.score.final_score,
                    reason: candidate.score.explanation.clone(),
                    features: InsightFeatures {
                        purchase: candidate.features.purchase_intent,
                        viral: candidate.features.reply_inducing,
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateFeatures;

    fn candidate(id: &str, final_score: f64) -> Candidate {
        let mut c = Candidate {
            id: id.into(),
            ..Candidate::default()
        };
        c.score.final_score = final_score;
        c
    }

    #[test]
    fn selection_sorts_and_truncates() {
        let selector = TopInsightSelector { k: 2 };
        let query = InsightQuery::new("req", "prod");
        let candidates = vec![
            candidate("low", 1.0),
            candidate("high", 10.0),
            candidate("mid", 5.0),
        ];
        let selected = selector.select(&query, candidates);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].id, "high");
        assert_eq!(selected[1].id, "mid");
    }

    #[test]
    fn truncation_never_exceeds_input() {
        let selector = TopInsightSelector { k: 10 };
        let query = InsightQuery::new("req", "prod");
        let selected = selector.select(&query, vec![candidate("only", 3.0)]);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn projection_assigns_contiguous_ranks() {
        let selector = TopInsightSelector::default();
        let mut selected = vec![candidate("a", 9.0), candidate("b", 7.0)];
        selected[0].score.explanation = "purchase_intent(0.9) raised the score".into();
        let insights = selector.project(&mut selected);

        let ranks: Vec<usize> = insights.iter().map(|i| i.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert!(selected.iter().all(|c| c.is_selected));
        assert_eq!(
            selected[0].selection_reason,
            "Rank 1: purchase_intent(0.9) raised the score"
        );
    }

    #[test]
    fn viral_feature_reads_reply_inducing() {
        let selector = TopInsightSelector::default();
        let mut selected = vec![Candidate {
            features: CandidateFeatures {
                purchase_intent: 0.8,
                reply_inducing: 0.6,
                viral_potential: 0.1,
                ..CandidateFeatures::default()
            },
            ..Candidate::default()
        }];
        let insights = selector.project(&mut selected);
        assert!((insights[0].features.purchase - 0.8).abs() < 1e-9);
        assert!((insights[0].features.viral - 0.6).abs() < 1e-9);
    }

    #[test]
    fn nan_scores_sink_to_the_bottom() {
        let selector = TopInsightSelector { k: 3 };
        let query = InsightQuery::new("req", "prod");
        let candidates = vec![
            candidate("nan", f64::NAN),
            candidate("ok", 1.0),
        ];
        let selected = selector.select(&query, candidates);
        assert_eq!(selected[0].id, "ok");
    }
}
