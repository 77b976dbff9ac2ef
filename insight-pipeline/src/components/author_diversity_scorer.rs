use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::scorer::Scorer;
use crate::types::{Candidate, InsightQuery};

/// Attenuates scores for repeated authors so the surfaced insights cover
/// several voices instead of one prolific commenter.
///
/// Candidates are walked in current-score-descending order; the Nth
/// appearance of an author (N >= 1) is multiplied by
/// `(1 - floor) * decay^N + floor`. The first appearance is untouched and
/// the floor guarantees no author is ever fully suppressed.
pub struct AuthorDiversityScorer {
    pub decay_factor: f64,
    pub floor: f64,
}

impl Default for AuthorDiversityScorer {
    fn default() -> Self {
        Self {
            decay_factor: 0.7,
            floor: 0.3,
        }
    }
}

impl AuthorDiversityScorer {
    pub fn multiplier(&self, occurrence: usize) -> f64 {
        (1.0 - self.floor) * self.decay_factor.powf(occurrence as f64) + self.floor
    }
}

#[async_trait]
impl Scorer<InsightQuery, Candidate> for AuthorDiversityScorer {
    async fn score(
        &self,
        _query: &InsightQuery,
        candidates: &[Candidate],
    ) -> Result<Vec<Candidate>, String> {
        let mut author_counts: HashMap<String, usize> = HashMap::new();
        let mut scored = vec![Candidate::default(); candidates.len()];

        // Walk in current score order so the penalty lands on the weaker
        // duplicates, not on whichever happened to come first in the list.
        let mut ordered: Vec<(usize, &Candidate)> = candidates.iter().enumerate().collect();
        ordered.sort_by(|(_, a), (_, b)| {
            b.score
                .final_score
                .partial_cmp(&a.score.final_score)
                .unwrap_or(Ordering::Equal)
        });

        for (original_idx, candidate) in ordered {
            let entry = author_counts
                .entry(candidate.author.username.clone())
                .or_insert(0);
            let occurrence = *entry;
            *entry += 1;

            let mut score = candidate.score.clone();
            if occurrence > 0 {
                let multiplier = self.multiplier(occurrence);
                score.final_score *= multiplier;
                score.weighted_components.insert("diversity_decay", multiplier);
            }

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
