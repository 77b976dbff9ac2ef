use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Types that expose a request id for logging/tracing.
pub trait HasRequestId {
    fn request_id(&self) -> &str;
}

/// Query describing one insight-extraction run.
#[derive(Clone, Debug)]
pub struct InsightQuery {
    pub request_id: String,
    /// Product the comment batch belongs to; keys the preference profile.
    pub product_id: String,
    /// Number of insights to surface.
    pub top_k: usize,
    /// Brand keywords loaded by query hydration (empty until hydrated).
    pub brand_keywords: Vec<String>,
}

impl InsightQuery {
    pub fn new(request_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            product_id: product_id.into(),
            top_k: 5,
            brand_keywords: Vec::new(),
        }
    }
}

impl HasRequestId for InsightQuery {
    fn request_id(&self) -> &str {
        &self.request_id
    }
}

// ---------------------------------------------------------------------------
// Candidate types
// ---------------------------------------------------------------------------

/// Comment author metadata, fixed for the lifetime of a candidate.
#[derive(Clone, Debug, Serialize)]
pub struct AuthorInfo {
    /// Identity key for diversity decay and author blocking.
    pub username: String,
    pub is_verified: bool,
    /// Reserved for future scoring stages; no current stage reads it.
    pub reputation_score: f64,
}

impl AuthorInfo {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_verified: false,
            reputation_score: 0.0,
        }
    }
}

/// The 19 scalar feature names, in vectorization order.
///
/// `SimilarityReranker` and `UserProfileManager` both index feature vectors
/// by this ordering, so it must stay stable.
pub const FEATURE_KEYS: [&str; 19] = [
    "purchase_intent",
    "constructive_feedback",
    "reply_inducing",
    "share_probability",
    "viral_potential",
    "actionable_insight",
    "quote_worthy",
    "save_worthy",
    "follow_author",
    "sentiment_intensity",
    "dwell_time",
    "toxicity",
    "controversy_score",
    "not_interested",
    "report_probability",
    "dm_probability",
    "copy_link_probability",
    "profile_click",
    "bookmark_worthy",
];

/// Engagement-probability features estimated for one comment.
///
/// Each scalar is an independently-estimated probability in [0.0, 1.0].
/// Values arrive from an external extractor and are not hard-clamped, so
/// downstream stages must not assume the range holds for adversarial input.
/// All fields default to zero/empty until hydration populates them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateFeatures {
    // Positive actions
    pub purchase_intent: f64,
    pub constructive_feedback: f64,
    pub reply_inducing: f64,
    pub share_probability: f64,
    pub viral_potential: f64,
    pub actionable_insight: f64,
    pub quote_worthy: f64,
    pub save_worthy: f64,
    pub follow_author: f64,
    pub dm_probability: f64,
    pub copy_link_probability: f64,
    pub profile_click: f64,
    pub bookmark_worthy: f64,

    // Neutral actions
    pub sentiment_intensity: f64,
    pub dwell_time: f64,

    // Negative actions
    pub toxicity: f64,
    pub controversy_score: f64,
    pub not_interested: f64,
    pub report_probability: f64,

    // Extracted metadata
    pub keywords: Vec<String>,
    pub topics: Vec<String>,
}

impl CandidateFeatures {
    /// Look up a scalar feature by its name in `FEATURE_KEYS`.
    /// Unknown names read as 0.0.
    pub fn scalar(&self, key: &str) -> f64 {
        match key {
            "purchase_intent" => self.purchase_intent,
            "constructive_feedback" => self.constructive_feedback,
            "reply_inducing" => self.reply_inducing,
            "share_probability" => self.share_probability,
            "viral_potential" => self.viral_potential,
            "actionable_insight" => self.actionable_insight,
            "quote_worthy" => self.quote_worthy,
            "save_worthy" => self.save_worthy,
            "follow_author" => self.follow_author,
            "sentiment_intensity" => self.sentiment_intensity,
            "dwell_time" => self.dwell_time,
            "toxicity" => self.toxicity,
            "controversy_score" => self.controversy_score,
            "not_interested" => self.not_interested,
            "report_probability" => self.report_probability,
            "dm_probability" => self.dm_probability,
            "copy_link_probability" => self.copy_link_probability,
            "profile_click" => self.profile_click,
            "bookmark_worthy" => self.bookmark_worthy,
            _ => 0.0,
        }
    }

    /// The 19-dimensional feature vector in `FEATURE_KEYS` order.
    pub fn vector(&self) -> Vec<f64> {
        FEATURE_KEYS.iter().map(|key| self.scalar(key)).collect()
    }
}

/// Signed score contributions, keyed by contributor name.
///
/// Insertion order is preserved (computation order), so explanations and
/// appended adjustments (`diversity_decay`, `multi_diversity`, `similarity`)
/// read back in the order they were produced.
#[derive(Clone, Debug, Default)]
pub struct ScoreComponents(Vec<(String, f64)>);

impl ScoreComponents {
    /// Record a contribution. An existing key is overwritten in place.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        if let Some(entry) = self.0.iter_mut().find(|(existing, _)| *existing == name) {
            entry.1 = value;
        } else {
            self.0.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ScoreComponents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Result of the scoring stages for one candidate.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CandidateScore {
    /// The ranking score. Mutated in turn by the engagement scorer,
    /// diversity decay, and similarity reranking.
    pub final_score: f64,
    /// positive - negative before offsetting; diagnostic only.
    pub raw_score: f64,
    pub positive_score: f64,
    pub negative_score: f64,
    pub weighted_components: ScoreComponents,
    /// Human-readable rationale built from the top-magnitude components.
    pub explanation: String,
}

/// The unit flowing through the ranking pipeline: one comment.
///
/// Created by the source stage, then enriched stage by stage: the hydrator
/// writes `features`, the scoring stages write `score`, and the selector
/// writes `is_selected`/`selection_reason` on the final surviving subset.
#[derive(Clone, Debug, Serialize)]
pub struct Candidate {
    pub id: String,
    pub content: String,
    pub author: AuthorInfo,
    pub created_at: DateTime<Utc>,
    pub like_count: u64,
    /// Groups replies to the same parent for conversation dedup.
    pub conversation_id: Option<String>,
    pub is_deleted: bool,
    pub features: CandidateFeatures,
    pub score: CandidateScore,
    pub is_selected: bool,
    pub selection_reason: String,
}

impl Default for Candidate {
    fn default() -> Self {
        Self {
            id: String::new(),
            content: String::new(),
            author: AuthorInfo::new("Anonymous"),
            created_at: Utc::now(),
            like_count: 0,
            conversation_id: None,
            is_deleted: false,
            features: CandidateFeatures::default(),
            score: CandidateScore::default(),
            is_selected: false,
            selection_reason: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// The feature excerpt surfaced with each insight.
#[derive(Clone, Debug, Serialize)]
pub struct InsightFeatures {
    pub purchase: f64,
    pub viral: f64,
}

/// Final, ranked projection of a selected candidate.
#[derive(Clone, Debug, Serialize)]
pub struct Insight {
    /// 1-based position in the final ranking.
    pub rank: usize,
    pub author: String,
    pub content: String,
    pub score: f64,
    pub reason: String,
    pub features: InsightFeatures,
}

/// Candidate counts surviving each pipeline stage.
///
/// Gives callers visibility into where attrition occurred, which is the
/// main diagnostic when a batch produces fewer insights than expected.
/// `post_filtered_count` is absent when the run short-circuits before
/// hydration.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PipelineStats {
    pub original_count: usize,
    pub filtered_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_filtered_count: Option<usize>,
    pub processed_count: usize,
}

/// What a pipeline run hands back to its caller.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineOutcome {
    pub insights: Vec<Insight>,
    pub stats: PipelineStats,
}

/// Per-product preference profile learned from past selections.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub product_id: String,
    /// Exponential moving average of selected candidates' scalar features.
    pub preferred_features: HashMap<String, f64>,
    pub topic_affinities: HashMap<String, f64>,
    pub interaction_count: u64,
}
