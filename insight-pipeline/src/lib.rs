//! Comment insight-ranking pipeline.
//!
//! Converts a raw, noisy stream of user comments into a small set of
//! ranked "insights" using a multi-stage candidate pipeline modeled on
//! large-scale feed-ranking systems:
//!
//! source -> filter -> hydrate -> filter -> score -> diversify -> rerank -> select
//!
//! The framework traits (`Source`, `Filter`, `Hydrator`, `Scorer`,
//! `Selector`, `SideEffect`) are generic over query and candidate types;
//! the concrete components under `components/` wire them to the comment
//! domain, and `pipelines::insight_extraction` assembles the whole thing.

pub mod bloom;
pub mod cache;
pub mod comment_loader;
pub mod components;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod hydrator;
pub mod pipelines;
pub mod query_hydrator;
pub mod scorer;
pub mod selector;
pub mod side_effect;
pub mod source;
pub mod types;
pub mod user_profile;
pub mod util;

pub use bloom::BloomFilter;
pub use cache::{CacheStats, FeatureCache};
pub use comment_loader::{load_comments, load_comments_file, RawComment};
pub use error::{PipelineError, PipelineResult};
pub use extractor::{parse_feature_response, ExtractionError, TextFeatureExtractor};
pub use pipelines::insight_extraction::{DiversityMode, InsightPipeline, InsightPipelineBuilder};
pub use types::{
    AuthorInfo, Candidate, CandidateFeatures, CandidateScore, Insight, InsightQuery,
    PipelineOutcome, PipelineStats, UserProfile, FEATURE_KEYS,
};
pub use user_profile::UserProfileManager;
