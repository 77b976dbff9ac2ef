pub mod age_filter;
pub mod author_block_filter;
pub mod author_diversity_scorer;
pub mod comment_source;
pub mod composite_filter;
pub mod conversation_dedup_filter;
pub mod duplicate_filter;
pub mod engagement_scorer;
pub mod feature_hydrator;
pub mod multi_diversity_scorer;
pub mod muted_keyword_filter;
pub mod previously_seen_filter;
pub mod product_context_hydrator;
pub mod profile_learning_side_effect;
pub mod quality_filter;
pub mod similarity_reranker;
pub mod top_insight_selector;
