use std::sync::Arc;

use crate::cache::FeatureCache;
use crate::comment_loader::RawComment;
use crate::components::author_diversity_scorer::AuthorDiversityScorer;
use crate::components::comment_source::CommentSource;
use crate::components::engagement_scorer::EngagementScorer;
use crate::components::feature_hydrator::FeatureHydrator;
use crate::components::multi_diversity_scorer::MultiDiversityScorer;
use crate::components::profile_learning_side_effect::ProfileLearningSideEffect;
use crate::components::quality_filter::QualityFilter;
use crate::components::similarity_reranker::SimilarityReranker;
use crate::components::top_insight_selector::TopInsightSelector;
use crate::error::{PipelineError, PipelineResult};
use crate::extractor::TextFeatureExtractor;
use crate::filter::Filter;
use crate::hydrator::Hydrator;
use crate::query_hydrator::QueryHydrator;
use crate::scorer::Scorer;
use crate::selector::Selector;
use crate::side_effect::{SideEffect, SideEffectInput, SideEffectManager};
use crate::source::Source;
use crate::types::{Candidate, InsightQuery, PipelineOutcome, PipelineStats};
use crate::user_profile::UserProfileManager;

/// Which diversity variant the pipeline applies. Exactly one is active per
/// configuration, never both.
pub enum DiversityMode {
    Author(AuthorDiversityScorer),
    Multi(MultiDiversityScorer),
}

impl DiversityMode {
    fn as_scorer(&self) -> &dyn Scorer<InsightQuery, Candidate> {
        match self {
            DiversityMode::Author(scorer) => scorer,
            DiversityMode::Multi(scorer) => scorer,
        }
    }

    fn stage_name(&self) -> &'static str {
        match self {
            DiversityMode::Author(_) => "diversity",
            DiversityMode::Multi(_) => "multi_diversity",
        }
    }
}

/// The insight-extraction pipeline over one collected comment batch.
///
/// Stage order:
/// 1. CommentSource adapts raw records into candidates
/// 2. QualityFilter removes obvious spam before extraction cost is paid
/// 3. FeatureHydrator annotates candidates via the external extractor
/// 4. the same QualityFilter runs again, now with toxicity populated
/// 5. EngagementScorer ranks by weighted feature probabilities
/// 6. optional post-scoring filters (conversation dedup)
/// 7. diversity decay attenuates repeated authors/topics/sentiment
/// 8. optional similarity reranking against the product profile
/// 9. TopInsightSelector truncates and projects the result
///
/// Empty batches short-circuit with well-formed stats. Per-candidate
/// hydration failures are isolated inside the hydrator; any other stage
/// error propagates to the caller untouched.
pub struct InsightPipeline {
    source: Box<dyn Source<InsightQuery, Candidate>>,
    query_hydrators: Vec<Box<dyn QueryHydrator<InsightQuery>>>,
    quality_filter: Arc<QualityFilter>,
    hydrator: Box<dyn Hydrator<InsightQuery, Candidate>>,
    scorer: Box<dyn Scorer<InsightQuery, Candidate>>,
    post_scoring_filters: Vec<Box<dyn Filter<InsightQuery, Candidate>>>,
    diversity: Option<DiversityMode>,
    reranker: Option<SimilarityReranker>,
    selector: TopInsightSelector,
    side_effects: Arc<Vec<Box<dyn SideEffect<InsightQuery, Candidate>>>>,
    side_effect_manager: Arc<SideEffectManager>,
}

impl InsightPipeline {
    /// Start building a pipeline around the given feature extractor.
    pub fn builder(extractor: Arc<dyn TextFeatureExtractor>) -> InsightPipelineBuilder {
        InsightPipelineBuilder::new(extractor)
    }

    /// Run the pipeline for one query. Returns ranked insights plus the
    /// per-stage survivor counts.
    pub async fn run(&self, query: &InsightQuery) -> PipelineResult<PipelineOutcome> {
        let mut query = query.clone();
        for query_hydrator in &self.query_hydrators {
            if !query_hydrator.enable(&query) {
                continue;
            }
            let hydrated = query_hydrator
                .hydrate(&query)
                .await
                .map_err(|message| PipelineError::stage("query_hydration", message))?;
            query_hydrator.update(&mut query, hydrated);
        }

        let mut stats = PipelineStats::default();

        // 1. Source: raw records -> candidates
        let mut candidates = if self.source.enable(&query) {
            self.source
                .get_candidates(&query)
                .await
                .map_err(|message| PipelineError::stage("source", message))?
        } else {
            Vec::new()
        };
        stats.original_count = candidates.len();

        // 2.1 Pre-hydration filter: drop obvious garbage before paying for
        // feature extraction. Toxicity is still 0.0 here, so only the
        // structural checks bite.
        candidates = self
            .apply_quality_filter(&query, candidates, "pre_filter")
            .await?;
        stats.filtered_count = candidates.len();
        if candidates.is_empty() {
            log::info!(
                "request_id={} no candidates survived pre-filter ({} in)",
                query.request_id,
                stats.original_count
            );
            return Ok(PipelineOutcome {
                insights: Vec::new(),
                stats,
            });
        }

        // 2.2 Hydration
        let hydrated = self
            .hydrator
            .hydrate(&query, &candidates)
            .await
            .map_err(|message| PipelineError::stage("hydration", message))?;
        for (candidate, hydrated) in candidates.iter_mut().zip(hydrated) {
            self.hydrator.update(candidate, hydrated);
        }

        // 2.3 Post-hydration filter: same instance, toxicity now populated
        candidates = self
            .apply_quality_filter(&query, candidates, "post_filter")
            .await?;
        stats.post_filtered_count = Some(candidates.len());
        if candidates.is_empty() {
            log::info!(
                "request_id={} no candidates survived post-filter",
                query.request_id
            );
            return Ok(PipelineOutcome {
                insights: Vec::new(),
                stats,
            });
        }

        // 3. Scoring, then rank by score
        let scored = self
            .scorer
            .score(&query, &candidates)
            .await
            .map_err(|message| PipelineError::stage("scoring", message))?;
        for (candidate, scored) in candidates.iter_mut().zip(scored) {
            self.scorer.update(candidate, scored);
        }
        candidates = self.selector.sort(candidates);

        // 3.1 Post-scoring filters (conversation dedup and friends)
        for filter in &self.post_scoring_filters {
            if !filter.enable(&query) {
                continue;
            }
            let result = filter
                .filter(&query, candidates)
                .await
                .map_err(|message| PipelineError::stage("post_scoring_filter", message))?;
            candidates = result.kept;
        }

        // 4. Diversity decay
        if let Some(mode) = &self.diversity {
            let scorer = mode.as_scorer();
            let scored = scorer
                .score(&query, &candidates)
                .await
                .map_err(|message| PipelineError::stage(mode.stage_name(), message))?;
            for (candidate, scored) in candidates.iter_mut().zip(scored) {
                scorer.update(candidate, scored);
            }
            candidates = self.selector.sort(candidates);
        }

        // 5. Similarity reranking
        if let Some(reranker) = &self.reranker {
            let scored = reranker
                .score(&query, &candidates)
                .await
                .map_err(|message| PipelineError::stage("reranking", message))?;
            for (candidate, scored) in candidates.iter_mut().zip(scored) {
                Scorer::update(reranker, candidate, scored);
            }
            candidates = self.selector.sort(candidates);
        }
        stats.processed_count = candidates.len();

        // 6. Selection and projection
        let mut selected = self.selector.select(&query, candidates);
        let insights = self.selector.project(&mut selected);

        self.side_effect_manager.dispatch(
            Arc::clone(&self.side_effects),
            SideEffectInput {
                query: Arc::new(query.clone()),
                selected_candidates: selected,
            },
        );

        log::info!(
            "request_id={} pipeline complete: {} -> {} -> {:?} -> {} selected={}",
            query.request_id,
            stats.original_count,
            stats.filtered_count,
            stats.post_filtered_count,
            stats.processed_count,
            insights.len()
        );

        Ok(PipelineOutcome { insights, stats })
    }

    /// Await completion of all outstanding side-effect tasks.
    pub async fn flush_side_effects(&self) {
        self.side_effect_manager.flush().await;
    }

    async fn apply_quality_filter(
        &self,
        query: &InsightQuery,
        candidates: Vec<Candidate>,
        stage: &'static str,
    ) -> PipelineResult<Vec<Candidate>> {
        let result = self
            .quality_filter
            .filter(query, candidates)
            .await
            .map_err(|message| PipelineError::stage(stage, message))?;
        if !result.removed.is_empty() {
            log::debug!(
                "request_id={} {} removed {} candidates",
                query.request_id,
                stage,
                result.removed.len()
            );
        }
        Ok(result.kept)
    }
}

/// Assembles an `InsightPipeline` with sensible defaults: author diversity
/// decay on, no reranking, top 5 insights.
pub struct InsightPipelineBuilder {
    extractor: Arc<dyn TextFeatureExtractor>,
    comments: Vec<RawComment>,
    cache: Option<Arc<FeatureCache>>,
    banned_keywords: Vec<String>,
    diversity: Option<DiversityMode>,
    profiles: Option<Arc<UserProfileManager>>,
    top_k: usize,
    query_hydrators: Vec<Box<dyn QueryHydrator<InsightQuery>>>,
    post_scoring_filters: Vec<Box<dyn Filter<InsightQuery, Candidate>>>,
    side_effects: Vec<Box<dyn SideEffect<InsightQuery, Candidate>>>,
}

impl InsightPipelineBuilder {
    fn new(extractor: Arc<dyn TextFeatureExtractor>) -> Self {
        Self {
            extractor,
            comments: Vec::new(),
            cache: None,
            banned_keywords: Vec::new(),
            diversity: Some(DiversityMode::Author(AuthorDiversityScorer::default())),
            profiles: None,
            top_k: 5,
            query_hydrators: Vec::new(),
            post_scoring_filters: Vec::new(),
            side_effects: Vec::new(),
        }
    }

    /// The raw comment batch this pipeline instance will process.
    pub fn with_comments(mut self, comments: Vec<RawComment>) -> Self {
        self.comments = comments;
        self
    }

    /// Share a feature cache across pipeline instances.
    pub fn with_cache(mut self, cache: Arc<FeatureCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Brand-specific banned keywords for the quality filter.
    pub fn with_banned_keywords(mut self, keywords: Vec<String>) -> Self {
        self.banned_keywords = keywords;
        self
    }

    pub fn with_diversity(mut self, mode: DiversityMode) -> Self {
        self.diversity = Some(mode);
        self
    }

    /// Switch to the author x topic x sentiment diversity variant.
    pub fn with_multi_diversity(mut self) -> Self {
        self.diversity = Some(DiversityMode::Multi(MultiDiversityScorer::default()));
        self
    }

    pub fn without_diversity(mut self) -> Self {
        self.diversity = None;
        self
    }

    /// Enable similarity reranking and preference learning against the
    /// given profile store.
    pub fn with_profiles(mut self, profiles: Arc<UserProfileManager>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_query_hydrator(
        mut self,
        query_hydrator: Box<dyn QueryHydrator<InsightQuery>>,
    ) -> Self {
        self.query_hydrators.push(query_hydrator);
        self
    }

    /// Add a filter that runs after scoring (e.g. conversation dedup).
    pub fn with_post_scoring_filter(
        mut self,
        filter: Box<dyn Filter<InsightQuery, Candidate>>,
    ) -> Self {
        self.post_scoring_filters.push(filter);
        self
    }

    pub fn with_side_effect(
        mut self,
        side_effect: Box<dyn SideEffect<InsightQuery, Candidate>>,
    ) -> Self {
        self.side_effects.push(side_effect);
        self
    }

    pub fn build(self) -> InsightPipeline {
        let cache = self.cache.unwrap_or_else(|| Arc::new(FeatureCache::default()));
        let mut side_effects = self.side_effects;
        let reranker = self.profiles.as_ref().map(|profiles| {
            side_effects.push(Box::new(ProfileLearningSideEffect::new(Arc::clone(
                profiles,
            ))));
            SimilarityReranker::new(Arc::clone(profiles))
        });

        InsightPipeline {
            source: Box::new(CommentSource::new(self.comments)),
            query_hydrators: self.query_hydrators,
            quality_filter: Arc::new(QualityFilter::new(self.banned_keywords)),
            hydrator: Box::new(FeatureHydrator::new(self.extractor, cache)),
            scorer: Box::new(EngagementScorer),
            post_scoring_filters: self.post_scoring_filters,
            diversity: self.diversity,
            reranker,
            selector: TopInsightSelector { k: self.top_k },
            side_effects: Arc::new(side_effects),
            side_effect_manager: Arc::new(SideEffectManager::new()),
        }
    }
}
