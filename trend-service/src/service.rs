use crate::orchestrator::{FetchOrchestrator, Fetched};
use post_cache::{CacheKey, PostCache, SearchKey};
use reddit_client::{
    CommentFetcher, ContentQuery, RedditApiClient, RedditPostData, RemoteContentFetcher,
};
use sentiment_engine::{CommentAggregator, TextScorer};
use std::future::Future;
use std::sync::Arc;
use threadpulse_core::{
    AnalysisError, AnalysisSummary, AppConfig, CoreError, ErrorExt, Post, ScoredComment,
    SearchRequest, SortBy, TimeFilter,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// The operations exposed to the routing layer: trending, refresh, search and
/// comment analysis.
pub struct TrendService {
    content: Arc<dyn RemoteContentFetcher>,
    comments: Arc<dyn CommentFetcher>,
    orchestrator: FetchOrchestrator<CacheKey, Post>,
    scorer: TextScorer,
    aggregator: CommentAggregator,
    permalink_base: String,
}

impl TrendService {
    pub fn new(
        config: &AppConfig,
        content: Arc<dyn RemoteContentFetcher>,
        comments: Arc<dyn CommentFetcher>,
    ) -> Self {
        Self::with_cache(config, content, comments, PostCache::new(config.page_size))
    }

    /// Builds a service that shares `cache` with any other holder of it.
    pub fn with_cache(
        config: &AppConfig,
        content: Arc<dyn RemoteContentFetcher>,
        comments: Arc<dyn CommentFetcher>,
        cache: PostCache,
    ) -> Self {
        Self {
            content,
            comments,
            orchestrator: FetchOrchestrator::new(cache, config.cache_ttl()),
            scorer: TextScorer::new(),
            aggregator: CommentAggregator::new(),
            permalink_base: config.permalink_base_url.clone(),
        }
    }

    /// Wires the service to the live Reddit API.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let client = Arc::new(RedditApiClient::new(config)?);
        Ok(Self::new(config, client.clone(), client))
    }

    pub fn cache(&self) -> &PostCache {
        self.orchestrator.cache()
    }

    pub async fn get_trending(&self) -> Result<Vec<Post>, CoreError> {
        let query = ContentQuery::Trending;
        let fetched = self
            .orchestrator
            .get_or_fetch(
                &CacheKey::Trending,
                || self.content.fetch(&query),
                |raw: RedditPostData| raw.into_post(&self.permalink_base),
            )
            .await?;
        Ok(self.finish("trending", fetched))
    }

    pub async fn refresh_trending(&self) -> Result<Vec<Post>, CoreError> {
        let query = ContentQuery::Trending;
        let fetched = self
            .orchestrator
            .force_refresh(
                &CacheKey::Trending,
                || self.content.fetch(&query),
                |raw: RedditPostData| raw.into_post(&self.permalink_base),
            )
            .await?;
        Ok(self.finish("trending refresh", fetched))
    }

    pub async fn search(
        &self,
        topic: &str,
        sort_by: SortBy,
        time_filter: TimeFilter,
    ) -> Result<Vec<Post>, CoreError> {
        let request = SearchRequest::new(topic, sort_by, time_filter)?;
        let key = CacheKey::from(SearchKey::from(&request));
        let query = ContentQuery::Search(request);

        let fetched = self
            .orchestrator
            .get_or_fetch(
                &key,
                || self.content.fetch(&query),
                |raw: RedditPostData| raw.into_post(&self.permalink_base),
            )
            .await
            .map_err(|e| match e {
                CoreError::ServiceUnavailable { .. } => CoreError::ServiceUnavailable {
                    message: format!(
                        "Unable to fetch posts for topic \"{}\". The Reddit API may be temporarily unavailable.",
                        topic
                    ),
                },
                other => other,
            })?;
        Ok(self.finish(&key.to_string(), fetched))
    }

    pub async fn analyze(&self, permalink: &str) -> Result<AnalysisSummary, CoreError> {
        let permalink = permalink.trim();
        if permalink.is_empty() {
            return Err(CoreError::Validation {
                field: "permalink".to_string(),
                message: "Permalink is required".to_string(),
            });
        }

        let bodies = self.comments.fetch_comments(permalink).await.map_err(|e| {
            e.log_error();
            if e.is_fetch_failure() {
                CoreError::ServiceUnavailable {
                    message: format!(
                        "Unable to fetch comments for {}. The Reddit API may be temporarily unavailable.",
                        permalink
                    ),
                }
            } else {
                e
            }
        })?;

        if bodies.is_empty() {
            return Err(AnalysisError::NoComments {
                permalink: permalink.to_string(),
            }
            .into());
        }

        let scored: Vec<ScoredComment> = bodies
            .iter()
            .map(|body| self.scorer.score_comment(body))
            .collect();
        let summary = self.aggregator.summarize(&scored)?;

        info!(
            "Analyzed {} comments for {}: {} overall, {}% pain points",
            summary.total_comments,
            permalink,
            summary.overall_sentiment,
            summary.pain_point_percentage
        );
        Ok(summary)
    }

    pub async fn get_trending_with_cancel(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<Post>, CoreError> {
        cancellable(token, "get_trending", self.get_trending()).await
    }

    pub async fn refresh_trending_with_cancel(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<Post>, CoreError> {
        cancellable(token, "refresh_trending", self.refresh_trending()).await
    }

    pub async fn search_with_cancel(
        &self,
        topic: &str,
        sort_by: SortBy,
        time_filter: TimeFilter,
        token: &CancellationToken,
    ) -> Result<Vec<Post>, CoreError> {
        cancellable(token, "search", self.search(topic, sort_by, time_filter)).await
    }

    pub async fn analyze_with_cancel(
        &self,
        permalink: &str,
        token: &CancellationToken,
    ) -> Result<AnalysisSummary, CoreError> {
        cancellable(token, "analyze", self.analyze(permalink)).await
    }

    fn finish(&self, label: &str, fetched: Fetched<Post>) -> Vec<Post> {
        debug!(
            "{} served {} posts via {:?} (fetched at {})",
            label,
            fetched.items.len(),
            fetched.source,
            fetched.fetched_at
        );
        fetched.items
    }
}

/// Races `operation` against `token`. A token that is already cancelled wins
/// before the operation is polled.
pub async fn cancellable<T, F>(
    token: &CancellationToken,
    operation: &str,
    future: F,
) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            info!("{} cancelled", operation);
            Err(CoreError::Cancelled {
                operation: operation.to_string(),
            })
        }
        result = future => result,
    }
}
