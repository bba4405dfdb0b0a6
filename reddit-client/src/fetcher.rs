use crate::api::RedditPostData;
use async_trait::async_trait;
use threadpulse_core::{CoreError, SearchRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentQuery {
    Trending,
    Search(SearchRequest),
}

/// Source of raw post records. Implementations report transport, status and
/// payload failures as errors and never retry.
#[async_trait]
pub trait RemoteContentFetcher: Send + Sync {
    async fn fetch(&self, query: &ContentQuery) -> Result<Vec<RedditPostData>, CoreError>;
}

/// Source of comment bodies for a post, already filtered to bodies long
/// enough to score.
#[async_trait]
pub trait CommentFetcher: Send + Sync {
    async fn fetch_comments(&self, permalink: &str) -> Result<Vec<String>, CoreError>;
}
