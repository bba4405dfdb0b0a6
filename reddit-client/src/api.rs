use crate::fetcher::{CommentFetcher, ContentQuery, RemoteContentFetcher};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use threadpulse_core::{AppConfig, CoreError, Post, RedditApiError, SearchRequest, TimeFilter};
use tracing::{debug, error, info, warn};
use url::Url;

pub const REDDIT_PERMALINK_BASE: &str = "https://reddit.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    #[serde(default)]
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    #[serde(default)]
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub author: String,
    pub subreddit: String,
    pub ups: i64,
    pub num_comments: i64,
    pub permalink: String,
    pub created_utc: f64,
    #[serde(default)]
    pub selftext: String,
}

impl RedditPostData {
    /// Normalizes into a [`Post`], prefixing relative permalinks with `permalink_base`.
    pub fn into_post(self, permalink_base: &str) -> Post {
        let permalink = if self.permalink.starts_with('/') {
            format!("{}{}", permalink_base.trim_end_matches('/'), self.permalink)
        } else {
            self.permalink
        };

        Post {
            external_id: self.id,
            title: self.title,
            author: self.author,
            subreddit: self.subreddit,
            upvotes: self.ups,
            comment_count: self.num_comments,
            permalink,
            created_at: self.created_utc as i64,
            fetched_at: None,
        }
    }

    fn mentions(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.subreddit.to_lowercase().contains(needle)
            || self.selftext.to_lowercase().contains(needle)
    }
}

/// Converts against the public [`REDDIT_PERMALINK_BASE`]. Use
/// [`RedditPostData::into_post`] to honour a configured base.
impl From<RedditPostData> for Post {
    fn from(post_data: RedditPostData) -> Self {
        post_data.into_post(REDDIT_PERMALINK_BASE)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CommentData {
    #[serde(default)]
    body: Option<String>,
    /// Reddit sends an empty string instead of a listing when there are no replies.
    #[serde(default)]
    replies: serde_json::Value,
}

/// Keeps only records whose title, subreddit, or body mention `term`,
/// ignoring case.
pub fn filter_by_term(posts: Vec<RedditPostData>, term: &str) -> Vec<RedditPostData> {
    let needle = term.to_lowercase();
    posts.into_iter().filter(|p| p.mentions(&needle)).collect()
}

/// Applies the term filter to full-text searches. Subreddit listings
/// (`r/<name>`) are returned as listed.
pub fn filter_for_request(
    request: &SearchRequest,
    posts: Vec<RedditPostData>,
) -> Vec<RedditPostData> {
    if request.channel().is_some() {
        return posts;
    }

    let before = posts.len();
    let filtered = filter_by_term(posts, request.topic());
    debug!(
        "Search term filter kept {}/{} posts for \"{}\"",
        filtered.len(),
        before,
        request.topic()
    );
    filtered
}

/// Walks comment listings depth-first, collecting `t1` bodies with at least
/// `min_length` characters until `limit` bodies are gathered.
pub fn collect_comment_bodies(
    listings: &[RedditListing<serde_json::Value>],
    min_length: usize,
    limit: usize,
) -> Vec<String> {
    let mut bodies = Vec::new();
    for listing in listings {
        walk_comments(&listing.data.children, min_length, limit, &mut bodies);
    }
    bodies
}

fn walk_comments(
    children: &[RedditListingChild<serde_json::Value>],
    min_length: usize,
    limit: usize,
    bodies: &mut Vec<String>,
) {
    for child in children {
        if bodies.len() >= limit {
            return;
        }
        if child.kind != "t1" {
            continue;
        }
        let Ok(comment) = serde_json::from_value::<CommentData>(child.data.clone()) else {
            continue;
        };

        if let Some(body) = comment.body {
            if body.chars().count() >= min_length {
                bodies.push(body);
            }
        }

        if comment.replies.is_object() {
            if let Ok(replies) =
                serde_json::from_value::<RedditListing<serde_json::Value>>(comment.replies)
            {
                walk_comments(&replies.data.children, min_length, limit, bodies);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedditApiClient {
    http_client: Client,
    api_base: String,
    page_size: usize,
    min_comment_length: usize,
    comment_limit: usize,
}

impl RedditApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http_client,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            min_comment_length: config.min_comment_length,
            comment_limit: config.comment_limit,
        })
    }

    /// Builds the listing URL for a query. Channel-scoped searches (`r/<name>`)
    /// go to the subreddit listing instead of full-text search.
    pub fn listing_url(&self, query: &ContentQuery) -> Result<Url, CoreError> {
        let limit = self.page_size.to_string();
        match query {
            ContentQuery::Trending => {
                let mut url = self.endpoint(&["r", "popular.json"])?;
                url.query_pairs_mut().append_pair("limit", &limit);
                Ok(url)
            }
            ContentQuery::Search(request) => {
                let mut url = match request.channel() {
                    Some(channel) => {
                        let listing = format!("{}.json", request.sort_by);
                        self.endpoint(&["r", channel, listing.as_str()])?
                    }
                    None => {
                        let mut url = self.endpoint(&["search.json"])?;
                        url.query_pairs_mut()
                            .append_pair("q", request.topic())
                            .append_pair("sort", request.sort_by.as_str());
                        url
                    }
                };
                url.query_pairs_mut().append_pair("limit", &limit);
                if request.time_filter != TimeFilter::All {
                    url.query_pairs_mut()
                        .append_pair("t", request.time_filter.as_str());
                }
                Ok(url)
            }
        }
    }

    pub fn comments_url(&self, permalink: &str) -> Result<Url, CoreError> {
        let trimmed = permalink.trim().trim_end_matches('/');
        let raw = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            format!("{}.json", trimmed)
        } else {
            format!("{}/{}.json", self.api_base, trimmed.trim_start_matches('/'))
        };

        let mut url = Url::parse(&raw).map_err(|e| CoreError::Validation {
            field: "permalink".to_string(),
            message: format!("'{}' is not a valid permalink: {}", permalink, e),
        })?;
        url.query_pairs_mut()
            .append_pair("limit", &self.comment_limit.to_string());
        Ok(url)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CoreError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| CoreError::Internal {
            message: format!("Invalid API base URL {}: {}", self.api_base, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| CoreError::Internal {
                message: format!("API base URL {} cannot carry a path", self.api_base),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CoreError> {
        let endpoint = url.path().to_string();
        info!("Making Reddit API request: GET {}", endpoint);

        let response = self
            .http_client
            .get(url)
            .header("Accept", "application/json")
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .map_err(|e| {
                error!("Network error for GET {}: {}", endpoint, e);
                if e.is_timeout() {
                    CoreError::RedditApi(RedditApiError::RequestTimeout)
                } else {
                    CoreError::Network(e)
                }
            })?;

        let response = check_status(response, &endpoint)?;
        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse response from {}: {}", endpoint, e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse response from {}", endpoint),
            })
        })
    }

    pub async fn get_popular(&self) -> Result<Vec<RedditPostData>, CoreError> {
        let url = self.listing_url(&ContentQuery::Trending)?;
        let listing: RedditListing<RedditPostData> = self.get_json(url).await?;
        let posts = unwrap_children(listing);
        info!("Retrieved {} popular posts", posts.len());
        Ok(posts)
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<RedditPostData>, CoreError> {
        let query = ContentQuery::Search(request.clone());
        let url = self.listing_url(&query)?;
        let listing: RedditListing<RedditPostData> = self.get_json(url).await?;
        let posts = filter_for_request(request, unwrap_children(listing));

        info!(
            "Retrieved {} posts for \"{}\" ({}, {})",
            posts.len(),
            request.topic(),
            request.sort_by,
            request.time_filter
        );
        Ok(posts)
    }

    pub async fn get_comments(&self, permalink: &str) -> Result<Vec<String>, CoreError> {
        let url = self.comments_url(permalink)?;
        let listings: Vec<RedditListing<serde_json::Value>> = self.get_json(url).await?;
        let bodies = collect_comment_bodies(&listings, self.min_comment_length, self.comment_limit);
        info!("Retrieved {} comments for {}", bodies.len(), permalink);
        Ok(bodies)
    }
}

fn unwrap_children<T>(listing: RedditListing<T>) -> Vec<T> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .collect()
}

fn check_status(response: Response, endpoint: &str) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        debug!("Request successful: {} {}", status, endpoint);
        return Ok(response);
    }

    error!("Request failed with status: {} for {}", status, endpoint);
    let error = match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        StatusCode::FORBIDDEN => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        StatusCode::NOT_FOUND => RedditApiError::NotFound {
            resource: endpoint.to_string(),
        },
        s if s.is_server_error() => RedditApiError::ServerError {
            status_code: s.as_u16(),
        },
        s => RedditApiError::HttpStatus {
            status_code: s.as_u16(),
            message: s.canonical_reason().unwrap_or("Unknown").to_string(),
        },
    };
    Err(CoreError::RedditApi(error))
}

#[async_trait]
impl RemoteContentFetcher for RedditApiClient {
    async fn fetch(&self, query: &ContentQuery) -> Result<Vec<RedditPostData>, CoreError> {
        match query {
            ContentQuery::Trending => self.get_popular().await,
            ContentQuery::Search(request) => self.search(request).await,
        }
    }
}

#[async_trait]
impl CommentFetcher for RedditApiClient {
    async fn fetch_comments(&self, permalink: &str) -> Result<Vec<String>, CoreError> {
        self.get_comments(permalink).await
    }
}
