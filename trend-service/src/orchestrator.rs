//! Cache-first fetching with stale fallback.
//!
//! Every request walks the same path:
//!
//! ```text
//! CHECK_CACHE ── fresh ──────────────────────────────▶ FRESH_HIT
//!      │
//!      └─ stale/miss ─▶ FETCH_REMOTE ── ok ──────────▶ WRITE_AND_RETURN
//!                            │
//!                            └─ fail ─┬─ entry ─────▶ FALLBACK_STALE
//!                                     └─ no entry ──▶ FAIL
//! ```
//!
//! Only fetch failures (transport, HTTP status, malformed payload) take the
//! fallback branch. Any other error, such as a validation error or a bad
//! endpoint, is returned as is.
//!
//! An entry holding zero items still counts as present, so an empty result
//! can be a fresh hit or a stale fallback. Use
//! [`FreshnessCache::clear`](post_cache::FreshnessCache::clear) to make a key
//! miss again.
//!
//! Staleness is only evaluated when a request reads the cache. Concurrent
//! requests for the same key may each fetch; the last write wins.

use chrono::{DateTime, Utc};
use post_cache::{CacheEntry, Cacheable, FreshnessCache};
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use threadpulse_core::{CoreError, ErrorExt};
use tracing::{debug, info, warn};

pub const UNAVAILABLE_MESSAGE: &str = "Reddit API is currently unavailable. This may be due to network restrictions or rate limiting. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    FreshHit,
    Refreshed,
    StaleFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub fetched_at: DateTime<Utc>,
    pub source: FetchSource,
}

impl<T> Fetched<T> {
    fn from_entry(entry: CacheEntry<T>, source: FetchSource) -> Self {
        Self {
            items: entry.items,
            fetched_at: entry.fetched_at,
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOrchestrator<K, T> {
    cache: FreshnessCache<K, T>,
    ttl: Duration,
}

impl<K, T> FetchOrchestrator<K, T>
where
    K: Eq + Hash + Clone + Display,
    T: Cacheable,
{
    pub fn new(cache: FreshnessCache<K, T>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn cache(&self) -> &FreshnessCache<K, T> {
        &self.cache
    }

    /// Serves `key` from cache while fresh, otherwise fetches through `fetch`,
    /// normalizes each record, and writes the result back. A failed fetch
    /// falls back to whatever entry is cached, however old. Errors that are
    /// not fetch failures skip the fallback.
    pub async fn get_or_fetch<R, F, Fut, N>(
        &self,
        key: &K,
        fetch: F,
        normalize: N,
    ) -> Result<Fetched<T>, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<R>, CoreError>>,
        N: Fn(R) -> T,
    {
        if let Some(entry) = self.cache.get(key).await {
            if entry.is_fresh(Utc::now(), self.ttl) {
                debug!("Serving fresh cache for {}", key);
                return Ok(Fetched::from_entry(entry, FetchSource::FreshHit));
            }
            debug!("Cache entry for {} is stale", key);
        }

        match fetch().await {
            Ok(records) => Ok(self.write(key, records, normalize).await),
            Err(error) if !error.is_fetch_failure() => {
                error.log_error();
                Err(error)
            }
            Err(error) => {
                error.log_warn();
                match self.cache.get(key).await {
                    Some(entry) => {
                        warn!(
                            "Remote fetch failed for {}, serving cache from {}",
                            key, entry.fetched_at
                        );
                        Ok(Fetched::from_entry(entry, FetchSource::StaleFallback))
                    }
                    None => {
                        warn!("Remote fetch failed for {} with nothing cached", key);
                        Err(unavailable())
                    }
                }
            }
        }
    }

    /// Drops the cached entry and fetches unconditionally. Never falls back,
    /// since the only cache it could return is the one it just cleared.
    pub async fn force_refresh<R, F, Fut, N>(
        &self,
        key: &K,
        fetch: F,
        normalize: N,
    ) -> Result<Fetched<T>, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<R>, CoreError>>,
        N: Fn(R) -> T,
    {
        self.cache.clear(key).await;

        match fetch().await {
            Ok(records) => Ok(self.write(key, records, normalize).await),
            Err(error) if !error.is_fetch_failure() => {
                error.log_error();
                Err(error)
            }
            Err(error) => {
                error.log_warn();
                warn!("Forced refresh failed for {}", key);
                Err(unavailable())
            }
        }
    }

    async fn write<R, N>(&self, key: &K, records: Vec<R>, normalize: N) -> Fetched<T>
    where
        N: Fn(R) -> T,
    {
        let items: Vec<T> = records.into_iter().map(normalize).collect();
        let count = items.len();
        let entry = self.cache.put(key.clone(), items).await;
        info!("Refreshed {} with {} items", key, count);
        Fetched::from_entry(entry, FetchSource::Refreshed)
    }
}

fn unavailable() -> CoreError {
    CoreError::ServiceUnavailable {
        message: UNAVAILABLE_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use post_cache::{CacheKey, PostCache};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use threadpulse_core::{Post, RedditApiError};

    const TTL: Duration = Duration::from_secs(300);

    fn post(id: &str, upvotes: i64) -> Post {
        Post {
            external_id: id.to_string(),
            title: format!("Post {}", id),
            author: "tester".to_string(),
            subreddit: "test".to_string(),
            upvotes,
            comment_count: 0,
            permalink: format!("https://reddit.com/r/test/comments/{}", id),
            created_at: 1640995200,
            fetched_at: None,
        }
    }

    fn failure() -> CoreError {
        CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 })
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_fetch() {
        let orchestrator = FetchOrchestrator::new(PostCache::default(), TTL);
        orchestrator
            .cache()
            .put(CacheKey::Trending, vec![post("cached", 1)])
            .await;
        let calls = AtomicUsize::new(0);

        let fetched = orchestrator
            .get_or_fetch(
                &CacheKey::Trending,
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![post("remote", 2)])
                },
                |p: Post| p,
            )
            .await
            .unwrap();

        assert_eq!(fetched.source, FetchSource::FreshHit);
        assert_eq!(fetched.items[0].external_id, "cached");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let orchestrator = FetchOrchestrator::new(PostCache::default(), TTL);
        orchestrator
            .cache()
            .put_at(
                CacheKey::Trending,
                vec![post("old", 1)],
                Utc::now() - ChronoDuration::seconds(301),
            )
            .await;

        let fetched = orchestrator
            .get_or_fetch(
                &CacheKey::Trending,
                || async { Ok(vec![post("new", 2)]) },
                |p: Post| p,
            )
            .await
            .unwrap();

        assert_eq!(fetched.source, FetchSource::Refreshed);
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].external_id, "new");
        assert!(fetched.items[0].fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_stale_fallback_on_failure() {
        let orchestrator = FetchOrchestrator::new(PostCache::default(), TTL);
        let written_at = Utc::now() - ChronoDuration::hours(2);
        orchestrator
            .cache()
            .put_at(
                CacheKey::Trending,
                vec![post("a", 5), post("b", 9)],
                written_at,
            )
            .await;
        let before = orchestrator.cache().get(&CacheKey::Trending).await.unwrap();

        let fetched = orchestrator
            .get_or_fetch(
                &CacheKey::Trending,
                || async { Err::<Vec<Post>, _>(failure()) },
                |p: Post| p,
            )
            .await
            .unwrap();

        assert_eq!(fetched.source, FetchSource::StaleFallback);
        assert_eq!(fetched.items, before.items);
        assert_eq!(fetched.fetched_at, written_at);
    }

    #[tokio::test]
    async fn test_failure_without_cache_is_unavailable() {
        let orchestrator: FetchOrchestrator<CacheKey, Post> =
            FetchOrchestrator::new(PostCache::default(), TTL);

        let result = orchestrator
            .get_or_fetch(
                &CacheKey::Trending,
                || async { Err::<Vec<Post>, _>(failure()) },
                |p: Post| p,
            )
            .await;

        assert!(matches!(
            result,
            Err(CoreError::ServiceUnavailable { ref message }) if message == UNAVAILABLE_MESSAGE
        ));
    }

    #[tokio::test]
    async fn test_force_refresh_fetches_even_when_fresh() {
        let orchestrator = FetchOrchestrator::new(PostCache::default(), TTL);
        orchestrator
            .cache()
            .put(CacheKey::Trending, vec![post("cached", 1)])
            .await;

        let fetched = orchestrator
            .force_refresh(
                &CacheKey::Trending,
                || async { Ok(vec![post("remote", 2)]) },
                |p: Post| p,
            )
            .await
            .unwrap();

        assert_eq!(fetched.source, FetchSource::Refreshed);
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].external_id, "remote");
    }

    #[tokio::test]
    async fn test_force_refresh_failure_clears_and_fails() {
        let orchestrator = FetchOrchestrator::new(PostCache::default(), TTL);
        orchestrator
            .cache()
            .put(CacheKey::Trending, vec![post("cached", 1)])
            .await;

        let result = orchestrator
            .force_refresh(
                &CacheKey::Trending,
                || async { Err::<Vec<Post>, _>(failure()) },
                |p: Post| p,
            )
            .await;

        assert!(matches!(result, Err(CoreError::ServiceUnavailable { .. })));
        assert!(orchestrator.cache().get(&CacheKey::Trending).await.is_none());
    }

    #[tokio::test]
    async fn test_validation_error_skips_stale_fallback() {
        let orchestrator = FetchOrchestrator::new(PostCache::default(), TTL);
        orchestrator
            .cache()
            .put_at(
                CacheKey::Trending,
                vec![post("old", 1)],
                Utc::now() - ChronoDuration::hours(1),
            )
            .await;

        let result = orchestrator
            .get_or_fetch(
                &CacheKey::Trending,
                || async {
                    Err::<Vec<Post>, _>(CoreError::Validation {
                        field: "topic".to_string(),
                        message: "Topic is required".to_string(),
                    })
                },
                |p: Post| p,
            )
            .await;

        assert!(matches!(result, Err(CoreError::Validation { ref field, .. }) if field == "topic"));
        assert!(orchestrator.cache().get(&CacheKey::Trending).await.is_some());
    }

    #[tokio::test]
    async fn test_internal_error_is_not_reported_as_unavailable() {
        let orchestrator: FetchOrchestrator<CacheKey, Post> =
            FetchOrchestrator::new(PostCache::default(), TTL);
        let internal = || async {
            Err::<Vec<Post>, _>(CoreError::Internal {
                message: "Invalid API base URL".to_string(),
            })
        };

        let result = orchestrator
            .get_or_fetch(&CacheKey::Trending, internal, |p: Post| p)
            .await;
        assert!(matches!(result, Err(CoreError::Internal { .. })));

        let result = orchestrator
            .force_refresh(&CacheKey::Trending, internal, |p: Post| p)
            .await;
        assert!(matches!(result, Err(CoreError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_malformed_payload_still_falls_back() {
        let orchestrator = FetchOrchestrator::new(PostCache::default(), TTL);
        orchestrator
            .cache()
            .put_at(
                CacheKey::Trending,
                vec![post("old", 1)],
                Utc::now() - ChronoDuration::hours(1),
            )
            .await;

        let fetched = orchestrator
            .get_or_fetch(
                &CacheKey::Trending,
                || async {
                    Err::<Vec<Post>, _>(CoreError::RedditApi(RedditApiError::InvalidResponse {
                        details: "Failed to parse response from /r/popular.json".to_string(),
                    }))
                },
                |p: Post| p,
            )
            .await
            .unwrap();

        assert_eq!(fetched.source, FetchSource::StaleFallback);
    }

    #[tokio::test]
    async fn test_empty_entry_counts_as_present() {
        let orchestrator = FetchOrchestrator::new(PostCache::default(), TTL);
        orchestrator
            .cache()
            .put_at(
                CacheKey::Trending,
                Vec::new(),
                Utc::now() - ChronoDuration::hours(1),
            )
            .await;

        let fetched = orchestrator
            .get_or_fetch(
                &CacheKey::Trending,
                || async { Err::<Vec<Post>, _>(failure()) },
                |p: Post| p,
            )
            .await
            .unwrap();

        assert_eq!(fetched.source, FetchSource::StaleFallback);
        assert!(fetched.items.is_empty());
    }

    #[tokio::test]
    async fn test_normalize_applied_before_write() {
        let orchestrator = FetchOrchestrator::new(PostCache::default(), TTL);

        let fetched = orchestrator
            .get_or_fetch(
                &CacheKey::Trending,
                || async { Ok(vec![("x", 3), ("y", 8)]) },
                |(id, ups): (&str, i64)| post(id, ups),
            )
            .await
            .unwrap();

        let ids: Vec<&str> = fetched.items.iter().map(|p| p.external_id.as_str()).collect();
        assert_eq!(ids, vec!["y", "x"]);
    }
}
