use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use threadpulse_core::{Post, DEFAULT_PAGE_SIZE};
use tokio::sync::RwLock;
use tracing::debug;

/// An item the cache can de-duplicate and rank.
pub trait Cacheable: Clone {
    fn cache_id(&self) -> &str;

    /// Higher ranks are returned first.
    fn rank(&self) -> i64;

    fn stamp(&mut self, _fetched_at: DateTime<Utc>) {}
}

impl Cacheable for Post {
    fn cache_id(&self) -> &str {
        &self.external_id
    }

    fn rank(&self) -> i64 {
        self.upvotes
    }

    fn stamp(&mut self, fetched_at: DateTime<Utc>) {
        self.fetched_at = Some(fetched_at);
    }
}

/// A snapshot of one partition: its ranked page of items and write time.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub items: Vec<T>,
    pub fetched_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        is_fresh(self.fetched_at, now, ttl)
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.fetched_at)
    }
}

/// Fresh while `now - fetched_at < ttl`.
pub fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match chrono::Duration::from_std(ttl) {
        Ok(ttl) => now.signed_duration_since(fetched_at) < ttl,
        Err(_) => true,
    }
}

#[derive(Debug)]
struct StoredEntry<T> {
    /// De-duplicated by id, in first-insertion order.
    items: Vec<T>,
    fetched_at: DateTime<Utc>,
}

/// Keyed store of fetched item lists. Writes replace a partition wholesale
/// and concurrent writers race with last-write-wins semantics.
#[derive(Debug)]
pub struct FreshnessCache<K, T> {
    entries: Arc<RwLock<HashMap<K, StoredEntry<T>>>>,
    page_size: usize,
}

impl<K, T> Clone for FreshnessCache<K, T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            page_size: self.page_size,
        }
    }
}

impl<K, T> Default for FreshnessCache<K, T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<K, T> FreshnessCache<K, T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            page_size,
        }
    }
}

impl<K, T> FreshnessCache<K, T>
where
    K: Eq + Hash + Display,
    T: Cacheable,
{
    pub async fn get(&self, key: &K) -> Option<CacheEntry<T>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(stored) => {
                debug!("Cache hit for {}", key);
                Some(CacheEntry {
                    items: self.ranked_page(&stored.items),
                    fetched_at: stored.fetched_at,
                })
            }
            None => {
                debug!("Cache miss for {}", key);
                None
            }
        }
    }

    pub async fn put(&self, key: K, items: Vec<T>) -> CacheEntry<T> {
        self.put_at(key, items, Utc::now()).await
    }

    /// Replaces the partition under `key`, stamping every item with `fetched_at`.
    pub async fn put_at(&self, key: K, items: Vec<T>, fetched_at: DateTime<Utc>) -> CacheEntry<T> {
        let mut deduped: Vec<T> = Vec::with_capacity(items.len());
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(items.len());

        for mut item in items {
            item.stamp(fetched_at);
            match positions.get(item.cache_id()) {
                Some(&index) => deduped[index] = item,
                None => {
                    positions.insert(item.cache_id().to_string(), deduped.len());
                    deduped.push(item);
                }
            }
        }

        let page = self.ranked_page(&deduped);
        debug!("Caching {} items under {}", deduped.len(), key);

        let mut entries = self.entries.write().await;
        entries.remove(&key);
        entries.insert(
            key,
            StoredEntry {
                items: deduped,
                fetched_at,
            },
        );

        CacheEntry {
            items: page,
            fetched_at,
        }
    }

    /// Removes the partition. Returns whether anything was stored.
    pub async fn clear(&self, key: &K) -> bool {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            debug!("Cleared cache entry {}", key);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn ranked_page(&self, items: &[T]) -> Vec<T> {
        let mut ranked = items.to_vec();
        ranked.sort_by(|a, b| b.rank().cmp(&a.rank()));
        ranked.truncate(self.page_size);
        ranked
    }
}
