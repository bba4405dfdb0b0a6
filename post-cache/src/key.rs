use std::fmt;
use threadpulse_core::{SearchRequest, SortBy, TimeFilter};

/// Partition key for a search. The topic is lower-cased so `Rust` and `rust`
/// share one partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    topic: String,
    sort_by: SortBy,
    time_filter: TimeFilter,
}

impl SearchKey {
    pub fn new(topic: &str, sort_by: SortBy, time_filter: TimeFilter) -> Self {
        Self {
            topic: topic.to_lowercase(),
            sort_by,
            time_filter,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl From<&SearchRequest> for SearchKey {
    fn from(request: &SearchRequest) -> Self {
        Self::new(request.topic(), request.sort_by, request.time_filter)
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.topic, self.sort_by, self.time_filter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The single global partition for the popular listing.
    Trending,
    Search(SearchKey),
}

impl From<SearchKey> for CacheKey {
    fn from(key: SearchKey) -> Self {
        CacheKey::Search(key)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Trending => f.write_str("trending"),
            CacheKey::Search(key) => write!(f, "search:{}", key),
        }
    }
}
