pub mod cache;
pub mod key;

pub use cache::{is_fresh, CacheEntry, Cacheable, FreshnessCache};
pub use key::{CacheKey, SearchKey};

/// The cache shape shared by the trending and search endpoints.
pub type PostCache = FreshnessCache<CacheKey, threadpulse_core::Post>;
