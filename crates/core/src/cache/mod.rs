//! Response cache for memoized performance results.
//!
//! The engine never owns a global cache: services receive an
//! `Arc<dyn ResponseCache>` from the host and invalidate it by pattern after
//! writes.

pub mod cache_keys;
pub mod cache_traits;
pub mod ttl_cache;

pub use cache_keys::CacheKey;
pub use cache_traits::{NoopCache, ResponseCache};
pub use ttl_cache::TtlCache;
