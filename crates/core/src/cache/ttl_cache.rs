//! In-memory response cache with per-entry TTL using moka

use std::time::{Duration, Instant};

use log::{debug, warn};
use moka::sync::Cache;
use moka::Expiry;
use regex::Regex;

use super::cache_traits::ResponseCache;
use crate::constants::DEFAULT_CACHE_CAPACITY;

#[derive(Debug, Clone)]
struct CachedResponse {
    value: serde_json::Value,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with.
struct ResponseExpiry;

impl Expiry<String, CachedResponse> for ResponseExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedResponse,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedResponse,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-memory cache.
///
/// Expired entries are never returned and are evicted by moka's own
/// housekeeping, so keys that are never read again do not accumulate.
pub struct TtlCache {
    entries: Cache<String, CachedResponse>,
}

impl TtlCache {
    /// Create a cache bounded by `DEFAULT_CACHE_CAPACITY`
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a cache holding at most `max_capacity` entries
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(ResponseExpiry)
                .build(),
        }
    }

    /// Number of live entries, after pending evictions have been applied.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache for TtlCache {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.get(key).map(|entry| entry.value)
    }

    fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        self.entries
            .insert(key.to_string(), CachedResponse { value, ttl });
    }

    fn invalidate(&self, pattern: &str) -> usize {
        let matcher = match glob_to_regex(pattern) {
            Ok(matcher) => matcher,
            Err(e) => {
                warn!("Ignoring invalid cache pattern '{}': {}", pattern, e);
                return 0;
            }
        };

        // Removed key by key so the count is exact and later reads miss.
        let keys: Vec<_> = self
            .entries
            .iter()
            .filter(|(key, _)| matcher.is_match(key))
            .map(|(key, _)| key)
            .collect();
        for key in &keys {
            self.entries.invalidate(key.as_str());
        }
        if !keys.is_empty() {
            debug!("Invalidated {} cache entries matching '{}'", keys.len(), pattern);
        }
        keys.len()
    }
}

/// Compiles a `*` glob into an anchored regex; every other character is literal.
fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{}$", escaped))
}
