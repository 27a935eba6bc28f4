use std::time::Duration;

/// Key/value store for serialized responses.
pub trait ResponseCache: Send + Sync {
    /// Returns the live value stored under `key`.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Stores `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: serde_json::Value, ttl: Duration);

    /// Removes every key matching `pattern`, where `*` matches any run of
    /// characters. Returns the number of removed entries.
    fn invalidate(&self, pattern: &str) -> usize;
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl ResponseCache for NoopCache {
    fn get(&self, _key: &str) -> Option<serde_json::Value> {
        None
    }

    fn set(&self, _key: &str, _value: serde_json::Value, _ttl: Duration) {}

    fn invalidate(&self, _pattern: &str) -> usize {
        0
    }
}
