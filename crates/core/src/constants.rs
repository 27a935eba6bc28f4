/// Trading days used to annualize daily volatility
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Calendar days used to annualize cumulative returns
pub const DAYS_PER_YEAR: u32 = 365;

/// Decimal precision for reported metrics
pub const DECIMAL_PRECISION: u32 = 6;

/// Default time-to-live for memoized cohort responses, in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Namespace prefix for all performance cache keys
pub const PERFORMANCE_CACHE_PREFIX: &str = "performance";

/// Default entry bound for the in-memory response cache
pub const DEFAULT_CACHE_CAPACITY: u64 = 1_000;
