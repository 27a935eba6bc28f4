use crate::constants::PERFORMANCE_CACHE_PREFIX;
use crate::portfolio::performance::PerformancePeriod;

/// Builders for performance cache keys and invalidation patterns.
///
/// Cohort keys look like `performance:cohort:|a|b|:SPY:y2024`. Account ids are
/// sorted and fenced with `|` so a single id can be matched without matching
/// a prefix of another id.
pub struct CacheKey;

impl CacheKey {
    pub fn cohort(
        account_ids: &[String],
        benchmark_symbol: Option<&str>,
        period: &PerformancePeriod,
    ) -> String {
        let mut ids: Vec<&str> = account_ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids.dedup();

        format!(
            "{}:cohort:|{}|:{}:{}",
            PERFORMANCE_CACHE_PREFIX,
            ids.join("|"),
            benchmark_symbol.unwrap_or("none"),
            period.cache_label()
        )
    }

    /// Matches every cohort simulated against `symbol`.
    pub fn symbol_pattern(symbol: &str) -> String {
        format!("{}:cohort:*:{}:*", PERFORMANCE_CACHE_PREFIX, symbol)
    }

    /// Matches every cohort that includes `account_id`.
    pub fn account_pattern(account_id: &str) -> String {
        format!("{}:cohort:*|{}|*", PERFORMANCE_CACHE_PREFIX, account_id)
    }
}
