//! Tunables for the performance engine.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DAYS_PER_YEAR, DEFAULT_CACHE_TTL_SECS, TRADING_DAYS_PER_YEAR};
use crate::portfolio::performance::ReseedPolicy;

/// Settings shared by the aggregator and the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceSettings {
    /// Periods per year used to annualize daily volatility
    pub trading_days_per_year: u32,
    /// Calendar days per year used to annualize cumulative returns
    pub days_per_year: u32,
    /// Annual risk-free rate subtracted in the Sharpe ratio
    pub risk_free_rate: Decimal,
    pub cache_ttl_secs: u64,
    pub reseed_policy: ReseedPolicy,
    /// Upper bound on worker threads for cohort runs. `None` uses the
    /// global rayon pool.
    pub max_parallelism: Option<usize>,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            days_per_year: DAYS_PER_YEAR,
            risk_free_rate: Decimal::ZERO,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            reseed_policy: ReseedPolicy::default(),
            max_parallelism: None,
        }
    }
}

impl PerformanceSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
