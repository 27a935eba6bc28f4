use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::benchmark_simulator::{simulate_benchmark_with, BenchmarkOptions};
use super::performance_model::{
    AccountPerformance, AccountSummaryRow, BenchmarkPerformance, CohortPerformance, CohortTotals,
    DailyMetric, PerformancePeriod, PerformanceSummary,
};
use super::performance_summary::summarize_with;
use super::twr_calculator::compute_daily_metrics;
use crate::accounts::{Account, AccountRepositoryTrait};
use crate::cache::{CacheKey, ResponseCache};
use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};
use crate::portfolio::snapshot::{
    is_strictly_ascending, net_cash_flow, EquitySnapshot, SnapshotRepositoryTrait,
};
use crate::quotes::{PriceRepositoryTrait, PriceSeries};
use crate::settings::PerformanceSettings;
use crate::utils::time_utils::{previous_day, prior_year_end, year_bounds};

#[async_trait]
pub trait PerformanceServiceTrait: Send + Sync {
    /// Computes the daily TWR series and summary for one account.
    ///
    /// Args:
    ///     account_id: The account to report on.
    ///     period: Reporting window.
    ///
    /// Returns:
    ///     Oldest-first metrics. An account without snapshots yields an empty
    ///     series and an empty summary.
    async fn calculate_account_performance(
        &self,
        account_id: &str,
        period: PerformancePeriod,
    ) -> Result<AccountPerformance>;

    /// Replays the account's cash flows into `symbol`.
    ///
    /// When `symbol` is `None` the account's own benchmark symbol is used;
    /// an account without one is a validation error.
    async fn calculate_benchmark_performance(
        &self,
        account_id: &str,
        symbol: Option<&str>,
        period: PerformancePeriod,
    ) -> Result<BenchmarkPerformance>;

    /// Computes summary rows for many accounts at once.
    ///
    /// An empty `account_ids` means every active account. Rows are sorted by
    /// account id and match the single-account results exactly. The result is
    /// memoized through the response cache.
    async fn calculate_cohort_performance(
        &self,
        account_ids: &[String],
        benchmark_symbol: Option<&str>,
        period: PerformancePeriod,
    ) -> Result<CohortPerformance>;

    /// Drops cached cohorts simulated against `symbol`. Call after a price write.
    fn invalidate_symbol(&self, symbol: &str) -> usize;

    /// Drops cached cohorts containing any of the accounts. Call after a
    /// snapshot write.
    fn invalidate_accounts(&self, account_ids: &[String]) -> usize;
}

/// Everything one account contributes to a calculation, loaded up front so
/// the math can run off the async runtime.
#[derive(Debug, Clone)]
struct AccountInputs {
    account: Account,
    snapshots: Vec<EquitySnapshot>,
    /// Equity the first return in the window is measured against
    initial_equity: Decimal,
    /// Date the benchmark base price is taken on, `None` for the first snapshot
    base_date: Option<NaiveDate>,
}

/// Inclusive snapshot window plus the day the opening equity is read on.
struct PeriodWindow {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    opening_date: Option<NaiveDate>,
}

pub struct PerformanceService {
    account_repository: Arc<dyn AccountRepositoryTrait>,
    snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
    cache: Arc<dyn ResponseCache>,
    settings: PerformanceSettings,
    thread_pool: Option<Arc<rayon::ThreadPool>>,
}

impl PerformanceService {
    pub fn new(
        account_repository: Arc<dyn AccountRepositoryTrait>,
        snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
        cache: Arc<dyn ResponseCache>,
        settings: PerformanceSettings,
    ) -> Self {
        let thread_pool = settings.max_parallelism.and_then(|threads| {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(threads.max(1))
                .thread_name(|i| format!("performance-{}", i))
                .build()
            {
                Ok(pool) => Some(Arc::new(pool)),
                Err(e) => {
                    warn!(
                        "Failed to build a {}-thread pool, using the global pool: {}",
                        threads, e
                    );
                    None
                }
            }
        });

        Self {
            account_repository,
            snapshot_repository,
            price_repository,
            cache,
            settings,
            thread_pool,
        }
    }

    fn resolve_window(period: &PerformancePeriod) -> Result<PeriodWindow> {
        match *period {
            PerformancePeriod::SinceInception => Ok(PeriodWindow {
                start: None,
                end: None,
                opening_date: None,
            }),
            PerformancePeriod::Year { year } => {
                let out_of_range =
                    || ValidationError::InvalidInput(format!("Year {} is out of range", year));
                let (start, end) = year_bounds(year).ok_or_else(out_of_range)?;
                let opening_date = prior_year_end(year).ok_or_else(out_of_range)?;
                Ok(PeriodWindow {
                    start: Some(start),
                    end: Some(end),
                    opening_date: Some(opening_date),
                })
            }
            PerformancePeriod::Range { start, end } => {
                if start > end {
                    return Err(ValidationError::InvalidInput(format!(
                        "Range start {} is after end {}",
                        start, end
                    ))
                    .into());
                }
                Ok(PeriodWindow {
                    start: Some(start),
                    end: Some(end),
                    opening_date: Some(previous_day(start)),
                })
            }
        }
    }

    fn load_inputs(&self, account: Account, window: &PeriodWindow) -> Result<AccountInputs> {
        account.validate()?;

        let mut snapshots = self.snapshot_repository.get_snapshots_by_account(
            &account.id,
            window.start,
            window.end,
        )?;
        if !is_strictly_ascending(&snapshots) {
            warn!(
                "Snapshots for account {} are not strictly ascending, re-sorting",
                account.id
            );
            snapshots.sort_by_key(|s| s.date);
            // keep the last row for a repeated date
            snapshots.reverse();
            snapshots.dedup_by_key(|s| s.date);
            snapshots.reverse();
        }

        let (initial_equity, base_date) = match window.opening_date {
            None => (account.initial_equity, None),
            Some(opening_date) => match self
                .snapshot_repository
                .get_latest_snapshot_before_date(&account.id, opening_date)?
            {
                Some(opening) => (opening.net_equity, Some(opening_date)),
                // account opened inside the window
                None => (account.initial_equity, None),
            },
        };

        Ok(AccountInputs {
            account,
            snapshots,
            initial_equity,
            base_date,
        })
    }

    fn load_account(&self, account_id: &str, period: &PerformancePeriod) -> Result<AccountInputs> {
        let window = Self::resolve_window(period)?;
        let account = self.account_repository.get_by_id(account_id)?;
        self.load_inputs(account, &window)
    }

    fn load_prices(&self, symbol: &str, end_date: Option<NaiveDate>) -> Result<PriceSeries> {
        let points = self
            .price_repository
            .get_price_history(symbol, None, end_date)?;
        let series = PriceSeries::new(points);
        match series.last_date() {
            Some(last) => debug!("Loaded {} prices for {} through {}", series.len(), symbol, last),
            None => warn!("No price history for benchmark {}", symbol),
        }
        Ok(series)
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.cache.get(key)?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => self.cache.set(key, json, self.settings.cache_ttl()),
            Err(e) => warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }
}

fn account_metrics(
    inputs: &AccountInputs,
    settings: &PerformanceSettings,
) -> (Vec<DailyMetric>, PerformanceSummary) {
    let metrics = compute_daily_metrics(&inputs.snapshots, inputs.initial_equity);
    let summary = summarize_with(&metrics, inputs.initial_equity, settings);
    (metrics, summary)
}

fn benchmark_options(inputs: &AccountInputs, settings: &PerformanceSettings) -> BenchmarkOptions {
    BenchmarkOptions {
        start_date: inputs.base_date,
        reseed_policy: settings.reseed_policy,
    }
}

fn summarize_account(
    inputs: &AccountInputs,
    prices: Option<&PriceSeries>,
    settings: &PerformanceSettings,
) -> AccountSummaryRow {
    let (_, summary) = account_metrics(inputs, settings);

    let benchmark_summary = prices.map(|series| {
        let options = benchmark_options(inputs, settings);
        let metrics =
            simulate_benchmark_with(&inputs.snapshots, series, inputs.initial_equity, &options);
        summarize_with(&metrics, inputs.initial_equity, settings)
    });

    let last = inputs.snapshots.last();
    AccountSummaryRow {
        account_id: inputs.account.id.clone(),
        name: inputs.account.name.clone(),
        current_equity: last.map_or(inputs.initial_equity, |s| s.net_equity),
        cumulative_deposits: net_cash_flow(&inputs.snapshots),
        cash_balance: last.and_then(|s| s.cash_balance),
        summary,
        benchmark_summary,
    }
}

fn cohort_totals(rows: &[AccountSummaryRow]) -> CohortTotals {
    if rows.is_empty() {
        return CohortTotals::default();
    }

    let total_return: Decimal = rows.iter().map(|r| r.summary.return_percentage).sum();
    let best = rows.iter().max_by_key(|r| r.summary.return_percentage);
    let worst = rows.iter().min_by_key(|r| r.summary.return_percentage);

    CohortTotals {
        account_count: rows.len(),
        total_equity: rows.iter().map(|r| r.current_equity).sum(),
        total_deposits: rows.iter().map(|r| r.cumulative_deposits).sum(),
        total_cash_balance: rows.iter().filter_map(|r| r.cash_balance).sum(),
        average_return: (total_return / Decimal::from(rows.len())).round_dp(DECIMAL_PRECISION),
        best_account_id: best.map(|r| r.account_id.clone()),
        worst_account_id: worst.map(|r| r.account_id.clone()),
    }
}

#[async_trait]
impl PerformanceServiceTrait for PerformanceService {
    async fn calculate_account_performance(
        &self,
        account_id: &str,
        period: PerformancePeriod,
    ) -> Result<AccountPerformance> {
        let inputs = self.load_account(account_id, &period)?;
        let (daily_metrics, summary) = account_metrics(&inputs, &self.settings);

        debug!(
            "Account {} performance over {} days: {}",
            account_id,
            daily_metrics.len(),
            summary.return_percentage
        );

        Ok(AccountPerformance {
            account_id: inputs.account.id,
            period,
            initial_equity: inputs.initial_equity,
            daily_metrics,
            summary,
        })
    }

    async fn calculate_benchmark_performance(
        &self,
        account_id: &str,
        symbol: Option<&str>,
        period: PerformancePeriod,
    ) -> Result<BenchmarkPerformance> {
        let inputs = self.load_account(account_id, &period)?;
        let symbol = match symbol {
            Some(symbol) => symbol.to_string(),
            None => inputs.account.benchmark_symbol.clone().ok_or_else(|| {
                Error::Validation(ValidationError::MissingField("benchmarkSymbol".to_string()))
            })?,
        };

        let end_date = inputs.snapshots.last().map(|s| s.date);
        let prices = self.load_prices(&symbol, end_date)?;
        let options = benchmark_options(&inputs, &self.settings);

        let daily_metrics =
            simulate_benchmark_with(&inputs.snapshots, &prices, inputs.initial_equity, &options);
        let summary = summarize_with(&daily_metrics, inputs.initial_equity, &self.settings);

        Ok(BenchmarkPerformance {
            account_id: inputs.account.id,
            symbol,
            period,
            base_date: options
                .start_date
                .or_else(|| inputs.snapshots.first().map(|s| s.date)),
            daily_metrics,
            summary,
        })
    }

    async fn calculate_cohort_performance(
        &self,
        account_ids: &[String],
        benchmark_symbol: Option<&str>,
        period: PerformancePeriod,
    ) -> Result<CohortPerformance> {
        let window = Self::resolve_window(&period)?;

        let accounts = if account_ids.is_empty() {
            self.account_repository.list(Some(true), None)?
        } else {
            let unique: BTreeSet<&str> = account_ids.iter().map(String::as_str).collect();
            unique
                .into_iter()
                .map(|id| self.account_repository.get_by_id(id))
                .collect::<Result<Vec<_>>>()?
        };

        let resolved_ids: Vec<String> = accounts.iter().map(|a| a.id.clone()).collect();
        let cache_key = CacheKey::cohort(&resolved_ids, benchmark_symbol, &period);
        if let Some(cached) = self.cached::<CohortPerformance>(&cache_key) {
            debug!("Cohort cache hit for {}", cache_key);
            return Ok(cached);
        }

        let started = Instant::now();
        let inputs = accounts
            .into_iter()
            .map(|account| self.load_inputs(account, &window))
            .collect::<Result<Vec<_>>>()?;

        let prices = match benchmark_symbol {
            Some(symbol) => {
                let end_date = window.end.or_else(|| {
                    inputs
                        .iter()
                        .filter_map(|i| i.snapshots.last().map(|s| s.date))
                        .max()
                });
                Some(self.load_prices(symbol, end_date)?)
            }
            None => None,
        };

        let settings = self.settings.clone();
        let pool = self.thread_pool.clone();
        let account_count = inputs.len();
        let mut rows = tokio::task::spawn_blocking(move || {
            let run = || {
                inputs
                    .par_iter()
                    .map(|account_inputs| {
                        summarize_account(account_inputs, prices.as_ref(), &settings)
                    })
                    .collect::<Vec<_>>()
            };
            match pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        })
        .await?;

        rows.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        let totals = cohort_totals(&rows);

        debug!(
            "Computed cohort of {} accounts in {:?}",
            account_count,
            started.elapsed()
        );

        let result = CohortPerformance {
            period,
            benchmark_symbol: benchmark_symbol.map(str::to_string),
            accounts: rows,
            totals,
        };
        self.store(&cache_key, &result);
        Ok(result)
    }

    fn invalidate_symbol(&self, symbol: &str) -> usize {
        self.cache.invalidate(&CacheKey::symbol_pattern(symbol))
    }

    fn invalidate_accounts(&self, account_ids: &[String]) -> usize {
        account_ids
            .iter()
            .map(|id| self.cache.invalidate(&CacheKey::account_pattern(id)))
            .sum()
    }
}
