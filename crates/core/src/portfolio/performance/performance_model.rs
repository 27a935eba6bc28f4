use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-day output of the time-weighted return recurrence.
///
/// Derived on every request and never persisted. Each entry is produced once
/// from the previous day's `nav_ratio`/`running_peak` and the current snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub equity: Decimal,
    pub deposit: Decimal,
    /// Deposit-neutral return for the day
    pub daily_return: Decimal,
    /// Growth of one unit invested at the start of the series
    pub nav_ratio: Decimal,
    pub running_peak: Decimal,
    /// Decline from `running_peak`, always <= 0
    pub drawdown: Decimal,
    pub is_new_high: bool,
}

/// A day of a simulated benchmark position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkMetric {
    #[serde(flatten)]
    pub metric: DailyMetric,
    /// Close used for the day, `None` while no price has been observed yet
    pub close_price: Option<Decimal>,
    /// Synthetic share position after the day's cash flow
    pub shares: Decimal,
}

impl AsRef<DailyMetric> for DailyMetric {
    fn as_ref(&self) -> &DailyMetric {
        self
    }
}

impl AsRef<DailyMetric> for BenchmarkMetric {
    fn as_ref(&self) -> &DailyMetric {
        &self.metric
    }
}

/// Summary statistics reduced from a daily metric series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days_elapsed: i64,
    /// Cumulative time-weighted return (last NAV ratio - 1)
    pub return_percentage: Decimal,
    /// Most negative drawdown in the series
    pub max_drawdown: Decimal,
    pub annualized_return: Decimal,
    pub annualized_std_dev: Decimal,
    pub sharpe_ratio: Decimal,
    pub new_high_count: u32,
    pub new_high_freq: Decimal,
    /// Final equity minus opening equity minus net deposits
    pub gain_loss_amount: Decimal,
}

impl PerformanceSummary {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Reporting window for a performance request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PerformancePeriod {
    /// Every snapshot, seeded with the account's declared starting capital
    #[default]
    SinceInception,
    /// One calendar year, seeded with the equity at the prior year end
    Year { year: i32 },
    /// Inclusive date range, seeded with the equity on the day before `start`
    Range { start: NaiveDate, end: NaiveDate },
}

impl PerformancePeriod {
    pub fn year(year: i32) -> Self {
        PerformancePeriod::Year { year }
    }

    /// Stable label used in cache keys.
    pub fn cache_label(&self) -> String {
        match self {
            PerformancePeriod::SinceInception => "inception".to_string(),
            PerformancePeriod::Year { year } => format!("y{}", year),
            PerformancePeriod::Range { start, end } => format!("r{}..{}", start, end),
        }
    }
}

/// Ordering of a daily series handed to a caller.
///
/// Engine functions always produce oldest-first. Tables show newest-first,
/// charts consume oldest-first; each call site picks one explicitly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SeriesOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Re-orders an oldest-first series for a caller.
pub fn order_series<T>(mut series: Vec<T>, order: SeriesOrder) -> Vec<T> {
    if order == SeriesOrder::NewestFirst {
        series.reverse();
    }
    series
}

/// Full performance history for one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountPerformance {
    pub account_id: String,
    pub period: PerformancePeriod,
    pub initial_equity: Decimal,
    /// Oldest-first
    pub daily_metrics: Vec<DailyMetric>,
    pub summary: PerformanceSummary,
}

/// Benchmark simulation for one account against one instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkPerformance {
    pub account_id: String,
    pub symbol: String,
    pub period: PerformancePeriod,
    pub base_date: Option<NaiveDate>,
    /// Oldest-first
    pub daily_metrics: Vec<BenchmarkMetric>,
    pub summary: PerformanceSummary,
}

/// One account's line in a cohort report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummaryRow {
    pub account_id: String,
    pub name: String,
    pub current_equity: Decimal,
    /// Net deposits over the reported period
    pub cumulative_deposits: Decimal,
    pub cash_balance: Option<Decimal>,
    pub summary: PerformanceSummary,
    pub benchmark_summary: Option<PerformanceSummary>,
}

/// Cross-account aggregates for a cohort report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CohortTotals {
    pub account_count: usize,
    pub total_equity: Decimal,
    pub total_deposits: Decimal,
    pub total_cash_balance: Decimal,
    /// Unweighted mean of the accounts' cumulative returns
    pub average_return: Decimal,
    pub best_account_id: Option<String>,
    pub worst_account_id: Option<String>,
}

/// Performance report for a set of accounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CohortPerformance {
    pub period: PerformancePeriod,
    pub benchmark_symbol: Option<String>,
    /// Sorted by account id
    pub accounts: Vec<AccountSummaryRow>,
    pub totals: CohortTotals,
}
