//! Unit tests for the performance service.

use super::*;
use crate::accounts::{Account, AccountRepositoryTrait};
use crate::cache::{NoopCache, ResponseCache, TtlCache};
use crate::errors::{Error, Result, ValidationError};
use crate::portfolio::snapshot::{EquitySnapshot, SnapshotRepositoryTrait};
use crate::quotes::{PricePoint, PriceRepositoryTrait};
use crate::settings::PerformanceSettings;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Mock Implementations
// ============================================================================

struct MockAccountRepository {
    accounts: Vec<Account>,
}

impl AccountRepositoryTrait for MockAccountRepository {
    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        self.accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .ok_or_else(|| Error::Repository(format!("Account {} not found", account_id)))
    }

    fn list(
        &self,
        is_active_filter: Option<bool>,
        _account_ids: Option<&[String]>,
    ) -> Result<Vec<Account>> {
        let accounts = match is_active_filter {
            Some(active) => self
                .accounts
                .iter()
                .filter(|a| a.is_active == active)
                .cloned()
                .collect(),
            None => self.accounts.clone(),
        };
        Ok(accounts)
    }
}

struct MockSnapshotRepository {
    snapshots: Vec<EquitySnapshot>,
}

impl SnapshotRepositoryTrait for MockSnapshotRepository {
    fn get_snapshots_by_account(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<EquitySnapshot>> {
        Ok(self
            .snapshots
            .iter()
            .filter(|s| s.account_id == account_id)
            .filter(|s| start_date.map_or(true, |start| s.date >= start))
            .filter(|s| end_date.map_or(true, |end| s.date <= end))
            .cloned()
            .collect())
    }

    fn get_latest_snapshot_before_date(
        &self,
        account_id: &str,
        date: NaiveDate,
    ) -> Result<Option<EquitySnapshot>> {
        Ok(self
            .snapshots
            .iter()
            .filter(|s| s.account_id == account_id && s.date <= date)
            .last()
            .cloned())
    }
}

struct MockPriceRepository {
    prices: Vec<PricePoint>,
    calls: AtomicUsize,
}

impl MockPriceRepository {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceRepositoryTrait for MockPriceRepository {
    fn get_price_history(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .prices
            .iter()
            .filter(|p| p.symbol == symbol)
            .filter(|p| start_date.map_or(true, |start| p.date >= start))
            .filter(|p| end_date.map_or(true, |end| p.date <= end))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn account(id: &str, initial_equity: Decimal, benchmark: Option<&str>, active: bool) -> Account {
    Account {
        id: id.to_string(),
        name: format!("Account {}", id),
        currency: "USD".to_string(),
        initial_equity,
        benchmark_symbol: benchmark.map(str::to_string),
        is_active: active,
    }
}

fn snapshot(
    account_id: &str,
    date: NaiveDate,
    equity: Decimal,
    deposit: Decimal,
    cash: Option<Decimal>,
) -> EquitySnapshot {
    EquitySnapshot {
        cash_balance: cash,
        ..EquitySnapshot::new(account_id, date, equity, deposit)
    }
}

struct Fixture {
    service: PerformanceService,
    prices: Arc<MockPriceRepository>,
}

fn fixture_with(cache: Arc<dyn ResponseCache>, settings: PerformanceSettings) -> Fixture {
    let accounts = MockAccountRepository {
        accounts: vec![
            account("acc-2", dec!(5000), None, true),
            account("acc-1", dec!(10000), Some("SPY"), true),
            account("acc-3", dec!(2000), None, false),
        ],
    };
    let snapshots = MockSnapshotRepository {
        snapshots: vec![
            snapshot("acc-1", date(2024, 1, 2), dec!(10500), dec!(0), None),
            snapshot("acc-1", date(2024, 1, 3), dec!(9000), dec!(0), None),
            snapshot("acc-2", date(2023, 12, 29), dec!(5000), dec!(0), Some(dec!(100))),
            snapshot("acc-2", date(2024, 1, 2), dec!(5500), dec!(0), Some(dec!(100))),
            snapshot("acc-2", date(2024, 1, 3), dec!(6600), dec!(1000), Some(dec!(600))),
            snapshot("acc-3", date(2024, 1, 2), dec!(2100), dec!(0), None),
        ],
    };
    let prices = Arc::new(MockPriceRepository {
        prices: vec![
            PricePoint::new("SPY", date(2023, 12, 29), dec!(100)),
            PricePoint::new("SPY", date(2024, 1, 2), dec!(105)),
            PricePoint::new("SPY", date(2024, 1, 3), dec!(99)),
        ],
        calls: AtomicUsize::new(0),
    });

    let service = PerformanceService::new(
        Arc::new(accounts),
        Arc::new(snapshots),
        prices.clone(),
        cache,
        settings,
    );
    Fixture { service, prices }
}

fn fixture() -> Fixture {
    fixture_with(Arc::new(NoopCache), PerformanceSettings::default())
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ============================================================================
// Single account
// ============================================================================

#[tokio::test]
async fn test_account_performance_since_inception() {
    let f = fixture();
    let result = f
        .service
        .calculate_account_performance("acc-1", PerformancePeriod::SinceInception)
        .await
        .unwrap();

    assert_eq!(result.initial_equity, dec!(10000));
    assert_eq!(result.daily_metrics.len(), 2);
    assert_eq!(result.daily_metrics[0].daily_return, dec!(0.05));
    assert_eq!(result.summary.return_percentage, dec!(-0.1));
    assert_eq!(result.summary.new_high_count, 1);
    assert_eq!(result.summary.start_date, Some(date(2024, 1, 2)));
}

#[tokio::test]
async fn test_year_period_opens_at_prior_year_end() {
    let f = fixture();
    let result = f
        .service
        .calculate_account_performance("acc-2", PerformancePeriod::year(2024))
        .await
        .unwrap();

    // opening equity from the 2023-12-29 snapshot, which is also the declared capital here
    assert_eq!(result.initial_equity, dec!(5000));
    assert_eq!(result.daily_metrics.len(), 2);
    assert_eq!(result.daily_metrics[0].date, date(2024, 1, 2));
    assert_eq!(result.daily_metrics[0].daily_return, dec!(0.1));
}

#[tokio::test]
async fn test_year_period_without_history_uses_declared_capital() {
    let f = fixture();
    let result = f
        .service
        .calculate_account_performance("acc-1", PerformancePeriod::year(2023))
        .await
        .unwrap();

    assert_eq!(result.initial_equity, dec!(10000));
    assert!(result.daily_metrics.is_empty());
    assert_eq!(result.summary, PerformanceSummary::empty());
}

#[tokio::test]
async fn test_range_period_reads_opening_equity() {
    let f = fixture();
    let period = PerformancePeriod::Range {
        start: date(2024, 1, 3),
        end: date(2024, 1, 3),
    };
    let result = f
        .service
        .calculate_account_performance("acc-2", period)
        .await
        .unwrap();

    assert_eq!(result.initial_equity, dec!(5500));
    assert_eq!(result.daily_metrics.len(), 1);
    assert_eq!(result.daily_metrics[0].daily_return, dec!(100) / dec!(6500));
}

#[tokio::test]
async fn test_reversed_range_is_rejected() {
    let f = fixture();
    let period = PerformancePeriod::Range {
        start: date(2024, 2, 1),
        end: date(2024, 1, 1),
    };

    let err = f
        .service
        .calculate_account_performance("acc-1", period)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::InvalidInput(_))
    ));

    let err = f
        .service
        .calculate_cohort_performance(&[], None, period)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_unknown_account_is_a_repository_error() {
    let f = fixture();
    let err = f
        .service
        .calculate_account_performance("missing", PerformancePeriod::SinceInception)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Repository(_)));
}

// ============================================================================
// Benchmark
// ============================================================================

#[tokio::test]
async fn test_benchmark_uses_account_symbol_by_default() {
    let f = fixture();
    let result = f
        .service
        .calculate_benchmark_performance("acc-1", None, PerformancePeriod::SinceInception)
        .await
        .unwrap();

    assert_eq!(result.symbol, "SPY");
    assert_eq!(result.base_date, Some(date(2024, 1, 2)));
    // 10000 / 105 does not divide evenly
    let first = &result.daily_metrics[0].metric;
    assert!((first.equity - dec!(10000)).abs() < dec!(0.000001));
    assert!(first.daily_return.abs() < dec!(0.000001));
    assert_eq!(result.daily_metrics[1].close_price, Some(dec!(99)));
    assert!(result.summary.return_percentage < Decimal::ZERO);
}

#[tokio::test]
async fn test_benchmark_without_symbol_is_rejected() {
    let f = fixture();
    let err = f
        .service
        .calculate_benchmark_performance("acc-2", None, PerformancePeriod::SinceInception)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingField(_))
    ));
}

#[tokio::test]
async fn test_year_benchmark_bases_on_prior_year_end() {
    let f = fixture();
    let result = f
        .service
        .calculate_benchmark_performance("acc-2", Some("SPY"), PerformancePeriod::year(2024))
        .await
        .unwrap();

    assert_eq!(result.base_date, Some(date(2023, 12, 31)));
    // 5000 at the 2023-12-29 close of 100
    assert_eq!(result.daily_metrics[0].shares, dec!(50));
    assert_eq!(result.daily_metrics[0].metric.daily_return, dec!(0.05));
}

// ============================================================================
// Cohort
// ============================================================================

#[tokio::test]
async fn test_cohort_defaults_to_active_accounts_sorted() {
    let f = fixture();
    let cohort = f
        .service
        .calculate_cohort_performance(&[], Some("SPY"), PerformancePeriod::SinceInception)
        .await
        .unwrap();

    let row_ids: Vec<&str> = cohort.accounts.iter().map(|r| r.account_id.as_str()).collect();
    assert_eq!(row_ids, vec!["acc-1", "acc-2"]);
    assert_eq!(cohort.benchmark_symbol.as_deref(), Some("SPY"));
    assert_eq!(f.prices.calls(), 1);
}

#[tokio::test]
async fn test_cohort_rows_match_single_account_results() {
    let f = fixture();
    for period in [PerformancePeriod::SinceInception, PerformancePeriod::year(2024)] {
        let cohort = f
            .service
            .calculate_cohort_performance(&ids(&["acc-2", "acc-1"]), Some("SPY"), period)
            .await
            .unwrap();

        for row in &cohort.accounts {
            let single = f
                .service
                .calculate_account_performance(&row.account_id, period)
                .await
                .unwrap();
            let benchmark = f
                .service
                .calculate_benchmark_performance(&row.account_id, Some("SPY"), period)
                .await
                .unwrap();

            assert_eq!(row.summary, single.summary, "{} {:?}", row.account_id, period);
            assert_eq!(row.benchmark_summary.as_ref(), Some(&benchmark.summary));
        }
    }
}

#[tokio::test]
async fn test_cohort_totals() {
    let f = fixture();
    let cohort = f
        .service
        .calculate_cohort_performance(
            &ids(&["acc-1", "acc-2"]),
            None,
            PerformancePeriod::SinceInception,
        )
        .await
        .unwrap();

    let totals = &cohort.totals;
    assert_eq!(totals.account_count, 2);
    assert_eq!(totals.total_equity, dec!(15600));
    assert_eq!(totals.total_deposits, dec!(1000));
    assert_eq!(totals.total_cash_balance, dec!(600));
    assert_eq!(totals.best_account_id.as_deref(), Some("acc-2"));
    assert_eq!(totals.worst_account_id.as_deref(), Some("acc-1"));
    assert!(cohort.accounts.iter().all(|r| r.benchmark_summary.is_none()));

    let acc2 = &cohort.accounts[1];
    assert_eq!(acc2.current_equity, dec!(6600));
    assert_eq!(acc2.cash_balance, Some(dec!(600)));
}

#[tokio::test]
async fn test_cohort_with_unknown_account_fails() {
    let f = fixture();
    let err = f
        .service
        .calculate_cohort_performance(
            &ids(&["acc-1", "nope"]),
            None,
            PerformancePeriod::SinceInception,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Repository(_)));
}

#[tokio::test]
async fn test_cohort_on_bounded_pool() {
    let settings = PerformanceSettings {
        max_parallelism: Some(2),
        ..Default::default()
    };
    let bounded = fixture_with(Arc::new(NoopCache), settings);
    let global = fixture();

    let a = bounded
        .service
        .calculate_cohort_performance(&[], Some("SPY"), PerformancePeriod::SinceInception)
        .await
        .unwrap();
    let b = global
        .service
        .calculate_cohort_performance(&[], Some("SPY"), PerformancePeriod::SinceInception)
        .await
        .unwrap();
    assert_eq!(a, b);
}

// ============================================================================
// Cache
// ============================================================================

#[tokio::test]
async fn test_cohort_is_served_from_cache() {
    let cache = Arc::new(TtlCache::new());
    let f = fixture_with(cache.clone(), PerformanceSettings::default());

    let first = f
        .service
        .calculate_cohort_performance(
            &ids(&["acc-1", "acc-2"]),
            Some("SPY"),
            PerformancePeriod::SinceInception,
        )
        .await
        .unwrap();
    // same cohort in a different order hits the same entry
    let second = f
        .service
        .calculate_cohort_performance(
            &ids(&["acc-2", "acc-1"]),
            Some("SPY"),
            PerformancePeriod::SinceInception,
        )
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(f.prices.calls(), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_invalidate_symbol_forces_recalculation() {
    let cache = Arc::new(TtlCache::new());
    let f = fixture_with(cache.clone(), PerformanceSettings::default());
    let period = PerformancePeriod::SinceInception;

    f.service
        .calculate_cohort_performance(&[], Some("SPY"), period)
        .await
        .unwrap();
    f.service
        .calculate_cohort_performance(&[], None, period)
        .await
        .unwrap();
    assert_eq!(cache.len(), 2);

    assert_eq!(f.service.invalidate_symbol("SPY"), 1);
    assert_eq!(cache.len(), 1);

    f.service
        .calculate_cohort_performance(&[], Some("SPY"), period)
        .await
        .unwrap();
    assert_eq!(f.prices.calls(), 2);
}

#[tokio::test]
async fn test_invalidate_accounts() {
    let cache = Arc::new(TtlCache::new());
    let f = fixture_with(cache.clone(), PerformanceSettings::default());
    let period = PerformancePeriod::SinceInception;

    f.service
        .calculate_cohort_performance(&ids(&["acc-1"]), None, period)
        .await
        .unwrap();
    f.service
        .calculate_cohort_performance(&ids(&["acc-2"]), None, period)
        .await
        .unwrap();
    f.service
        .calculate_cohort_performance(&ids(&["acc-1", "acc-2"]), None, period)
        .await
        .unwrap();

    assert_eq!(f.service.invalidate_accounts(&ids(&["acc-2"])), 2);
    assert_eq!(cache.len(), 1);
}
