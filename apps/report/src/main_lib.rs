use std::sync::Arc;

use equitybook_core::cache::{ResponseCache, TtlCache};
use equitybook_core::performance::{
    order_series, AccountPerformance, CohortPerformance, PerformanceService,
    PerformanceServiceTrait,
};
use serde::Serialize;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::dataset::{
    Dataset, InMemoryAccountRepository, InMemoryPriceRepository, InMemorySnapshotRepository,
};

/// Installs the global subscriber. `log` records from the engine are
/// forwarded through the same filter.
pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub fn build_service(config: &Config, dataset: Dataset) -> Arc<dyn PerformanceServiceTrait> {
    let cache: Arc<dyn ResponseCache> = match config.cache_capacity {
        Some(capacity) => Arc::new(TtlCache::with_capacity(capacity)),
        None => Arc::new(TtlCache::new()),
    };

    Arc::new(PerformanceService::new(
        Arc::new(InMemoryAccountRepository::new(dataset.accounts)),
        Arc::new(InMemorySnapshotRepository::new(dataset.snapshots)),
        Arc::new(InMemoryPriceRepository::new(dataset.prices)),
        cache,
        config.settings.clone(),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub cohort: CohortPerformance,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<AccountPerformance>,
}

pub async fn run_report(
    service: &dyn PerformanceServiceTrait,
    config: &Config,
) -> anyhow::Result<Report> {
    let cohort = service
        .calculate_cohort_performance(
            &config.account_ids,
            config.benchmark_symbol.as_deref(),
            config.period,
        )
        .await?;
    tracing::info!(
        "Cohort of {} accounts, average return {}",
        cohort.totals.account_count,
        cohort.totals.average_return
    );

    let mut series = Vec::new();
    if config.include_series {
        for row in &cohort.accounts {
            let mut performance = service
                .calculate_account_performance(&row.account_id, config.period)
                .await?;
            performance.daily_metrics =
                order_series(performance.daily_metrics, config.series_order);
            series.push(performance);
        }
    }

    Ok(Report { cohort, series })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use equitybook_core::accounts::Account;
    use equitybook_core::quotes::PricePoint;
    use equitybook_core::snapshot::EquitySnapshot;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset {
            accounts: vec![Account {
                id: "a".to_string(),
                name: "A".to_string(),
                currency: "USD".to_string(),
                initial_equity: dec!(1000),
                benchmark_symbol: None,
                is_active: true,
            }],
            snapshots: vec![
                EquitySnapshot::new("a", d(2), dec!(1100), dec!(0)),
                EquitySnapshot::new("a", d(3), dec!(1210), dec!(0)),
            ],
            prices: vec![PricePoint::new("SPY", d(2), dec!(50))],
        }
    }

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(
            |key| vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_report_with_newest_first_series() {
        let config = config(&[
            ("EB_BENCHMARK_SYMBOL", "SPY"),
            ("EB_INCLUDE_SERIES", "true"),
            ("EB_SERIES_ORDER", "newest"),
        ]);
        let service = build_service(&config, dataset());
        let report = run_report(service.as_ref(), &config).await.unwrap();

        assert_eq!(report.cohort.totals.account_count, 1);
        assert_eq!(report.cohort.accounts[0].summary.return_percentage, dec!(0.21));
        assert!(report.cohort.accounts[0].benchmark_summary.is_some());
        assert_eq!(report.series.len(), 1);
        assert_eq!(report.series[0].daily_metrics[0].date, d(3));
    }

    #[tokio::test]
    async fn test_report_without_series() {
        let config = config(&[]);
        let service = build_service(&config, dataset());
        let report = run_report(service.as_ref(), &config).await.unwrap();

        assert!(report.series.is_empty());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("series").is_none());
    }
}
