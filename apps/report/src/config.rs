use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use equitybook_core::performance::{PerformancePeriod, ReseedPolicy, SeriesOrder};
use equitybook_core::settings::PerformanceSettings;
use rust_decimal::Decimal;

pub struct Config {
    pub dataset_path: PathBuf,
    pub log_format: String,
    pub period: PerformancePeriod,
    pub benchmark_symbol: Option<String>,
    /// Restricts the report to these accounts; empty means every active one
    pub account_ids: Vec<String>,
    pub include_series: bool,
    pub series_order: SeriesOrder,
    pub cache_capacity: Option<u64>,
    pub settings: PerformanceSettings,
}

impl Config {
    /// Reads `EB_*` variables, after loading a `.env` file if one exists.
    /// The first command-line argument overrides `EB_DATASET_PATH`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok(), std::env::args().nth(1))
    }

    pub(crate) fn from_lookup<F>(lookup: F, path_arg: Option<String>) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let dataset_path: PathBuf = path_arg
            .or_else(|| get("EB_DATASET_PATH"))
            .unwrap_or_else(|| "./data/sample.json".to_string())
            .into();
        let log_format = get("EB_LOG_FORMAT").unwrap_or_else(|| "text".to_string());

        let period = match get("EB_PERIOD_YEAR") {
            Some(year) => PerformancePeriod::year(parse("EB_PERIOD_YEAR", &year)?),
            None => PerformancePeriod::SinceInception,
        };
        let account_ids: Vec<String> = get("EB_ACCOUNT_IDS")
            .map(|ids| {
                ids.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let defaults = PerformanceSettings::default();
        let settings = PerformanceSettings {
            cache_ttl_secs: get("EB_CACHE_TTL_SECS")
                .map(|v| parse("EB_CACHE_TTL_SECS", &v))
                .transpose()?
                .unwrap_or(defaults.cache_ttl_secs),
            risk_free_rate: get("EB_RISK_FREE_RATE")
                .map(|v| parse::<Decimal>("EB_RISK_FREE_RATE", &v))
                .transpose()?
                .unwrap_or(defaults.risk_free_rate),
            reseed_policy: get("EB_RESEED_POLICY")
                .map(|v| parse_reseed_policy(&v))
                .transpose()?
                .unwrap_or(defaults.reseed_policy),
            max_parallelism: get("EB_MAX_PARALLELISM")
                .map(|v| parse("EB_MAX_PARALLELISM", &v))
                .transpose()?,
            ..defaults
        };

        Ok(Self {
            dataset_path,
            log_format,
            period,
            benchmark_symbol: get("EB_BENCHMARK_SYMBOL"),
            account_ids,
            include_series: get("EB_INCLUDE_SERIES")
                .map(|v| parse("EB_INCLUDE_SERIES", &v))
                .transpose()?
                .unwrap_or(false),
            series_order: get("EB_SERIES_ORDER")
                .map(|v| parse_series_order(&v))
                .transpose()?
                .unwrap_or_default(),
            cache_capacity: get("EB_CACHE_CAPACITY")
                .map(|v| parse("EB_CACHE_CAPACITY", &v))
                .transpose()?,
            settings,
        })
    }
}

fn parse<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {}: '{}'", key, value))
}

fn parse_reseed_policy(value: &str) -> anyhow::Result<ReseedPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "first-available" | "firstavailableprice" => Ok(ReseedPolicy::FirstAvailablePrice),
        "series-start" | "seriesstartonly" => Ok(ReseedPolicy::SeriesStartOnly),
        other => Err(anyhow!("Invalid EB_RESEED_POLICY: '{}'", other)),
    }
}

fn parse_series_order(value: &str) -> anyhow::Result<SeriesOrder> {
    match value.trim().to_ascii_lowercase().as_str() {
        "oldest" | "oldest-first" | "asc" => Ok(SeriesOrder::OldestFirst),
        "newest" | "newest-first" | "desc" => Ok(SeriesOrder::NewestFirst),
        other => Err(anyhow!("Invalid EB_SERIES_ORDER: '{}'", other)),
    }
}
