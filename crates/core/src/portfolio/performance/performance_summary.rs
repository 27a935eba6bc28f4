//! Reduction of a daily metric series into summary statistics.

use log::warn;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::performance_model::{DailyMetric, PerformanceSummary};
use crate::constants::DECIMAL_PRECISION;
use crate::settings::PerformanceSettings;
use crate::utils::time_utils::days_elapsed;

/// sqrt(252), used if the configured trading-day count cannot be rooted
const SQRT_TRADING_DAYS_FALLBACK: Decimal = dec!(15.874507866);

/// Summarizes a series with default settings.
pub fn summarize<M: AsRef<DailyMetric>>(
    metrics: &[M],
    initial_equity: Decimal,
) -> PerformanceSummary {
    summarize_with(metrics, initial_equity, &PerformanceSettings::default())
}

/// Summarizes an oldest-first daily metric series.
///
/// Works for both account and benchmark series. An empty series yields an
/// all-zero summary with no start date.
pub fn summarize_with<M: AsRef<DailyMetric>>(
    metrics: &[M],
    initial_equity: Decimal,
    settings: &PerformanceSettings,
) -> PerformanceSummary {
    let (Some(first), Some(last)) = (metrics.first(), metrics.last()) else {
        return PerformanceSummary::empty();
    };
    let (first, last) = (first.as_ref(), last.as_ref());

    let total = Decimal::from(metrics.len());
    let days = days_elapsed(first.date, last.date);

    let return_percentage = last.nav_ratio - Decimal::ONE;
    let max_drawdown = metrics
        .iter()
        .map(|m| m.as_ref().drawdown)
        .min()
        .unwrap_or(Decimal::ZERO)
        .min(Decimal::ZERO);

    let annualized_return = annualize_return(return_percentage, days, settings.days_per_year);
    let annualized_std_dev = annualized_std_dev(metrics, settings.trading_days_per_year);
    let sharpe_ratio = if annualized_std_dev.is_zero() {
        Decimal::ZERO
    } else {
        annualized_return
            .saturating_sub(settings.risk_free_rate)
            .checked_div(annualized_std_dev)
            .unwrap_or(Decimal::ZERO)
    };

    let new_high_count = metrics.iter().filter(|m| m.as_ref().is_new_high).count() as u32;
    let new_high_freq = Decimal::from(new_high_count) / total;

    let total_deposits: Decimal = metrics.iter().map(|m| m.as_ref().deposit).sum();
    let gain_loss_amount = last.equity - initial_equity - total_deposits;

    PerformanceSummary {
        start_date: Some(first.date),
        end_date: Some(last.date),
        days_elapsed: days,
        return_percentage: return_percentage.round_dp(DECIMAL_PRECISION),
        max_drawdown: max_drawdown.round_dp(DECIMAL_PRECISION),
        annualized_return: annualized_return.round_dp(DECIMAL_PRECISION),
        annualized_std_dev: annualized_std_dev.round_dp(DECIMAL_PRECISION),
        sharpe_ratio: sharpe_ratio.round_dp(DECIMAL_PRECISION),
        new_high_count,
        new_high_freq: new_high_freq.round_dp(DECIMAL_PRECISION),
        gain_loss_amount: gain_loss_amount.round_dp(DECIMAL_PRECISION),
    }
}

/// Compounds a cumulative return to a yearly basis.
///
/// `(1 + r)^(days_per_year / days) - 1`. A zero-day span returns `r`
/// unchanged and a total loss (or worse) annualizes to `-1`. When the power
/// leaves `Decimal`'s range the result saturates: losses go to `-1` and gains
/// to `Decimal::MAX`.
pub fn annualize_return(return_percentage: Decimal, days: i64, days_per_year: u32) -> Decimal {
    if days <= 0 {
        return return_percentage;
    }
    let base = Decimal::ONE + return_percentage;
    if base <= Decimal::ZERO {
        return Decimal::NEGATIVE_ONE;
    }

    let exponent = Decimal::from(days_per_year) / Decimal::from(days);
    match base.checked_powd(exponent) {
        Some(growth) => growth - Decimal::ONE,
        None if base < Decimal::ONE => Decimal::NEGATIVE_ONE,
        None => {
            warn!(
                "Annualizing {} over {} days exceeds the decimal range, saturating",
                return_percentage, days
            );
            Decimal::MAX
        }
    }
}

/// Sample standard deviation of daily returns, scaled by sqrt(trading days).
fn annualized_std_dev<M: AsRef<DailyMetric>>(metrics: &[M], trading_days_per_year: u32) -> Decimal {
    let n = metrics.len();
    if n < 2 {
        return Decimal::ZERO;
    }

    let count = Decimal::from(n);
    let mean = metrics
        .iter()
        .map(|m| m.as_ref().daily_return)
        .sum::<Decimal>()
        / count;
    let sum_sq: Decimal = metrics
        .iter()
        .map(|m| {
            let diff = m.as_ref().daily_return - mean;
            diff * diff
        })
        .sum();
    let variance = sum_sq / (count - Decimal::ONE);

    let daily_std = variance.sqrt().unwrap_or(Decimal::ZERO);
    let scale = Decimal::from(trading_days_per_year)
        .sqrt()
        .unwrap_or(SQRT_TRADING_DAYS_FALLBACK);
    daily_std * scale
}
