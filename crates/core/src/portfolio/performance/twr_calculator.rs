//! Deposit-neutral time-weighted return recurrence.
//!
//! The same state machine drives the real-account series and the synthetic
//! benchmark series, so the two can never drift apart.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::performance_model::DailyMetric;
use crate::portfolio::snapshot::EquitySnapshot;

/// Deposit-neutral daily return.
///
/// The day's cash flow is removed from the gain and added to the base, so a
/// contribution is neither counted as profit nor diluted against yesterday's
/// equity. A base that is zero or negative (a wiped-out account, or a
/// withdrawal matching the balance) yields `0` instead of an undefined value
/// that would poison every later NAV ratio.
pub fn daily_return(prev_equity: Decimal, equity: Decimal, deposit: Decimal) -> Decimal {
    let denominator = prev_equity + deposit;
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (equity - deposit - prev_equity)
        .checked_div(denominator)
        .unwrap_or(Decimal::ZERO)
}

/// Running state of the recurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct TwrRecurrence {
    prev_equity: Decimal,
    prev_nav_ratio: Decimal,
    peak_nav_ratio: Decimal,
}

impl TwrRecurrence {
    /// Starts a series whose first return is measured against `initial_equity`.
    pub fn new(initial_equity: Decimal) -> Self {
        Self {
            prev_equity: initial_equity,
            prev_nav_ratio: Decimal::ONE,
            peak_nav_ratio: Decimal::ONE,
        }
    }

    /// Advances one day and emits its metric.
    pub fn step(&mut self, date: NaiveDate, equity: Decimal, deposit: Decimal) -> DailyMetric {
        let daily_return = daily_return(self.prev_equity, equity, deposit);
        let nav_ratio = self
            .prev_nav_ratio
            .checked_mul(Decimal::ONE + daily_return)
            .unwrap_or(self.prev_nav_ratio);

        let is_new_high = nav_ratio > self.peak_nav_ratio;
        if is_new_high {
            self.peak_nav_ratio = nav_ratio;
        }

        // peak starts at 1 and never decreases
        let drawdown = if is_new_high {
            Decimal::ZERO
        } else {
            ((nav_ratio - self.peak_nav_ratio) / self.peak_nav_ratio).min(Decimal::ZERO)
        };

        self.prev_equity = equity;
        self.prev_nav_ratio = nav_ratio;

        DailyMetric {
            date,
            equity,
            deposit,
            daily_return,
            nav_ratio,
            running_peak: self.peak_nav_ratio,
            drawdown,
            is_new_high,
        }
    }

    /// Replaces the equity the next return is measured against.
    ///
    /// NAV ratio and peak are untouched. Used when a synthetic position is
    /// re-seeded, so the re-seed itself does not register as a return.
    pub fn rebase(&mut self, prev_equity: Decimal) {
        self.prev_equity = prev_equity;
    }

    pub fn peak_nav_ratio(&self) -> Decimal {
        self.peak_nav_ratio
    }

    /// Runs the recurrence over `(date, equity, deposit)` triples in order.
    pub fn run<I>(initial_equity: Decimal, days: I) -> Vec<DailyMetric>
    where
        I: IntoIterator<Item = (NaiveDate, Decimal, Decimal)>,
    {
        let mut recurrence = Self::new(initial_equity);
        days.into_iter()
            .map(|(date, equity, deposit)| recurrence.step(date, equity, deposit))
            .collect()
    }
}

/// Computes the daily metric series for an account.
///
/// `snapshots` must be ascending by date. Returns exactly one metric per
/// snapshot, in the same order; an empty input yields an empty series.
pub fn compute_daily_metrics(
    snapshots: &[EquitySnapshot],
    initial_equity: Decimal,
) -> Vec<DailyMetric> {
    TwrRecurrence::run(
        initial_equity,
        snapshots
            .iter()
            .map(|s| (s.date, s.net_equity, s.deposit)),
    )
}
