//! "What if" benchmark simulation.
//!
//! Replays an account's own cash flows into a reference instrument: the
//! opening capital buys shares at the base price and every later deposit or
//! withdrawal buys or sells at that day's close. The resulting synthetic
//! equity curve goes through the same TWR recurrence as the real account.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::performance_model::BenchmarkMetric;
use super::twr_calculator::TwrRecurrence;
use crate::portfolio::snapshot::EquitySnapshot;
use crate::quotes::{PricePoint, PriceSeries};

/// When a simulation that started without a base price may seed its position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ReseedPolicy {
    /// Seed at the first day with a usable close
    #[default]
    FirstAvailablePrice,
    /// Seed only if the first day of the series has a usable close
    SeriesStartOnly,
}

impl ReseedPolicy {
    fn allows(self, index: usize) -> bool {
        match self {
            ReseedPolicy::FirstAvailablePrice => true,
            ReseedPolicy::SeriesStartOnly => index == 0,
        }
    }
}

/// Options for a benchmark simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkOptions {
    /// Date the base price is taken on. Defaults to the first snapshot date;
    /// year reports use the prior year end.
    pub start_date: Option<NaiveDate>,
    pub reseed_policy: ReseedPolicy,
}

/// Simulates the benchmark with default options.
pub fn simulate_benchmark(
    snapshots: &[EquitySnapshot],
    prices: &[PricePoint],
    initial_equity: Decimal,
) -> Vec<BenchmarkMetric> {
    simulate_benchmark_with(
        snapshots,
        &PriceSeries::new(prices.to_vec()),
        initial_equity,
        &BenchmarkOptions::default(),
    )
}

/// Simulates the benchmark position for an account's snapshot series.
///
/// Returns one metric per snapshot. A base price that cannot be resolved is
/// not an error: the position starts empty (`shares = 0`) until a usable
/// close appears, at which point it is seeded with `initial_equity` if the
/// re-seed policy allows it.
pub fn simulate_benchmark_with(
    snapshots: &[EquitySnapshot],
    prices: &PriceSeries,
    initial_equity: Decimal,
    options: &BenchmarkOptions,
) -> Vec<BenchmarkMetric> {
    let Some(first) = snapshots.first() else {
        return Vec::new();
    };

    let start_date = options.start_date.unwrap_or(first.date);
    let base_price = prices.resolve_or(start_date, None);

    let mut shares = Decimal::ZERO;
    let mut seeded = false;
    if let Some(price) = base_price {
        shares = initial_equity / price;
        seeded = true;
    } else {
        warn!(
            "No base price on {} ({} points available). Benchmark starts with an empty position.",
            start_date,
            prices.len()
        );
    }

    // An empty position is worth nothing, so its first return is measured from zero
    let mut recurrence = TwrRecurrence::new(if seeded {
        initial_equity
    } else {
        Decimal::ZERO
    });
    let mut last_price = base_price;
    let mut metrics = Vec::with_capacity(snapshots.len());

    for (index, snapshot) in snapshots.iter().enumerate() {
        let current_price = prices.resolve_or(snapshot.date, last_price);

        let flow = match current_price {
            Some(price) => {
                last_price = Some(price);
                if !seeded && options.reseed_policy.allows(index) {
                    shares = initial_equity / price;
                    recurrence.rebase(initial_equity);
                    seeded = true;
                    debug!(
                        "Benchmark position seeded on {} at {} ({} shares)",
                        snapshot.date, price, shares
                    );
                }
                // bought or sold at the close, after the day's move
                shares += snapshot.deposit / price;
                snapshot.deposit
            }
            // nothing can be bought before the first observed close
            None => Decimal::ZERO,
        };

        let equity = current_price.map_or(Decimal::ZERO, |price| shares * price);
        let metric = recurrence.step(snapshot.date, equity, flow);

        metrics.push(BenchmarkMetric {
            metric,
            close_price: current_price,
            shares,
        });
    }

    metrics
}
