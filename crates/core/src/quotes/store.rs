//! Price storage traits.
//!
//! This trait abstracts the persistence layer for market prices. The engine
//! reads a symbol's history once per request and never writes prices.

use chrono::NaiveDate;

use super::model::PricePoint;
use crate::errors::Result;

/// Storage interface for closing-price history.
pub trait PriceRepositoryTrait: Send + Sync {
    /// Returns the price history for `symbol`, ascending by date.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Instrument symbol (e.g. "SPY")
    /// * `start_date` - Optional inclusive lower bound
    /// * `end_date` - Optional inclusive upper bound
    fn get_price_history(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>>;
}
