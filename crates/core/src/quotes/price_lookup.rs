//! Price resolution over sparse closing-price series.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::model::PricePoint;

/// Resolves the close effective on `target` from a series sorted ascending by date.
///
/// Returns the exact observation when one exists, otherwise the latest
/// observation dated before `target`, otherwise `None`. What to do with
/// `None` (carry a previous price, or treat the position as unpriced) is the
/// caller's decision.
pub fn resolve_price(series: &[PricePoint], target: NaiveDate) -> Option<Decimal> {
    let idx = series.partition_point(|p| p.date <= target);
    if idx == 0 {
        None
    } else {
        Some(series[idx - 1].close)
    }
}

/// A date-indexed price series for a single symbol.
///
/// Built once per request from storage rows and queried by binary search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from points in any order.
    ///
    /// Points are sorted by date. When two points share a date the one that
    /// came later in the input wins, matching an upsert by date.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        // Stable sort keeps input order among equal dates
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        Self { points: deduped }
    }

    /// Close effective on `target` ("latest at or before" semantics).
    pub fn resolve(&self, target: NaiveDate) -> Option<Decimal> {
        resolve_price(&self.points, target)
    }

    /// Positive close effective on `target`, or `fallback` when nothing
    /// precedes it or the stored close is not positive.
    ///
    /// Passing the previously resolved price gives carry-forward behaviour:
    /// a gap in the data never reads as a price of zero.
    pub fn resolve_or(&self, target: NaiveDate, fallback: Option<Decimal>) -> Option<Decimal> {
        self.resolve(target)
            .filter(|price| *price > Decimal::ZERO)
            .or(fallback)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }
}
