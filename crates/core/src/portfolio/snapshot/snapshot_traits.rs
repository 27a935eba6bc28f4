//! Repository traits for account equity snapshots.

use chrono::NaiveDate;

use super::EquitySnapshot;
use crate::errors::Result;

/// Repository trait for reading account equity snapshots.
///
/// Implementations must return rows ascending by date with at most one row
/// per account per date.
pub trait SnapshotRepositoryTrait: Send + Sync {
    /// Get snapshots for a specific account within an optional inclusive date range.
    fn get_snapshots_by_account(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<EquitySnapshot>>;

    /// Get the latest snapshot on or before the given date.
    fn get_latest_snapshot_before_date(
        &self,
        account_id: &str,
        date: NaiveDate,
    ) -> Result<Option<EquitySnapshot>>;
}
