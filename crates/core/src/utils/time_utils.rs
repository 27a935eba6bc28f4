use chrono::NaiveDate;

/// Returns the first and last calendar day of `year`.
pub fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some((start, end))
}

/// The last day of the fiscal year preceding `year` (December 31st).
///
/// Year-scoped reports take their opening equity and benchmark base price
/// from this date.
pub fn prior_year_end(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year - 1, 12, 31)
}

/// The day before `date`, saturating at the minimum representable date.
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// Number of calendar days from `start` to `end` (negative if reversed).
pub fn days_elapsed(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}
