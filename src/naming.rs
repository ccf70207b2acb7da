//! Output naming: the merged set list is named after the Sunday it will
//! be sung on.
//!
//! The rule is "next Sunday, strictly after today": running the merge on a
//! Sunday names the file for the following week, never for the same day.

use chrono::{Datelike, Duration, NaiveDate};

/// File extension of the merged output.
pub const OUTPUT_EXTENSION: &str = "pdf";

/// Compute the next Sunday strictly after `today`.
///
/// Non-Sundays map 1 to 6 days ahead; a Sunday maps exactly 7 days ahead.
pub fn next_sunday(today: NaiveDate) -> NaiveDate {
    // num_days_from_sunday: Sun = 0 .. Sat = 6, so Sundays advance a full week.
    let days_ahead = 7 - i64::from(today.weekday().num_days_from_sunday());
    today + Duration::days(days_ahead)
}

/// Compute the output filename for a merge run on `today`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use songbook::naming::output_filename;
///
/// // 2024-11-20 is a Wednesday; the following Sunday is the 24th.
/// let today = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
/// assert_eq!(output_filename(today), "2024-11-24.pdf");
/// ```
pub fn output_filename(today: NaiveDate) -> String {
    format!(
        "{}.{}",
        next_sunday(today).format("%Y-%m-%d"),
        OUTPUT_EXTENSION
    )
}
