//! Calendar-day parsing for the query boundary.

use chrono::NaiveDate;

/// Display form used in dashboard links (e.g. `04-Aug-2025`).
const DISPLAY_FORMAT: &str = "%d-%b-%Y";

/// Parse a day string in ISO `YYYY-MM-DD` or display `DD-Mon-YYYY` form.
///
/// Returns `None` for anything else; the query boundary treats that as an
/// empty day, not a hard failure.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, DISPLAY_FORMAT))
        .ok()
}
