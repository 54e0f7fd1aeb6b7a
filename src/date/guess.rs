use chrono::NaiveDate;

use crate::config::DatePattern;

/// Find a date embedded in a filename.
///
/// Patterns are tried in order and the first one that matches anywhere in
/// the name decides. If its digits do not form a real calendar date the
/// result is `None`; later patterns are not consulted.
pub fn guess_date_from_filename(patterns: &[DatePattern], filename: &str) -> Option<NaiveDate> {
    let caps = patterns.iter().find_map(|p| p.regex().captures(filename))?;

    let year: i32 = caps.name("year")?.as_str().parse().ok()?;
    let month: u32 = caps.name("month")?.as_str().parse().ok()?;
    let day: u32 = caps.name("day")?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
