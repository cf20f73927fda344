use chrono::{Datelike, NaiveDate, Utc};
use std::str::FromStr;

/// Parse a club watch date written as `M/D/Y` (2- or 4-digit year).
///
/// Two-digit years below 50 are 20xx, the rest 19xx. Years before 1900 or
/// more than five years past `current_year` are rejected, as are impossible
/// calendar dates such as Feb 30. Anything malformed yields `None`.
pub fn parse_watch_date(input: &str, current_year: i32) -> Option<NaiveDate> {
    let mut parts = input.trim().split('/');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let month: u32 = digits(month)?;
    let day: u32 = digits(day)?;
    let year_text = year.trim();
    let short: i32 = digits(year_text)?;
    let year = match year_text.len() {
        2 if short < 50 => 2000 + short,
        2 => 1900 + short,
        4 => short,
        _ => return None,
    };

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    if year < 1900 || year > current_year + 5 {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// [`parse_watch_date`] against the current UTC year.
pub fn parse_watch_date_today(input: &str) -> Option<NaiveDate> {
    parse_watch_date(input, Utc::now().year())
}

/// Whole calendar days from `start` to `end`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

fn digits<T: FromStr>(text: &str) -> Option<T> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
