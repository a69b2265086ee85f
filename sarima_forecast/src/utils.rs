//! Calendar helpers for monthly series

use chrono::{Datelike, Months, NaiveDate};

/// First day of the given year and month, if it exists
pub fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Parse a six-digit `YYYYMM` month code into the first day of that month
pub fn parse_month_code(code: &str) -> Option<NaiveDate> {
    let code = code.trim();
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = code[..4].parse().ok()?;
    let month: u32 = code[4..].parse().ok()?;
    month_start(year, month)
}

/// Number of calendar months from `from` to `to` (negative when `to` is earlier)
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    month_ordinal(to) - month_ordinal(from)
}

fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Shift a date forward by whole months
pub fn add_months(date: NaiveDate, months: usize) -> Option<NaiveDate> {
    let months = u32::try_from(months).ok()?;
    date.checked_add_months(Months::new(months))
}

/// Month starts following `last`, one per forecast step
pub fn future_month_starts(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon)
        .map_while(|step| add_months(last, step))
        .collect()
}
