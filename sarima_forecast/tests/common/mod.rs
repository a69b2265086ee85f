#![allow(dead_code)]

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use sarima_forecast::data::{MonthlySeries, RawRecord};
use sarima_forecast::models::{ArimaOrder, OrderCandidate, SeasonalOrder};
use std::io::Write;
use tempfile::NamedTempFile;

pub const HEADER: &str = "KATEGORIE,GRUND,JAHR,MONAT,WERT,VORJAHRESWERT,VERAEND_VORMONAT_PROZENT,VERAEND_VORJAHRESMONAT_PROZENT,ZWOELF_MONATE_MITTELWERT";

pub fn month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

pub fn candidate(order: (usize, usize, usize), seasonal: (usize, usize, usize)) -> OrderCandidate {
    OrderCandidate::new(
        ArimaOrder::new(order.0, order.1, order.2),
        SeasonalOrder::new(seasonal.0, seasonal.1, seasonal.2, 12).unwrap(),
    )
}

/// Yearly cycle plus noise around a level of 40, reproducible per seed
pub fn seasonal_values(months: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 2.0).unwrap();

    (0..months)
        .map(|t| {
            let phase = 2.0 * std::f64::consts::PI * (t % 12) as f64 / 12.0;
            40.0 + 10.0 * phase.sin() + noise.sample(&mut rng)
        })
        .collect()
}

pub fn seasonal_series(start: NaiveDate, months: usize, seed: u64) -> MonthlySeries {
    MonthlySeries::from_start(start, seasonal_values(months, seed)).unwrap()
}

/// Monthly records for every month of `years`, with yearly totals mixed in
pub fn monthly_records(category: &str, reason: &str, years: std::ops::RangeInclusive<i32>) -> Vec<RawRecord> {
    let mut records = Vec::new();
    for year in years {
        records.push(RawRecord::monthly(category, reason, "Summe", Some(999.0)));
        for m in 1..=12 {
            let code = format!("{}{:02}", year, m);
            let value = (year - 2000) as f64 * 12.0 + m as f64;
            records.push(RawRecord::monthly(category, reason, &code, Some(value)));
        }
    }
    records
}

/// Write a table in the source layout to a temporary CSV file
pub fn write_table(rows: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

/// Source rows for `category`/`reason` over `years`, newest first as published
pub fn table_rows(category: &str, reason: &str, years: std::ops::RangeInclusive<i32>, seed: u64) -> Vec<String> {
    let span = (*years.end() - *years.start() + 1) as usize;
    let values = seasonal_values(span * 12, seed);
    let mut rows = Vec::new();

    for (y, year) in years.enumerate().collect::<Vec<_>>().into_iter().rev() {
        let total: f64 = values[y * 12..(y + 1) * 12].iter().map(|v| v.round()).sum();
        rows.push(format!("{},{},{},Summe,{},,,,", category, reason, year, total));
        for m in (1..=12).rev() {
            let value = values[y * 12 + m - 1].round();
            rows.push(format!("{},{},{},{}{:02},{},,,,", category, reason, year, year, m, value));
        }
    }
    rows
}
