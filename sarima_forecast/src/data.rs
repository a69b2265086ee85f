//! Raw accident records and monthly series preparation

use crate::error::{ForecastError, Result};
use crate::utils::{add_months, months_between, parse_month_code};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Column names of the source table, in file order
pub const RAW_COLUMNS: [&str; 9] = [
    "KATEGORIE",
    "GRUND",
    "JAHR",
    "MONAT",
    "WERT",
    "VORJAHRESWERT",
    "VERAEND_VORMONAT_PROZENT",
    "VERAEND_VORJAHRESMONAT_PROZENT",
    "ZWOELF_MONATE_MITTELWERT",
];

/// Month code marking a yearly total row
pub const YEARLY_TOTAL_SENTINEL: &str = "Summe";

/// One row of the source table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Accident category (`KATEGORIE`)
    pub category: String,
    /// Accident reason (`GRUND`)
    pub reason: String,
    /// Calendar year (`JAHR`)
    pub year: i32,
    /// `YYYYMM` month code or the yearly total sentinel (`MONAT`)
    pub month_code: String,
    /// Observed count (`WERT`)
    pub value: Option<f64>,
    /// Value of the same month one year earlier
    pub previous_year_value: Option<f64>,
    /// Change against the previous month in percent
    pub change_previous_month_pct: Option<f64>,
    /// Change against the same month of the previous year in percent
    pub change_previous_year_month_pct: Option<f64>,
    /// Twelve-month rolling mean
    pub twelve_month_mean: Option<f64>,
}

impl RawRecord {
    /// Monthly record with only the fields the preparer looks at
    pub fn monthly(category: &str, reason: &str, month_code: &str, value: Option<f64>) -> Self {
        let year = month_code
            .get(..4)
            .and_then(|y| y.parse().ok())
            .unwrap_or_default();

        Self {
            category: category.to_string(),
            reason: reason.to_string(),
            year,
            month_code: month_code.to_string(),
            value,
            previous_year_value: None,
            change_previous_month_pct: None,
            change_previous_year_month_pct: None,
            twelve_month_mean: None,
        }
    }

    /// Whether this row is a yearly total rather than a single month
    pub fn is_yearly_total(&self) -> bool {
        self.month_code.trim() == YEARLY_TOTAL_SENTINEL
    }
}

/// Data loader for the accident table
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load raw records from a comma-delimited CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Convert an already loaded DataFrame into raw records
    ///
    /// The nine columns are matched by name; a table with exactly nine
    /// differently named columns is renamed positionally.
    pub fn from_dataframe(df: DataFrame) -> Result<Vec<RawRecord>> {
        let df = Self::normalize_columns(df)?;

        let category = text_column(&df, RAW_COLUMNS[0])?;
        let reason = text_column(&df, RAW_COLUMNS[1])?;
        let year = text_column(&df, RAW_COLUMNS[2])?;
        let month = text_column(&df, RAW_COLUMNS[3])?;
        let value = text_column(&df, RAW_COLUMNS[4])?;
        let previous_year = text_column(&df, RAW_COLUMNS[5])?;
        let change_month = text_column(&df, RAW_COLUMNS[6])?;
        let change_year_month = text_column(&df, RAW_COLUMNS[7])?;
        let rolling_mean = text_column(&df, RAW_COLUMNS[8])?;

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            records.push(RawRecord {
                category: category[row].clone().unwrap_or_default(),
                reason: reason[row].clone().unwrap_or_default(),
                year: parse_year(year[row].as_deref(), row)?,
                month_code: month[row].clone().unwrap_or_default(),
                value: parse_number(value[row].as_deref()),
                previous_year_value: parse_number(previous_year[row].as_deref()),
                change_previous_month_pct: parse_number(change_month[row].as_deref()),
                change_previous_year_month_pct: parse_number(change_year_month[row].as_deref()),
                twelve_month_mean: parse_number(rolling_mean[row].as_deref()),
            });
        }

        Ok(records)
    }

    fn normalize_columns(df: DataFrame) -> Result<DataFrame> {
        let names = df.get_column_names();
        if RAW_COLUMNS.iter().all(|required| names.contains(required)) {
            return Ok(df.select(RAW_COLUMNS)?);
        }

        if df.width() != RAW_COLUMNS.len() {
            return Err(ForecastError::DataFormat(format!(
                "Expected {} columns ({}), found {}: {:?}",
                RAW_COLUMNS.len(),
                RAW_COLUMNS.join(", "),
                df.width(),
                names
            )));
        }

        let mut df = df;
        df.set_column_names(&RAW_COLUMNS)?;
        Ok(df)
    }
}

/// Read a column as trimmed text, whatever type the reader inferred
fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)
        .map_err(|e| ForecastError::DataFormat(format!("Column '{}' not found: {}", name, e)))?
        .cast(&DataType::Utf8)?;

    let values = series
        .utf8()?
        .into_iter()
        .map(|cell| cell.map(|text| text.trim().to_string()))
        .collect();

    Ok(values)
}

fn parse_year(cell: Option<&str>, row: usize) -> Result<i32> {
    cell.and_then(|text| text.parse::<i32>().ok())
        .ok_or_else(|| {
            ForecastError::DataFormat(format!("Row {}: year {:?} is not an integer", row + 1, cell))
        })
}

/// Numeric coercion: empty or unparsable cells become missing
fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.filter(|text| !text.is_empty())
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Which rows of the table form the series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Required category
    pub category: String,
    /// Required reason (the aggregate over all reasons)
    pub reason: String,
}

impl FilterCriteria {
    /// Create new filter criteria
    pub fn new(category: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            reason: reason.into(),
        }
    }

    fn matches(&self, record: &RawRecord) -> bool {
        record.category == self.category && record.reason == self.reason && !record.is_yearly_total()
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::new("Alkoholunfälle", "insgesamt")
    }
}

/// Gap-free monthly series of month-start dates and values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl MonthlySeries {
    /// Create a series, checking that the dates are consecutive month starts
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "{} dates but {} values",
                dates.len(),
                values.len()
            )));
        }

        if let Some(date) = dates.iter().find(|date| date.day() != 1) {
            return Err(ForecastError::IrregularSeries(format!(
                "{} is not the first day of a month",
                date
            )));
        }

        for pair in dates.windows(2) {
            match months_between(pair[0], pair[1]) {
                1 => {}
                0 => {
                    return Err(ForecastError::IrregularSeries(format!(
                        "Duplicate observation for {}",
                        pair[1].format("%Y-%m")
                    )))
                }
                step if step < 0 => {
                    return Err(ForecastError::IrregularSeries(format!(
                        "{} follows {} out of order",
                        pair[1].format("%Y-%m"),
                        pair[0].format("%Y-%m")
                    )))
                }
                step => {
                    return Err(ForecastError::IrregularSeries(format!(
                        "{} month(s) missing between {} and {}",
                        step - 1,
                        pair[0].format("%Y-%m"),
                        pair[1].format("%Y-%m")
                    )))
                }
            }
        }

        Ok(Self { dates, values })
    }

    /// Create a series of consecutive months starting at `start`
    pub fn from_start(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let dates = (0..values.len())
            .map(|offset| {
                add_months(start, offset).ok_or_else(|| {
                    ForecastError::InvalidDate(format!("{} + {} months overflows", start, offset))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(dates, values)
    }

    /// Month-start dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observed values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of months
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First month, if any
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last month, if any
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over (date, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Split into the months before `cutoff` and the months from `cutoff` on
    pub fn split_at_date(&self, cutoff: NaiveDate) -> (Self, Self) {
        let index = self.dates.partition_point(|date| *date < cutoff);

        (
            Self {
                dates: self.dates[..index].to_vec(),
                values: self.values[..index].to_vec(),
            },
            Self {
                dates: self.dates[index..].to_vec(),
                values: self.values[index..].to_vec(),
            },
        )
    }
}

/// Output of the preparer: train and test partitions plus the full series
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    /// Months strictly before the cutoff
    pub train: MonthlySeries,
    /// Months at or after the cutoff
    pub test: MonthlySeries,
    /// All months
    pub full: MonthlySeries,
}

/// Turn raw records into a gap-free monthly series split at `cutoff`
pub fn prepare(
    records: &[RawRecord],
    criteria: &FilterCriteria,
    cutoff: NaiveDate,
) -> Result<PreparedSeries> {
    let selected: Vec<&RawRecord> = records.iter().filter(|r| criteria.matches(r)).collect();
    if selected.is_empty() {
        return Err(ForecastError::EmptySeries(format!(
            "No monthly rows for category '{}' and reason '{}'",
            criteria.category, criteria.reason
        )));
    }

    let mut observations: Vec<(NaiveDate, f64)> = selected
        .iter()
        .filter_map(|record| Some((parse_month_code(&record.month_code)?, record.value?)))
        .collect();
    if observations.is_empty() {
        return Err(ForecastError::EmptySeries(format!(
            "All {} matching rows lack a value or a valid month code",
            selected.len()
        )));
    }

    observations.sort_by_key(|(date, _)| *date);
    let (dates, values) = observations.into_iter().unzip();
    let full = MonthlySeries::new(dates, values)?;
    let (train, test) = full.split_at_date(cutoff);

    tracing::debug!(
        rows = selected.len(),
        months = full.len(),
        train = train.len(),
        test = test.len(),
        "prepared monthly series"
    );

    Ok(PreparedSeries { train, test, full })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_coercion() {
        assert_eq!(parse_number(Some("42")), Some(42.0));
        assert_eq!(parse_number(Some("4.5")), Some(4.5));
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(Some("n/a")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_yearly_total_detection() {
        let total = RawRecord::monthly("Alkoholunfälle", "insgesamt", "Summe", Some(400.0));
        let month = RawRecord::monthly("Alkoholunfälle", "insgesamt", "202001", Some(30.0));

        assert!(total.is_yearly_total());
        assert!(!month.is_yearly_total());
        assert_eq!(month.year, 2020);
    }

    #[test]
    fn test_split_at_date_boundary() {
        let start = NaiveDate::from_ymd_opt(2019, 11, 1).unwrap();
        let series = MonthlySeries::from_start(start, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let cutoff = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let (train, test) = series.split_at_date(cutoff);
        assert_eq!(train.values(), &[1.0, 2.0]);
        assert_eq!(test.values(), &[3.0, 4.0]);
        assert_eq!(test.first_date(), Some(cutoff));
    }
}
