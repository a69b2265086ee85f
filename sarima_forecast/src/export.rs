//! CSV export of actual values next to a forecast

use crate::data::MonthlySeries;
use crate::error::Result;
use crate::models::ForecastResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One month of the export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
}

/// Merge `history` and `forecast` by month, oldest first
pub fn forecast_rows(history: &MonthlySeries, forecast: &ForecastResult) -> Vec<ForecastRow> {
    let mut months: BTreeMap<NaiveDate, ForecastRow> = history
        .iter()
        .map(|(date, actual)| {
            (
                date,
                ForecastRow {
                    date,
                    actual: Some(actual),
                    forecast: None,
                },
            )
        })
        .collect();

    for (&date, &value) in forecast.dates().iter().zip(forecast.values()) {
        months
            .entry(date)
            .or_insert(ForecastRow {
                date,
                actual: None,
                forecast: None,
            })
            .forecast = Some(value);
    }

    months.into_values().collect()
}

/// Write `date,actual,forecast` rows to `path`; missing values stay empty
pub fn export_forecast<P: AsRef<Path>>(
    path: P,
    history: &MonthlySeries,
    forecast: &ForecastResult,
) -> Result<usize> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let rows = forecast_rows(history, forecast);
    let mut writer = csv::Writer::from_path(path)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = rows.len(), "forecast exported");
    Ok(rows.len())
}
