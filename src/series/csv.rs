//! CSV input and output for price and derived series.

use std::path::Path;

use anyhow::Context as _;
use chrono::NaiveDate;

use crate::foundation::error::{Error, Result};
use crate::portfolio::simulate::ChartSeries;
use crate::series::time_series::{TimePoint, TimeSeries};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, serde::Deserialize)]
struct PriceRecord {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Close", alias = "Adj Close", alias = "adj_close")]
    close: f64,
}

/// Read a `date,close` CSV into a validated [`TimeSeries`].
///
/// Dates are `YYYY-MM-DD` trading days, anchored at midnight. The usual
/// series invariants apply: at least one row, strictly increasing dates,
/// finite prices.
#[tracing::instrument]
pub fn read_price_series(path: &Path) -> Result<TimeSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open price csv '{}'", path.display()))?;

    let mut points = Vec::new();
    for (row, record) in reader.deserialize::<PriceRecord>().enumerate() {
        let record =
            record.with_context(|| format!("failed to parse row {} of price csv", row + 2))?;
        let date = NaiveDate::parse_from_str(&record.date, DATE_FORMAT).map_err(|e| {
            Error::validation(format!(
                "row {}: bad date '{}' (expected YYYY-MM-DD): {e}",
                row + 2,
                record.date
            ))
        })?;
        let at = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::validation(format!("row {}: unrepresentable date", row + 2)))?;
        points.push(TimePoint {
            at,
            value: record.close,
        });
    }

    tracing::debug!(rows = points.len(), path = %path.display(), "loaded price csv");
    TimeSeries::new(points)
}

/// Dump the derived series to a CSV for inspection.
///
/// Columns are `timestamp,value` plus an `invested` column when the series
/// carries the contribution overlay.
#[tracing::instrument(skip(series), fields(rows = series.len()))]
pub fn write_chart_series(path: &Path, series: &ChartSeries) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create series csv '{}'", path.display()))?;

    let with_invested = series.shows_invested();
    if with_invested {
        writer
            .write_record(["timestamp", "value", "invested"])
            .context("failed to write csv header")?;
    } else {
        writer
            .write_record(["timestamp", "value"])
            .context("failed to write csv header")?;
    }

    for i in 0..series.len() {
        let timestamp = series.timestamp(i).format(TIMESTAMP_FORMAT).to_string();
        let value = series.value(i).to_string();
        match series.invested(i) {
            Some(invested) => writer.write_record([timestamp, value, invested.to_string()]),
            None => writer.write_record([timestamp, value]),
        }
        .with_context(|| format!("failed to write csv row {i}"))?;
    }

    writer.flush().context("failed to flush series csv")?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/series/csv.rs"]
mod tests;
