use super::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::portfolio::policy::InvestmentPolicy;
use crate::portfolio::simulate::simulate;
use crate::series::resample::resample;

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_path(stem: &str, ext: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "stockmotion-csv-test-{}-{stem}-{n}.{ext}",
        std::process::id()
    ))
}

#[test]
fn reads_date_close_csv() {
    let path = temp_path("prices", "csv");
    std::fs::write(
        &path,
        "date,close\n2024-01-02,187.15\n2024-01-03,184.25\n2024-01-04,181.91\n",
    )
    .unwrap();

    let series = read_price_series(&path).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.first().value, 187.15);
    assert_eq!(series.last().value, 181.91);
    assert_eq!(
        series.first().at.date(),
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    );

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn accepts_capitalized_headers() {
    let path = temp_path("caps", "csv");
    std::fs::write(&path, "Date,Close\n2024-01-02,10.0\n2024-01-03,11.0\n").unwrap();
    let series = read_price_series(&path).unwrap();
    assert_eq!(series.len(), 2);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn rejects_bad_dates_and_unordered_rows() {
    let path = temp_path("baddate", "csv");
    std::fs::write(&path, "date,close\n02/01/2024,10.0\n").unwrap();
    assert!(read_price_series(&path).is_err());
    std::fs::remove_file(&path).unwrap();

    let path = temp_path("unordered", "csv");
    std::fs::write(&path, "date,close\n2024-01-03,10.0\n2024-01-02,11.0\n").unwrap();
    assert!(matches!(
        read_price_series(&path),
        Err(Error::Validation(_))
    ));
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn writes_price_series_without_invested_column() {
    let input = TimeSeries::new(vec![
        TimePoint {
            at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            value: 10.0,
        },
        TimePoint {
            at: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            value: 20.0,
        },
    ])
    .unwrap();
    let chart = simulate(
        &resample(&input, 5).unwrap(),
        &InvestmentPolicy::PriceOnly,
    )
    .unwrap();

    let path = temp_path("dump", "csv");
    write_chart_series(&path, &chart).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("timestamp,value"));
    assert_eq!(lines.count(), 5);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn writes_invested_column_for_contribution_series() {
    let input = TimeSeries::new(vec![
        TimePoint {
            at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            value: 10.0,
        },
        TimePoint {
            at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            value: 10.0,
        },
    ])
    .unwrap();
    let chart = simulate(
        &resample(&input, 61).unwrap(),
        &InvestmentPolicy::Recurring {
            amount_per_period: 100.0,
            smoothing_frames: 10,
        },
    )
    .unwrap();

    let path = temp_path("invested", "csv");
    write_chart_series(&path, &chart).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some("timestamp,value,invested"));

    std::fs::remove_file(&path).unwrap();
}
