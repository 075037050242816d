use super::*;
use approx::assert_abs_diff_eq;
use chrono::NaiveDate;

fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Daily series from `start` for `days` samples, values supplied per day.
fn daily(start: NaiveDateTime, values: &[f64]) -> ResampledSeries {
    let points: Vec<TimePoint> = values
        .iter()
        .enumerate()
        .map(|(i, &value)| TimePoint {
            at: start + chrono::Duration::days(i as i64),
            value,
        })
        .collect();
    let n = points.len();
    resample(&TimeSeries::new(points).unwrap(), n).unwrap()
}

/// Flat daily series spanning `[start, end]` inclusive.
fn flat_daily(start: NaiveDateTime, end: NaiveDateTime, value: f64) -> ResampledSeries {
    let days = (end - start).num_days() as usize + 1;
    daily(start, &vec![value; days])
}

#[test]
fn price_only_passes_the_series_through() {
    let series = daily(at(2024, 1, 1), &[10.0, 12.0, 11.0]);
    let chart = simulate(&series, &InvestmentPolicy::PriceOnly).unwrap();
    match chart {
        ChartSeries::Price(out) => assert_eq!(out.points(), series.points()),
        other => panic!("expected price series, got {other:?}"),
    }
}

#[test]
fn simulate_rejects_invalid_policies() {
    let series = daily(at(2024, 1, 1), &[10.0, 12.0]);
    let err = simulate(&series, &InvestmentPolicy::LumpSum { amount: -1.0 });
    assert!(matches!(err, Err(Error::InvalidPolicy(_))));
}

#[test]
fn lump_sum_rebases_to_starting_capital() {
    let series = daily(at(2024, 1, 1), &[50.0, 75.0, 100.0]);
    let chart = simulate(&series, &InvestmentPolicy::LumpSum { amount: 1000.0 }).unwrap();

    assert!(!chart.shows_invested());
    assert_abs_diff_eq!(chart.value(0), 1000.0);
    assert_abs_diff_eq!(chart.value(1), 1500.0, epsilon = 1e-9);
    assert_abs_diff_eq!(chart.value(2), 2000.0, epsilon = 1e-9);
}

#[test]
fn lump_sum_requires_a_positive_first_price() {
    let series = daily(at(2024, 1, 1), &[0.0, 10.0]);
    let err = simulate(&series, &InvestmentPolicy::LumpSum { amount: 1000.0 });
    assert!(matches!(err, Err(Error::Validation(_))));
}

#[test]
fn recurring_at_flat_price_accumulates_exact_contributions() {
    // One calendar year at a flat price of 10: twelve monthly contributions
    // of 100 buy 10 shares each.
    let series = flat_daily(at(2024, 1, 1), at(2024, 12, 31), 10.0);
    let chart = simulate(
        &series,
        &InvestmentPolicy::Recurring {
            amount_per_period: 100.0,
            smoothing_frames: 10,
        },
    )
    .unwrap();

    assert!(chart.shows_invested());
    let last = chart.len() - 1;
    assert_abs_diff_eq!(chart.invested(last).unwrap(), 1200.0, epsilon = 1e-6);
    assert_abs_diff_eq!(chart.value(last), 1200.0, epsilon = 1e-6);
}

#[test]
fn invested_is_monotonically_non_decreasing() {
    let series = flat_daily(at(2024, 1, 1), at(2024, 6, 30), 25.0);
    let chart = simulate(
        &series,
        &InvestmentPolicy::Recurring {
            amount_per_period: 100.0,
            smoothing_frames: 10,
        },
    )
    .unwrap();

    let mut prev = 0.0;
    for i in 0..chart.len() {
        let invested = chart.invested(i).unwrap();
        assert!(invested >= prev - 1e-9, "invested dipped at frame {i}");
        prev = invested;
    }
}

#[test]
fn smoothing_window_is_clamped_at_the_series_end() {
    // 7 daily samples crossing a month boundary at index 2: the first window
    // is clamped to 7 frames and the second to 5, but each still delivers the
    // full monthly amount.
    let series = daily(at(2024, 1, 30), &[10.0; 7]);
    let chart = simulate(
        &series,
        &InvestmentPolicy::Recurring {
            amount_per_period: 100.0,
            smoothing_frames: 10,
        },
    )
    .unwrap();

    let last = chart.len() - 1;
    assert_abs_diff_eq!(chart.invested(last).unwrap(), 200.0, epsilon = 1e-6);
}

#[test]
fn recurring_requires_positive_prices_at_contribution_frames() {
    let series = daily(at(2024, 1, 1), &[0.0, 10.0, 10.0]);
    let err = simulate(
        &series,
        &InvestmentPolicy::Recurring {
            amount_per_period: 100.0,
            smoothing_frames: 1,
        },
    );
    assert!(matches!(err, Err(Error::Validation(_))));
}

#[test]
fn month_events_fire_on_first_frame_and_month_changes() {
    let points: Vec<TimePoint> = [
        at(2024, 1, 30),
        at(2024, 1, 31),
        at(2024, 2, 1),
        at(2024, 2, 2),
        at(2024, 3, 1),
    ]
    .into_iter()
    .map(|ts| TimePoint { at: ts, value: 1.0 })
    .collect();

    assert_eq!(month_event_frames(&points), vec![0, 2, 4]);
}

#[test]
fn contribution_value_tracks_price_moves() {
    // Single contribution at frame 0, price then doubles: the holdings value
    // doubles while invested stays flat.
    let series = daily(at(2024, 1, 1), &[10.0, 15.0, 20.0]);
    let chart = simulate(
        &series,
        &InvestmentPolicy::Recurring {
            amount_per_period: 100.0,
            smoothing_frames: 1,
        },
    )
    .unwrap();

    assert_abs_diff_eq!(chart.invested(0).unwrap(), 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(chart.value(0), 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(chart.value(2), 200.0, epsilon = 1e-6);
    assert_abs_diff_eq!(chart.invested(2).unwrap(), 100.0, epsilon = 1e-6);
}
