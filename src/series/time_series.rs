use chrono::NaiveDateTime;

use crate::foundation::error::{Error, Result};

/// One sample of a time-indexed numeric series.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimePoint {
    /// Sample timestamp.
    pub at: NaiveDateTime,
    /// Sample value.
    pub value: f64,
}

/// An ordered, validated time-indexed numeric series.
///
/// Invariants (enforced by [`TimeSeries::new`]): non-empty, strictly increasing
/// timestamps, finite values. Interpolation additionally requires at least two
/// points spanning a positive duration; that is checked at resample time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeSeries {
    points: Vec<TimePoint>,
}

impl TimeSeries {
    /// Build a series from samples, enforcing the ordering invariants.
    pub fn new(points: Vec<TimePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::insufficient_data("series must be non-empty"));
        }
        for pair in points.windows(2) {
            if pair[1].at <= pair[0].at {
                return Err(Error::validation(format!(
                    "series timestamps must be strictly increasing ({} then {})",
                    pair[0].at, pair[1].at
                )));
            }
        }
        for p in &points {
            if !p.value.is_finite() {
                return Err(Error::validation(format!(
                    "series value at {} is not finite",
                    p.at
                )));
            }
        }
        Ok(Self { points })
    }

    /// Borrow the samples in time order.
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First sample.
    pub fn first(&self) -> TimePoint {
        self.points[0]
    }

    /// Last sample.
    pub fn last(&self) -> TimePoint {
        self.points[self.points.len() - 1]
    }
}

/// Project a timestamp onto the x axis as fractional seconds since the Unix
/// epoch.
///
/// All viewport and interpolation math runs on this projection so that frame
/// spacing is driven by elapsed wall-clock time rather than sample count.
pub fn axis_seconds(at: NaiveDateTime) -> f64 {
    let utc = at.and_utc();
    utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) * 1e-9
}

/// Inverse of [`axis_seconds`]: reconstruct a timestamp from an axis value.
///
/// Sub-second precision is kept to nanosecond resolution; values outside the
/// representable chrono range are rejected.
pub fn axis_timestamp(seconds: f64) -> Result<NaiveDateTime> {
    if !seconds.is_finite() {
        return Err(Error::invalid_input("axis value is not finite"));
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    chrono::DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| Error::invalid_input(format!("axis value {seconds} is out of range")))
}
