use crate::foundation::error::{Error, Result};
use crate::series::time_series::{TimePoint, TimeSeries, axis_seconds, axis_timestamp};

/// A [`TimeSeries`] with exactly the requested number of evenly time-spaced
/// samples. Produced only by [`resample`]; immutable once created.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResampledSeries {
    series: TimeSeries,
}

impl ResampledSeries {
    /// Borrow the underlying series.
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    /// Borrow the samples in time order.
    pub fn points(&self) -> &[TimePoint] {
        self.series.points()
    }

    /// Number of samples (the target frame count it was built with).
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Map an irregular series onto `target_frame_count` evenly time-spaced samples
/// via time-weighted linear interpolation.
///
/// The output timestamps are evenly spaced by elapsed wall-clock time between
/// the first and last input timestamps inclusive; both endpoints are carried
/// over exactly. A target timestamp that coincides with an input sample takes
/// that sample's value unchanged. Gaps in the input (weekends, holidays,
/// missing rows) are filled the same way as any other span.
#[tracing::instrument(skip(series), fields(input_len = series.len()))]
pub fn resample(series: &TimeSeries, target_frame_count: usize) -> Result<ResampledSeries> {
    if target_frame_count < 2 {
        return Err(Error::validation("target frame count must be >= 2"));
    }
    if series.len() < 2 {
        return Err(Error::insufficient_data(format!(
            "resampling needs at least 2 samples, got {}",
            series.len()
        )));
    }

    let points = series.points();
    let t0 = axis_seconds(series.first().at);
    let t1 = axis_seconds(series.last().at);
    if t1 <= t0 {
        return Err(Error::insufficient_data(
            "series must span a positive duration",
        ));
    }

    let n = target_frame_count;
    let step = (t1 - t0) / (n as f64 - 1.0);
    let mut out = Vec::with_capacity(n);
    // Index of the segment [bracket, bracket+1] containing the target time.
    let mut bracket = 0usize;

    for i in 0..n {
        if i == 0 {
            out.push(series.first());
            continue;
        }
        if i == n - 1 {
            out.push(series.last());
            continue;
        }

        let target = t0 + step * i as f64;
        while bracket + 2 < points.len() && axis_seconds(points[bracket + 1].at) < target {
            bracket += 1;
        }
        let lo = points[bracket];
        let hi = points[bracket + 1];
        let lo_t = axis_seconds(lo.at);
        let hi_t = axis_seconds(hi.at);
        // Elapsed-time fraction between the bracketing samples, not an index
        // fraction. Exact timestamp matches pass the original value through
        // untouched.
        let value = if target == lo_t {
            lo.value
        } else if target == hi_t {
            hi.value
        } else {
            let w = (target - lo_t) / (hi_t - lo_t);
            lo.value + (hi.value - lo.value) * w
        };
        out.push(TimePoint {
            at: axis_timestamp(target)?,
            value,
        });
    }

    Ok(ResampledSeries {
        series: TimeSeries::new(out)?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/series/resample.rs"]
mod tests;
