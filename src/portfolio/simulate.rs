use chrono::{Datelike, NaiveDateTime};

use crate::foundation::error::{Error, Result};
use crate::portfolio::policy::InvestmentPolicy;
use crate::series::resample::{ResampledSeries, resample};
use crate::series::time_series::{TimePoint, TimeSeries};

/// Portfolio value and cumulative contributions on one shared timestamp axis.
///
/// `invested` is monotonically non-decreasing; both columns have the same
/// cardinality as the axis.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PortfolioSeries {
    at: Vec<NaiveDateTime>,
    value: Vec<f64>,
    invested: Vec<f64>,
}

impl PortfolioSeries {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.at.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.at.is_empty()
    }

    /// Shared timestamp axis.
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.at
    }

    /// Current-holdings value column.
    pub fn values(&self) -> &[f64] {
        &self.value
    }

    /// Cumulative-contribution column.
    pub fn invested(&self) -> &[f64] {
        &self.invested
    }

    /// Re-resample both columns onto `target_frame_count` evenly spaced
    /// timestamps, preserving the shared axis.
    pub fn resample(&self, target_frame_count: usize) -> Result<Self> {
        let column = |values: &[f64]| -> Result<TimeSeries> {
            TimeSeries::new(
                self.at
                    .iter()
                    .zip(values)
                    .map(|(&at, &value)| TimePoint { at, value })
                    .collect(),
            )
        };
        let value = resample(&column(&self.value)?, target_frame_count)?;
        let invested = resample(&column(&self.invested)?, target_frame_count)?;
        Ok(Self {
            at: value.points().iter().map(|p| p.at).collect(),
            value: value.points().iter().map(|p| p.value).collect(),
            invested: invested.points().iter().map(|p| p.value).collect(),
        })
    }
}

/// The series an animation displays, with the display mode fixed at
/// construction.
///
/// A rebased lump-sum curve and the contribution-tracking overlay are mutually
/// exclusive display modes; encoding them as distinct variants makes that
/// exclusivity impossible to violate at render time.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartSeries {
    /// Raw price curve, no simulation.
    Price(ResampledSeries),
    /// Price curve rebased to a lump-sum starting capital.
    Rebased(ResampledSeries),
    /// Portfolio value with the cumulative-contribution overlay.
    Contributions(PortfolioSeries),
}

impl ChartSeries {
    /// Number of frames' worth of samples.
    pub fn len(&self) -> usize {
        match self {
            Self::Price(s) | Self::Rebased(s) => s.len(),
            Self::Contributions(p) => p.len(),
        }
    }

    /// Always `false`; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timestamp of sample `i`.
    pub fn timestamp(&self, i: usize) -> NaiveDateTime {
        match self {
            Self::Price(s) | Self::Rebased(s) => s.points()[i].at,
            Self::Contributions(p) => p.timestamps()[i],
        }
    }

    /// Primary-curve value of sample `i`.
    pub fn value(&self, i: usize) -> f64 {
        match self {
            Self::Price(s) | Self::Rebased(s) => s.points()[i].value,
            Self::Contributions(p) => p.values()[i],
        }
    }

    /// Cumulative contributions at sample `i`, when the overlay exists.
    pub fn invested(&self, i: usize) -> Option<f64> {
        match self {
            Self::Price(_) | Self::Rebased(_) => None,
            Self::Contributions(p) => Some(p.invested()[i]),
        }
    }

    /// Whether the cumulative-contribution overlay is drawn.
    pub fn shows_invested(&self) -> bool {
        matches!(self, Self::Contributions(_))
    }
}

/// Convert a resampled price series plus an investment policy into the series
/// the animation will display.
///
/// The output is re-resampled to the input's cardinality, so it always has
/// exactly as many samples as there are frames.
#[tracing::instrument(skip(series), fields(frames = series.len()))]
pub fn simulate(series: &ResampledSeries, policy: &InvestmentPolicy) -> Result<ChartSeries> {
    policy.validate()?;
    match *policy {
        InvestmentPolicy::PriceOnly => Ok(ChartSeries::Price(series.clone())),
        InvestmentPolicy::LumpSum { amount } => rebase_lump_sum(series, amount),
        InvestmentPolicy::Recurring {
            amount_per_period,
            smoothing_frames,
        } => {
            let portfolio = simulate_recurring(series, amount_per_period, smoothing_frames)?;
            Ok(ChartSeries::Contributions(
                portfolio.resample(series.len())?,
            ))
        }
    }
}

fn rebase_lump_sum(series: &ResampledSeries, amount: f64) -> Result<ChartSeries> {
    let first = series.points()[0].value;
    if first <= 0.0 {
        return Err(Error::validation(format!(
            "lump-sum rebasing requires a positive first price, got {first}"
        )));
    }
    let points = series
        .points()
        .iter()
        .map(|p| TimePoint {
            at: p.at,
            value: p.value / first * amount,
        })
        .collect();
    let rebased = TimeSeries::new(points)?;
    Ok(ChartSeries::Rebased(resample(&rebased, series.len())?))
}

fn simulate_recurring(
    series: &ResampledSeries,
    amount_per_period: f64,
    smoothing_frames: usize,
) -> Result<PortfolioSeries> {
    let points = series.points();
    let n = points.len();

    // Per-frame scheduled partial contributions. Overlapping event windows
    // (short months / large windows) accumulate additively.
    let mut scheduled = vec![0.0f64; n];
    for event in month_event_frames(points) {
        let window = smoothing_frames.min(n - event);
        let per_frame = amount_per_period / window as f64;
        for slot in &mut scheduled[event..event + window] {
            *slot += per_frame;
        }
    }

    let mut shares_owned = 0.0f64;
    let mut total_invested = 0.0f64;
    let mut at = Vec::with_capacity(n);
    let mut value = Vec::with_capacity(n);
    let mut invested = Vec::with_capacity(n);

    for (k, p) in points.iter().enumerate() {
        let contribution = scheduled[k];
        if contribution > 0.0 {
            if p.value <= 0.0 {
                return Err(Error::validation(format!(
                    "recurring simulation requires positive prices, got {} at {}",
                    p.value, p.at
                )));
            }
            shares_owned += contribution / p.value;
            total_invested += contribution;
        }
        at.push(p.at);
        value.push(shares_owned * p.value);
        invested.push(total_invested);
    }

    Ok(PortfolioSeries {
        at,
        value,
        invested,
    })
}

/// Frames at which a contribution event occurs: the first frame of each new
/// calendar month encountered in time order. Frame 0 always opens a window.
fn month_event_frames(points: &[TimePoint]) -> Vec<usize> {
    let mut events = Vec::new();
    let mut current: Option<(i32, u32)> = None;
    for (k, p) in points.iter().enumerate() {
        let month = (p.at.year(), p.at.month());
        if current != Some(month) {
            events.push(k);
            current = Some(month);
        }
    }
    events
}

#[cfg(test)]
#[path = "../../tests/unit/portfolio/simulate.rs"]
mod tests;
