use crate::portfolio::simulate::ChartSeries;
use crate::series::time_series::axis_seconds;

/// One day of runway on the x axis, in axis units (seconds).
const DAY_SECONDS: f64 = 86_400.0;

/// The visible data window for one frame, in axis units (x: seconds since the
/// Unix epoch, y: currency units).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Left edge; pinned to the series start.
    pub x_min: f64,
    /// Right edge; grows monotonically with a lookahead runway.
    pub x_max: f64,
    /// Bottom edge; never below zero.
    pub y_min: f64,
    /// Top edge; derived from the running maximum, never shrinks.
    pub y_max: f64,
}

/// Tunables for [`compute_viewport`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportOptions {
    /// Number of leading points framed by the frame-0 zoom window.
    pub initial_zoom_frames: usize,
    /// Fraction of the y extent added as margin above and below.
    pub y_margin_fraction: f64,
    /// Fraction of the elapsed x span added as runway past the revealed edge.
    pub x_lookahead_fraction: f64,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            initial_zoom_frames: 60,
            y_margin_fraction: 0.1,
            x_lookahead_fraction: 0.1,
        }
    }
}

/// Compute the viewport for frame `revealed`, threading the running y-axis
/// maximum explicitly.
///
/// Pure function of the revealed prefix and the prior running maximum: given
/// the same series, frame index and prior maximum, the output is identical.
/// The returned maximum is `max(prior, local_max)` and therefore never
/// decreases across consecutive frames, which keeps the top edge from
/// jittering as new extremes appear.
pub fn compute_viewport(
    series: &ChartSeries,
    revealed: usize,
    running_y_max: f64,
    opts: &ViewportOptions,
) -> (Viewport, f64) {
    let n = series.len();
    let x_min = axis_seconds(series.timestamp(0));

    let x_max = if revealed == 0 {
        // Deliberate zoom-in-then-reveal effect: frame 0 frames the first few
        // points before the running formula takes over.
        let zoom_end = opts.initial_zoom_frames.min(n - 1);
        axis_seconds(series.timestamp(zoom_end)) + DAY_SECONDS
    } else if revealed == 1 {
        x_min + DAY_SECONDS
    } else {
        let last = axis_seconds(series.timestamp(revealed - 1));
        let runway = opts.x_lookahead_fraction * (last - x_min);
        if runway > 0.0 { last + runway } else { x_min + DAY_SECONDS }
    };

    // Frame 0 has no revealed points yet; it sees the first sample so the
    // initial zoom window has a usable y extent.
    let seen = revealed.clamp(1, n);
    let mut local_min = f64::INFINITY;
    let mut local_max = f64::NEG_INFINITY;
    for i in 0..seen {
        let v = series.value(i);
        local_min = local_min.min(v);
        local_max = local_max.max(v);
        if let Some(inv) = series.invested(i) {
            local_min = local_min.min(inv);
            local_max = local_max.max(inv);
        }
    }

    let updated_y_max = running_y_max.max(local_max);
    let margin = opts.y_margin_fraction * (updated_y_max - local_min);
    let mut y_min = (local_min - margin).max(0.0);
    let mut y_max = updated_y_max + margin;
    if y_max - y_min <= 0.0 {
        // Flat revealed prefix: pad symmetrically so the window keeps a
        // positive height, without breaking the zero floor.
        let pad = updated_y_max.abs().max(1.0) * 0.05;
        y_min = (y_min - pad).max(0.0);
        y_max += pad;
    }

    (
        Viewport {
            x_min,
            x_max,
            y_min,
            y_max,
        },
        updated_y_max,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/animate/viewport.rs"]
mod tests;
