use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::animate::viewport::{ViewportOptions, compute_viewport};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{Error, Result};
use crate::portfolio::simulate::ChartSeries;
use crate::render::chart::FrameRenderer;

/// Cooperative cancellation flag for an in-flight animation.
///
/// Clone the token, hand one clone to the driver and keep the other on the
/// foreground side; the driver checks it once per frame.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next per-frame check.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One-way progress notifications from the frame loop.
///
/// The observer only displays progress, so there is no backpressure: callbacks
/// must be cheap and must not fail.
pub trait ProgressObserver: Send {
    /// Called after frame `frame` (of `total`) has been emitted to the sink.
    fn frame_rendered(&mut self, frame: FrameIndex, total: u64);
}

/// Observer that discards all notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn frame_rendered(&mut self, _frame: FrameIndex, _total: u64) {}
}

/// Driver lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Constructed, no frame emitted yet.
    Initialized,
    /// Emitting frames; the payload is the next frame index.
    Rendering(u64),
    /// All frames emitted and the sink finalized.
    Completed,
    /// Aborted by a component failure or cancellation; no partial output
    /// remains.
    Failed,
}

/// Sequential frame loop: viewport, render, emit, repeat.
///
/// Frame k's viewport depends on frame k-1's running y-maximum, so frames are
/// generated strictly in order and a driver must never be shared between
/// simulations. The driver itself is `Send`; run it on a worker thread and
/// keep a [`CancelToken`] clone plus a [`ProgressObserver`] on the foreground
/// side.
pub struct AnimationDriver {
    series: ChartSeries,
    viewport_opts: ViewportOptions,
    canvas: Canvas,
    fps: u32,
    state: DriverState,
}

impl AnimationDriver {
    /// Build a driver over a fully prepared series.
    ///
    /// `series` must already be resampled to the target frame count; the
    /// driver emits exactly `series.len()` frames.
    pub fn new(
        series: ChartSeries,
        viewport_opts: ViewportOptions,
        canvas: Canvas,
        fps: u32,
    ) -> Result<Self> {
        if series.len() < 2 {
            return Err(Error::insufficient_data(
                "animation needs at least 2 frames",
            ));
        }
        canvas.validate()?;
        if fps == 0 {
            return Err(Error::validation("fps must be > 0"));
        }
        Ok(Self {
            series,
            viewport_opts,
            canvas,
            fps,
            state: DriverState::Initialized,
        })
    }

    /// The series being animated.
    pub fn series(&self) -> &ChartSeries {
        &self.series
    }

    /// Total number of frames this driver emits.
    pub fn frame_count(&self) -> usize {
        self.series.len()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Run the frame loop to completion, cancellation or failure.
    ///
    /// On any error the sink is aborted (discarding in-flight output) and the
    /// driver transitions to [`DriverState::Failed`]; cancellation surfaces as
    /// [`Error::Cancelled`]. A driver cannot be re-run after a terminal state.
    #[tracing::instrument(skip_all, fields(frames = self.frame_count()))]
    pub fn run(
        &mut self,
        renderer: &mut dyn FrameRenderer,
        sink: &mut dyn FrameSink,
        progress: &mut dyn ProgressObserver,
        cancel: &CancelToken,
    ) -> Result<()> {
        if self.state != DriverState::Initialized {
            return Err(Error::validation(
                "animation driver has already run; create a new driver per request",
            ));
        }

        match self.run_inner(renderer, sink, progress, cancel) {
            Ok(()) => {
                self.state = DriverState::Completed;
                tracing::info!(frames = self.frame_count(), "animation completed");
                Ok(())
            }
            Err(e) => {
                self.state = DriverState::Failed;
                sink.abort();
                tracing::warn!(error = %e, "animation aborted, partial output discarded");
                Err(e)
            }
        }
    }

    fn run_inner(
        &mut self,
        renderer: &mut dyn FrameRenderer,
        sink: &mut dyn FrameSink,
        progress: &mut dyn ProgressObserver,
        cancel: &CancelToken,
    ) -> Result<()> {
        let total = self.frame_count() as u64;
        sink.begin(SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: self.fps,
        })?;

        let mut running_y_max = 0.0f64;
        for k in 0..self.frame_count() {
            self.state = DriverState::Rendering(k as u64);
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let (viewport, updated) =
                compute_viewport(&self.series, k, running_y_max, &self.viewport_opts);
            running_y_max = updated;

            let frame = renderer.render(&viewport, &self.series, k)?;
            sink.push_frame(FrameIndex(k as u64), &frame)?;
            progress.frame_rendered(FrameIndex(k as u64), total);
        }

        sink.end()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animate/driver.rs"]
mod tests;
