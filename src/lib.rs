//! Stockmotion turns a historical price time series into a fixed-length,
//! uniformly-paced animated chart video.
//!
//! # Pipeline overview
//!
//! 1. **Resample**: irregular trading-day series -> exactly N evenly time-spaced
//!    samples ([`resample`])
//! 2. **Simulate** (optional): resampled prices + [`InvestmentPolicy`] ->
//!    portfolio value / cumulative-contribution series ([`simulate`])
//! 3. **Animate**: per-frame incremental reveal with monotonic, flicker-free
//!    viewport rescaling ([`AnimationDriver`])
//! 4. **Encode**: stream [`FrameRGBA`] frames to a [`FrameSink`], typically the
//!    system `ffmpeg` binary for MP4 output ([`FfmpegSink`])
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: resampling, simulation and viewport
//!   computation are pure; the only cross-frame state (the running y-axis
//!   maximum) is threaded explicitly through the driver loop.
//! - **No IO in the hot loop**: the input series is validated, resampled and
//!   simulated before the first frame renders; mid-sequence failures abort the
//!   sink and never leave a partial output file behind.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animate;
mod config;
mod encode;
mod format;
mod foundation;
mod pipeline;
mod portfolio;
mod render;
mod series;

pub use animate::driver::{
    AnimationDriver, CancelToken, DriverState, NullProgress, ProgressObserver,
};
pub use animate::viewport::{Viewport, ViewportOptions, compute_viewport};
pub use config::{AnimationOptions, ChartStyle};
pub use encode::ffmpeg::{EncodeConfig, FfmpegSink, ensure_parent_dir, is_ffmpeg_on_path};
pub use encode::sink::{FrameSink, InMemorySink, PngDirSink, SinkConfig};
pub use format::format_currency;
pub use foundation::core::{Canvas, FrameIndex};
pub use foundation::error::{Error, Result};
pub use pipeline::{prepare, render_to_mp4, render_to_mp4_silent};
pub use portfolio::policy::InvestmentPolicy;
pub use portfolio::simulate::{ChartSeries, PortfolioSeries, simulate};
pub use render::chart::{ChartRenderer, FrameRenderer};
pub use render::frame::FrameRGBA;
pub use render::ticks::nice_ticks;
pub use series::csv::{read_price_series, write_chart_series};
pub use series::resample::{ResampledSeries, resample};
pub use series::time_series::{TimePoint, TimeSeries, axis_seconds, axis_timestamp};
