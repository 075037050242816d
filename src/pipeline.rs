//! End-to-end orchestration: validate, resample, simulate, animate, encode.

use std::path::Path;

use crate::animate::driver::{AnimationDriver, CancelToken, NullProgress, ProgressObserver};
use crate::config::AnimationOptions;
use crate::encode::ffmpeg::{EncodeConfig, FfmpegSink};
use crate::foundation::error::Result;
use crate::portfolio::policy::InvestmentPolicy;
use crate::portfolio::simulate::simulate;
use crate::render::chart::ChartRenderer;
use crate::series::csv::write_chart_series;
use crate::series::resample::resample;
use crate::series::time_series::TimeSeries;

/// Validate everything up front and build a ready-to-run driver.
///
/// All fallible preparation happens here, before any frame renders: option
/// and policy validation, resampling onto the target frame count, and the
/// investment simulation. The returned driver can only fail mid-run on sink
/// or renderer errors.
#[tracing::instrument(skip_all, fields(points = series.len(), frames = opts.target_frame_count))]
pub fn prepare(
    series: &TimeSeries,
    policy: &InvestmentPolicy,
    opts: &AnimationOptions,
) -> Result<AnimationDriver> {
    opts.validate()?;
    policy.validate()?;

    let resampled = resample(series, opts.target_frame_count)?;
    let chart = simulate(&resampled, policy)?;

    if let Some(path) = &opts.series_dump_path {
        write_chart_series(path, &chart)?;
        tracing::info!(path = %path.display(), "wrote derived series dump");
    }

    AnimationDriver::new(chart, opts.viewport_options(), opts.canvas, opts.fps)
}

/// Run the whole pipeline and encode straight to an MP4 file.
///
/// Convenience wrapper over [`prepare`] plus a [`ChartRenderer`] and an
/// [`FfmpegSink`]; `font_bytes` is the TTF/OTF used for all chart text.
#[tracing::instrument(skip_all, fields(out = %out_path.display()))]
pub fn render_to_mp4(
    series: &TimeSeries,
    policy: &InvestmentPolicy,
    opts: &AnimationOptions,
    font_bytes: Vec<u8>,
    out_path: &Path,
    overwrite: bool,
    progress: &mut dyn ProgressObserver,
) -> Result<()> {
    let mut driver = prepare(series, policy, opts)?;

    let mut renderer = ChartRenderer::new(
        opts.canvas,
        opts.style.clone(),
        opts.currency_symbol.clone(),
        opts.label_offset_fraction,
        font_bytes,
    )?;
    let mut sink = FfmpegSink::new(
        EncodeConfig {
            width: opts.canvas.width,
            height: opts.canvas.height,
            fps: opts.fps,
            out_path: out_path.to_path_buf(),
            overwrite,
        },
        opts.style.background,
    )?;

    driver.run(&mut renderer, &mut sink, progress, &CancelToken::new())
}

/// [`render_to_mp4`] without progress reporting.
pub fn render_to_mp4_silent(
    series: &TimeSeries,
    policy: &InvestmentPolicy,
    opts: &AnimationOptions,
    font_bytes: Vec<u8>,
    out_path: &Path,
    overwrite: bool,
) -> Result<()> {
    render_to_mp4(
        series,
        policy,
        opts,
        font_bytes,
        out_path,
        overwrite,
        &mut NullProgress,
    )
}
