use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use stockmotion::{
    AnimationOptions, ChartRenderer, FrameIndex, FrameRenderer, InvestmentPolicy,
    ProgressObserver, compute_viewport, prepare, read_price_series, render_to_mp4,
};

#[derive(Parser, Debug)]
#[command(name = "stockmotion", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the full animation as an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Input price CSV with `date,close` columns.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// TTF/OTF font used for all chart text.
    #[arg(long)]
    font: PathBuf,

    /// JSON file of animation options; individual flags override its values.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Rebase the price curve to this lump-sum starting capital.
    #[arg(long, conflicts_with = "monthly")]
    lump_sum: Option<f64>,

    /// Simulate investing this amount at the start of every month.
    #[arg(long)]
    monthly: Option<f64>,

    /// Frames a monthly contribution is smoothed over.
    #[arg(long)]
    smoothing: Option<usize>,

    /// Total output frames.
    #[arg(long)]
    frames: Option<usize>,

    /// Output frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Output width in pixels (must be even).
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (must be even).
    #[arg(long)]
    height: Option<u32>,

    /// Currency symbol for axis and value labels.
    #[arg(long)]
    currency: Option<String>,

    /// Write the derived per-frame series to this CSV before rendering.
    #[arg(long)]
    dump_series: Option<PathBuf>,
}

impl CommonArgs {
    fn options(&self) -> anyhow::Result<AnimationOptions> {
        let mut opts = match &self.options {
            Some(path) => AnimationOptions::from_json_path(path)?,
            None => AnimationOptions::default(),
        };
        if let Some(frames) = self.frames {
            opts.target_frame_count = frames;
        }
        if let Some(fps) = self.fps {
            opts.fps = fps;
        }
        if let Some(width) = self.width {
            opts.canvas.width = width;
        }
        if let Some(height) = self.height {
            opts.canvas.height = height;
        }
        if let Some(currency) = &self.currency {
            opts.currency_symbol = currency.clone();
        }
        if let Some(smoothing) = self.smoothing {
            opts.smoothing_frames = smoothing;
        }
        if self.dump_series.is_some() {
            opts.series_dump_path = self.dump_series.clone();
        }
        Ok(opts)
    }

    fn policy(&self, opts: &AnimationOptions) -> InvestmentPolicy {
        if let Some(amount) = self.lump_sum {
            InvestmentPolicy::LumpSum { amount }
        } else if let Some(amount_per_period) = self.monthly {
            InvestmentPolicy::Recurring {
                amount_per_period,
                smoothing_frames: opts.smoothing_frames,
            }
        } else {
            InvestmentPolicy::PriceOnly
        }
    }

    fn font_bytes(&self) -> anyhow::Result<Vec<u8>> {
        std::fs::read(&self.font)
            .with_context(|| format!("failed to read font '{}'", self.font.display()))
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,

    /// Suppress the per-frame progress line.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

/// Prints a carriage-return progress percentage to stderr.
struct StderrProgress {
    last_percent: u64,
}

impl StderrProgress {
    fn new() -> Self {
        Self { last_percent: u64::MAX }
    }
}

impl ProgressObserver for StderrProgress {
    fn frame_rendered(&mut self, frame: FrameIndex, total: u64) {
        let percent = (frame.0 + 1) * 100 / total.max(1);
        if percent != self.last_percent {
            self.last_percent = percent;
            eprint!("\rrendering: {percent:3}%");
            let _ = std::io::stderr().flush();
        }
        if frame.0 + 1 == total {
            eprintln!();
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let series = read_price_series(&args.common.in_path)?;
    let opts = args.common.options()?;
    let policy = args.common.policy(&opts);
    let font_bytes = args.common.font_bytes()?;

    if args.quiet {
        stockmotion::render_to_mp4_silent(
            &series,
            &policy,
            &opts,
            font_bytes,
            &args.out,
            args.overwrite,
        )?;
    } else {
        render_to_mp4(
            &series,
            &policy,
            &opts,
            font_bytes,
            &args.out,
            args.overwrite,
            &mut StderrProgress::new(),
        )?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let series = read_price_series(&args.common.in_path)?;
    let opts = args.common.options()?;
    let policy = args.common.policy(&opts);
    let font_bytes = args.common.font_bytes()?;

    let driver = prepare(&series, &policy, &opts)?;
    let chart = driver.series().clone();
    let total = chart.len() as u64;
    if args.frame >= total {
        anyhow::bail!("frame {} out of range (animation has {total} frames)", args.frame);
    }

    // Replay the viewport recurrence up to the requested frame so the single
    // frame matches what the full animation would show.
    let viewport_opts = opts.viewport_options();
    let (mut viewport, mut running_y_max) = compute_viewport(&chart, 0, 0.0, &viewport_opts);
    for k in 1..=args.frame as usize {
        let (v, updated) = compute_viewport(&chart, k, running_y_max, &viewport_opts);
        running_y_max = updated;
        viewport = v;
    }

    let mut renderer = ChartRenderer::new(
        opts.canvas,
        opts.style.clone(),
        opts.currency_symbol.clone(),
        opts.label_offset_fraction,
        font_bytes,
    )?;
    let frame = renderer.render(&viewport, &chart, args.frame as usize)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
