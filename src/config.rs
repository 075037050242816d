use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::animate::viewport::ViewportOptions;
use crate::foundation::core::Canvas;
use crate::foundation::error::{Error, Result};

/// Chart colors and drawing metrics.
///
/// Defaults reproduce the dark neon look of the reference chart: near-black
/// background, cyan price curve, pink contribution overlay, white axes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Background fill, straight RGBA8.
    pub background: [u8; 4],
    /// Primary (value) curve and label color.
    pub primary: [u8; 4],
    /// Secondary (invested) curve and label color.
    pub secondary: [u8; 4],
    /// Axis spine and tick label color.
    pub axis: [u8; 4],
    /// Tick label font size in pixels.
    pub font_size: f32,
    /// Current-value label font size in pixels.
    pub label_font_size: f32,
    /// Curve stroke width in pixels.
    pub line_width: f64,
    /// Axis spine width in pixels.
    pub spine_width: f64,
    /// Rough tick count per axis.
    pub tick_count: usize,
    /// Plot inset from the canvas edges in pixels.
    pub padding: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            background: [0x21, 0x21, 0x21, 0xff],
            primary: [0x3a, 0xfd, 0xfd, 0xff],
            secondary: [0xff, 0x69, 0xb4, 0xb4],
            axis: [0xff, 0xff, 0xff, 0xff],
            font_size: 28.0,
            label_font_size: 36.0,
            line_width: 4.0,
            spine_width: 2.0,
            tick_count: 5,
            padding: 140.0,
        }
    }
}

impl ChartStyle {
    /// Check drawing metrics.
    pub fn validate(&self) -> Result<()> {
        if !(self.font_size.is_finite() && self.font_size > 0.0)
            || !(self.label_font_size.is_finite() && self.label_font_size > 0.0)
        {
            return Err(Error::validation("font sizes must be finite and > 0"));
        }
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(Error::validation("line width must be finite and > 0"));
        }
        if !(self.spine_width.is_finite() && self.spine_width > 0.0) {
            return Err(Error::validation("spine width must be finite and > 0"));
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(Error::validation("padding must be finite and >= 0"));
        }
        Ok(())
    }
}

/// The full configuration surface for one animation request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationOptions {
    /// Number of output frames the input series is resampled onto.
    pub target_frame_count: usize,
    /// Output frames per second.
    pub fps: u32,
    /// Output frame dimensions.
    pub canvas: Canvas,
    /// Number of leading points framed by the frame-0 zoom window.
    pub initial_zoom_frames: usize,
    /// Fraction of the y extent added as margin above and below.
    pub y_margin_fraction: f64,
    /// Fraction of the elapsed x span added as runway past the revealed edge.
    pub x_lookahead_fraction: f64,
    /// Fraction of the visible x range the value label is nudged forward.
    pub label_offset_fraction: f64,
    /// Default smoothing window (frames) for recurring contributions.
    pub smoothing_frames: usize,
    /// Currency symbol prefixed to every formatted value.
    pub currency_symbol: String,
    /// Chart colors and metrics.
    pub style: ChartStyle,
    /// When set, the derived series is dumped to this CSV path before
    /// rendering (debugging / reproducibility).
    pub series_dump_path: Option<PathBuf>,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            target_frame_count: 1800,
            fps: 30,
            canvas: Canvas {
                width: 1080,
                height: 1920,
            },
            initial_zoom_frames: 60,
            y_margin_fraction: 0.1,
            x_lookahead_fraction: 0.1,
            label_offset_fraction: 0.02,
            smoothing_frames: 10,
            currency_symbol: "$".to_string(),
            style: ChartStyle::default(),
            series_dump_path: None,
        }
    }
}

impl AnimationOptions {
    /// Load options from a JSON file and validate them.
    ///
    /// Missing fields take their defaults, so a file only needs the values it
    /// overrides.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read options file '{}'", path.display()))?;
        let opts: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse options file '{}'", path.display()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check the whole option set before any frame is rendered.
    pub fn validate(&self) -> Result<()> {
        if self.target_frame_count < 2 {
            return Err(Error::validation("target frame count must be >= 2"));
        }
        if self.fps == 0 {
            return Err(Error::validation("fps must be > 0"));
        }
        self.canvas.validate()?;
        if self.initial_zoom_frames < 1 {
            return Err(Error::validation("initial zoom window must be >= 1 frame"));
        }
        for (name, value) in [
            ("y_margin_fraction", self.y_margin_fraction),
            ("x_lookahead_fraction", self.x_lookahead_fraction),
            ("label_offset_fraction", self.label_offset_fraction),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::validation(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        if self.smoothing_frames < 1 {
            return Err(Error::validation("smoothing window must be >= 1 frame"));
        }
        if self.currency_symbol.is_empty() {
            return Err(Error::validation("currency symbol must be non-empty"));
        }
        self.style.validate()
    }

    /// The viewport tunables embedded in this option set.
    pub fn viewport_options(&self) -> ViewportOptions {
        ViewportOptions {
            initial_zoom_frames: self.initial_zoom_frames,
            y_margin_fraction: self.y_margin_fraction,
            x_lookahead_fraction: self.x_lookahead_fraction,
        }
    }
}
