use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{Error, Result};
use crate::render::frame::FrameRGBA;

/// Parameters for MP4 encoding through the system `ffmpeg` binary.
#[derive(Clone, Debug)]
pub struct EncodeConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames per second.
    pub fps: u32,
    /// Output MP4 path.
    pub out_path: PathBuf,
    /// Whether to overwrite `out_path` if it already exists.
    pub overwrite: bool,
}

impl EncodeConfig {
    /// Check encode parameters.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::validation("encode width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(Error::validation("encode fps must be non-zero"));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            // Default settings target yuv420p output for maximum compatibility.
            return Err(Error::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

/// Whether a usable `ffmpeg` binary is reachable on `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Frame sink that streams raw RGBA frames to a spawned system `ffmpeg`.
///
/// The system binary is used deliberately rather than linking FFmpeg, avoiding
/// native dev header/lib requirements. On failure the child is killed and the
/// partial output file removed.
pub struct FfmpegSink {
    cfg: EncodeConfig,
    bg_rgba: [u8; 4],
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
}

impl FfmpegSink {
    /// Validate parameters and prepare a sink; `ffmpeg` is spawned at `begin`.
    ///
    /// `bg_rgba` is the background the premultiplied frames are flattened over
    /// before encoding.
    pub fn new(cfg: EncodeConfig, bg_rgba: [u8; 4]) -> Result<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(Error::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(Error::validation(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        Ok(Self {
            scratch: vec![0u8; (cfg.width * cfg.height * 4) as usize],
            cfg,
            bg_rgba,
            child: None,
            stdin: None,
        })
    }

    fn spawn(&mut self) -> Result<()> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", self.cfg.width, self.cfg.height),
            "-r",
            &self.cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&self.cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            Error::validation(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        self.stdin = Some(
            child
                .stdin
                .take()
                .ok_or_else(|| Error::validation("failed to open ffmpeg stdin (unexpected)"))?,
        );
        self.child = Some(child);
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> Result<()> {
        if cfg.width != self.cfg.width || cfg.height != self.cfg.height || cfg.fps != self.cfg.fps {
            return Err(Error::validation(format!(
                "sink config mismatch: driver wants {}x{}@{}, encoder configured for {}x{}@{}",
                cfg.width, cfg.height, cfg.fps, self.cfg.width, self.cfg.height, self.cfg.fps
            )));
        }
        self.spawn()
    }

    fn push_frame(&mut self, _idx: FrameIndex, frame: &FrameRGBA) -> Result<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(Error::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(Error::validation(
                "frame data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(Error::validation("ffmpeg sink used before begin"));
        };
        use std::io::Write as _;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| Error::validation(format!("failed to write frame to ffmpeg stdin: {e}")))?;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        drop(self.stdin.take());
        let Some(child) = self.child.take() else {
            return Err(Error::validation("ffmpeg sink ended before begin"));
        };

        let output = child
            .wait_with_output()
            .map_err(|e| Error::validation(format!("failed to wait for ffmpeg to finish: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::validation(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        // No partial video is ever retained.
        let _ = std::fs::remove_file(&self.cfg.out_path);
    }
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> Result<()> {
    if dst.len() != src.len() || dst.len() % 4 != 0 {
        return Err(Error::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d[..3].copy_from_slice(&s[..3]);
            d[3] = 255;
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let fg = u16::from(s[c]);
            // Premultiplied source: out = fg + bg*(1-a). Straight: classic over.
            let fg_contrib = if src_is_premul { fg * 255 } else { fg * a };
            d[c] = ((fg_contrib + bg[c] * inv + 127) / 255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
