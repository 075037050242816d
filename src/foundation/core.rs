use crate::foundation::error::{Error, Result};

/// Index of one frame in the output sequence (0-based).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Output frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Check that the canvas is drawable and encodable.
    ///
    /// Dimensions must be non-zero, even (yuv420p mp4 output) and fit the
    /// rasterizer's u16 surface limits.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::validation("canvas width/height must be > 0"));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(Error::validation(
                "canvas width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if u16::try_from(self.width).is_err() || u16::try_from(self.height).is_err() {
            return Err(Error::validation("canvas width/height must fit in u16"));
        }
        Ok(())
    }
}
