use crate::foundation::error::{WalkError, WalkResult};

/// Absolute 0-based index of an emitted frame file within a run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// The index following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Output image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    /// Height in pixels.
    pub height: u32,
    /// Width in pixels.
    pub width: u32,
}

impl Dimensions {
    /// Latent spatial downsampling factor of the diffusion autoencoder.
    pub const LATENT_SCALE: u32 = 8;

    /// Create validated dimensions; both sides must be non-zero multiples of 8.
    pub fn new(height: u32, width: u32) -> WalkResult<Self> {
        if height == 0 || width == 0 {
            return Err(WalkError::validation("height/width must be non-zero"));
        }
        if !height.is_multiple_of(Self::LATENT_SCALE) || !width.is_multiple_of(Self::LATENT_SCALE)
        {
            return Err(WalkError::validation(format!(
                "height/width must be multiples of {} (got {height}x{width})",
                Self::LATENT_SCALE
            )));
        }
        Ok(Self { height, width })
    }

    /// Latent height (`height / 8`).
    pub fn latent_height(self) -> usize {
        (self.height / Self::LATENT_SCALE) as usize
    }

    /// Latent width (`width / 8`).
    pub fn latent_width(self) -> usize {
        (self.width / Self::LATENT_SCALE) as usize
    }
}

/// Frames-per-second used when assembling a video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps(pub u32);

impl Fps {
    /// Create a validated FPS value.
    pub fn new(fps: u32) -> WalkResult<Self> {
        if fps == 0 {
            return Err(WalkError::validation("fps must be > 0"));
        }
        Ok(Self(fps))
    }
}
