use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::foundation::error::{WalkError, WalkResult};

/// Turns one image into one higher-resolution image.
pub trait Upsampler {
    /// Upsample a single frame.
    fn upsample(&mut self, img: &RgbImage) -> WalkResult<RgbImage>;
}

/// Fixed-factor resampling upsampler.
#[derive(Clone, Copy, Debug)]
pub struct ResizeUpsampler {
    factor: u32,
    filter: FilterType,
}

impl ResizeUpsampler {
    /// Default scale factor.
    pub const DEFAULT_FACTOR: u32 = 4;

    /// Create an upsampler scaling by `factor` with Lanczos3 filtering.
    pub fn new(factor: u32) -> WalkResult<Self> {
        if factor == 0 {
            return Err(WalkError::validation("upsample factor must be > 0"));
        }
        Ok(Self {
            factor,
            filter: FilterType::Lanczos3,
        })
    }

    /// Scale factor.
    pub fn factor(&self) -> u32 {
        self.factor
    }
}

impl Default for ResizeUpsampler {
    fn default() -> Self {
        Self {
            factor: Self::DEFAULT_FACTOR,
            filter: FilterType::Lanczos3,
        }
    }
}

impl Upsampler for ResizeUpsampler {
    fn upsample(&mut self, img: &RgbImage) -> WalkResult<RgbImage> {
        let (w, h) = img.dimensions();
        let (tw, th) = w
            .checked_mul(self.factor)
            .zip(h.checked_mul(self.factor))
            .ok_or_else(|| WalkError::pipeline("upsampled size overflows u32"))?;
        Ok(imageops::resize(img, tw, th, self.filter))
    }
}
