use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{ImageFormat, RgbImage};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WalkError, WalkResult};

const FRAME_PREFIX: &str = "frame";
const FRAME_DIGITS: usize = 6;

/// Naming scheme of frame files: `frame{index:06}{ext}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameNaming {
    ext: String,
    format: ImageFormat,
}

impl FrameNaming {
    /// Naming for `ext` (`.png`, `.jpg` or `.jpeg`; the leading dot is optional).
    pub fn new(ext: &str) -> WalkResult<Self> {
        let bare = ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase();
        let format = match bare.as_str() {
            "png" => ImageFormat::Png,
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            _ => {
                return Err(WalkError::validation(format!(
                    "unsupported frame extension '{ext}' (expected .png or .jpg)"
                )));
            }
        };
        Ok(Self {
            ext: format!(".{bare}"),
            format,
        })
    }

    /// Extension including the leading dot.
    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// File name of frame `idx`.
    pub fn file_name(&self, idx: FrameIndex) -> String {
        format!("{FRAME_PREFIX}{:0width$}{}", idx.0, self.ext, width = FRAME_DIGITS)
    }

    /// Path of frame `idx` inside `dir`.
    pub fn path(&self, dir: &Path, idx: FrameIndex) -> PathBuf {
        dir.join(self.file_name(idx))
    }

    /// printf-style pattern understood by `ffmpeg`'s image sequence demuxer.
    pub fn printf_pattern(&self) -> String {
        format!("{FRAME_PREFIX}%0{FRAME_DIGITS}d{}", self.ext)
    }

    /// Parse the index out of a frame file name; `None` for anything else.
    pub fn parse(&self, file_name: &str) -> Option<FrameIndex> {
        let digits = file_name
            .strip_prefix(FRAME_PREFIX)?
            .strip_suffix(self.ext.as_str())?;
        if digits.len() < FRAME_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(FrameIndex)
    }

    /// Highest frame index present in `dir`, if any.
    pub fn scan_highest(&self, dir: &Path) -> WalkResult<Option<FrameIndex>> {
        if !dir.is_dir() {
            return Ok(None);
        }
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read frame directory '{}'", dir.display()))?;
        let mut highest: Option<FrameIndex> = None;
        for entry in entries {
            let entry =
                entry.with_context(|| format!("read frame directory '{}'", dir.display()))?;
            let name = entry.file_name();
            let Some(idx) = name.to_str().and_then(|n| self.parse(n)) else {
                continue;
            };
            highest = highest.max(Some(idx));
        }
        Ok(highest)
    }

    /// Write `img` as frame `idx` in `dir`.
    pub fn save(&self, dir: &Path, idx: FrameIndex, img: &RgbImage) -> WalkResult<PathBuf> {
        let path = self.path(dir, idx);
        img.save_with_format(&path, self.format)
            .with_context(|| format!("write frame '{}'", path.display()))?;
        Ok(path)
    }
}

impl Default for FrameNaming {
    fn default() -> Self {
        Self {
            ext: ".png".to_string(),
            format: ImageFormat::Png,
        }
    }
}

/// Maps planned frames to frame indices.
///
/// With `L` secondary interpolation steps every planned frame after the first owns `L`
/// consecutive indices: `L - 1` in-betweens followed by its own output. The first planned frame
/// has no predecessor and owns index 0 alone. `L <= 1` degenerates to one index per planned
/// frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    stride: u64,
}

impl FrameLayout {
    /// Layout for `latent_interpolation_steps`.
    pub fn new(latent_interpolation_steps: u32) -> Self {
        Self {
            stride: u64::from(latent_interpolation_steps.max(1)),
        }
    }

    /// Frames emitted per planned frame (after the first).
    pub fn stride(self) -> u64 {
        self.stride
    }

    /// In-between frames emitted before each output (after the first).
    pub fn in_betweens(self) -> u64 {
        self.stride - 1
    }

    /// Index of the pipeline output for planned frame `planned`.
    pub fn output_index(self, planned: u64) -> FrameIndex {
        FrameIndex(planned * self.stride)
    }

    /// First index owned by planned frame `planned`.
    pub fn first_index(self, planned: u64) -> FrameIndex {
        if planned == 0 {
            FrameIndex(0)
        } else {
            FrameIndex(planned * self.stride - self.in_betweens())
        }
    }

    /// Every index owned by planned frame `planned`, in emission order.
    pub fn indices(self, planned: u64) -> impl Iterator<Item = FrameIndex> {
        (self.first_index(planned).0..=self.output_index(planned).0).map(FrameIndex)
    }

    /// Total frames for `planned_frames` planned frames.
    pub fn total_frames(self, planned_frames: u64) -> u64 {
        match planned_frames {
            0 => 0,
            n => (n - 1) * self.stride + 1,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/run/frames.rs"]
mod tests;
