//! Video assembly from a directory of numbered frames.

/// `ffmpeg`-based encoder (MP4 output via system `ffmpeg`).
pub mod ffmpeg;

use std::path::{Path, PathBuf};

use crate::foundation::core::Fps;
use crate::foundation::error::WalkResult;

/// What to encode and where to put it.
#[derive(Clone, Copy, Debug)]
pub struct VideoRequest<'a> {
    /// Directory holding the frame files.
    pub frame_dir: &'a Path,
    /// printf-style frame file pattern relative to `frame_dir`, e.g. `frame%06d.png`.
    pub pattern: &'a str,
    /// Output frame rate.
    pub fps: Fps,
    /// Output video path.
    pub out_path: &'a Path,
}

/// Turns a numbered frame sequence into a video file.
pub trait VideoEncoder {
    /// Encode the sequence; returns the written video path.
    fn encode(&mut self, req: &VideoRequest<'_>) -> WalkResult<PathBuf>;
}
