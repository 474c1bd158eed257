use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::encode::{VideoEncoder, VideoRequest};
use crate::foundation::error::{WalkError, WalkResult};

/// Options for [`FfmpegEncoder`].
#[derive(Clone, Debug)]
pub struct FfmpegEncoderOpts {
    /// Program to run; `ffmpeg` resolves through `PATH`.
    pub program: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// x264 constant rate factor.
    pub crf: u8,
}

impl Default for FfmpegEncoderOpts {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            overwrite: true,
            crf: 10,
        }
    }
}

/// Encodes an image sequence to H.264 MP4 by running the system `ffmpeg`.
#[derive(Clone, Debug, Default)]
pub struct FfmpegEncoder {
    opts: FfmpegEncoderOpts,
}

impl FfmpegEncoder {
    /// Create an encoder with `opts`.
    pub fn new(opts: FfmpegEncoderOpts) -> Self {
        Self { opts }
    }

    /// Arguments passed to `ffmpeg` for `req`.
    pub fn args(&self, req: &VideoRequest<'_>) -> Vec<String> {
        let input = req.frame_dir.join(req.pattern);
        let mut args = vec![
            if self.opts.overwrite { "-y" } else { "-n" }.to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            // Image sequence input: `-r` before `-i` sets the input frame rate.
            "-r".to_string(),
            req.fps.0.to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
        ];
        args.extend(["-vcodec", "libx264", "-crf"].map(str::to_string));
        args.push(self.opts.crf.to_string());
        args.extend(["-pix_fmt", "yuv420p"].map(str::to_string));
        args.push(req.out_path.to_string_lossy().into_owned());
        args
    }
}

impl VideoEncoder for FfmpegEncoder {
    #[tracing::instrument(skip(self, req), fields(out = %req.out_path.display()))]
    fn encode(&mut self, req: &VideoRequest<'_>) -> WalkResult<PathBuf> {
        ensure_parent_dir(req.out_path)?;
        if !self.opts.overwrite && req.out_path.exists() {
            return Err(WalkError::encode(format!(
                "output file '{}' already exists",
                req.out_path.display()
            )));
        }
        if !is_program_on_path(&self.opts.program) {
            return Err(WalkError::encode(format!(
                "'{}' is required for MP4 encoding, but was not found on PATH",
                self.opts.program.display()
            )));
        }

        let output = Command::new(&self.opts.program)
            .args(self.args(req))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                WalkError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WalkError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(req.out_path.to_path_buf())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> WalkResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_program_on_path(Path::new("ffmpeg"))
}

fn is_program_on_path(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
