use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Dimensions, Fps};
use crate::foundation::error::{WalkError, WalkResult};
use crate::pipeline::upsample::ResizeUpsampler;
use crate::pipeline::{GenerationParams, Scheduler};
use crate::tensor::interp::InterpMode;

/// Every persisted parameter of a walk.
///
/// Serialized as pretty JSON (two-space indent, fields in declaration order) so a record written
/// by one run reloads and re-serializes to the same bytes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunConfig {
    /// Anchor prompts, in walk order.
    pub prompts: Vec<String>,
    /// Anchor seeds, one per prompt.
    pub seeds: Vec<u64>,
    /// Frames planned per anchor pair.
    pub num_steps: usize,
    /// Run name; also the run's sub directory under the output root.
    pub name: String,
    /// Classifier-free guidance scale.
    pub guidance_scale: f64,
    /// DDIM eta.
    pub eta: f64,
    /// Denoising steps per invocation.
    pub num_inference_steps: u32,
    /// Close the walk by returning to the first anchor.
    pub do_loop: bool,
    /// Assemble the frames into an MP4 after the walk.
    pub make_video: bool,
    /// Interpolate embeddings linearly instead of spherically.
    pub use_lerp_for_text: bool,
    /// Noise schedule.
    pub scheduler: Scheduler,
    /// Upsample every frame before writing it.
    pub upsample: bool,
    /// Video frame rate.
    pub fps: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output width in pixels.
    pub width: u32,
    /// Secondary latent interpolation steps between consecutive outputs; `0` or `1` disables it.
    pub latent_interpolation_steps: u32,
    /// Conditioning strength against the previous output; `1.0` ignores it.
    pub strength: f64,
    /// Interpolation mode for latents.
    pub latent_interpolation: InterpMode,
    /// Scale factor of the built-in upsampler.
    pub upsample_factor: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            prompts: vec![
                "blueberry spaghetti".to_string(),
                "strawberry spaghetti".to_string(),
            ],
            seeds: vec![42, 123],
            num_steps: 5,
            name: "berry_good_spaghetti".to_string(),
            guidance_scale: 7.5,
            eta: 0.0,
            num_inference_steps: 50,
            do_loop: false,
            make_video: false,
            use_lerp_for_text: true,
            scheduler: Scheduler::Klms,
            upsample: false,
            fps: 30,
            height: 512,
            width: 512,
            latent_interpolation_steps: 0,
            strength: 1.0,
            latent_interpolation: InterpMode::Slerp,
            upsample_factor: ResizeUpsampler::DEFAULT_FACTOR,
        }
    }
}

/// On-disk shape of a record; fields older records may lack are optional.
#[derive(serde::Deserialize)]
struct StoredRunConfig {
    prompts: Vec<String>,
    seeds: Vec<u64>,
    num_steps: usize,
    name: String,
    guidance_scale: f64,
    eta: f64,
    num_inference_steps: u32,
    do_loop: bool,
    make_video: bool,
    use_lerp_for_text: bool,
    scheduler: Scheduler,
    upsample: Option<bool>,
    fps: Option<u32>,
    height: Option<u32>,
    width: Option<u32>,
    latent_interpolation_steps: Option<u32>,
    strength: Option<f64>,
    latent_interpolation: Option<InterpMode>,
    upsample_factor: Option<u32>,
}

impl StoredRunConfig {
    fn resolve(self, fallback: &RunConfig) -> RunConfig {
        RunConfig {
            prompts: self.prompts,
            seeds: self.seeds,
            num_steps: self.num_steps,
            name: self.name,
            guidance_scale: self.guidance_scale,
            eta: self.eta,
            num_inference_steps: self.num_inference_steps,
            do_loop: self.do_loop,
            make_video: self.make_video,
            use_lerp_for_text: self.use_lerp_for_text,
            scheduler: self.scheduler,
            upsample: self.upsample.unwrap_or(fallback.upsample),
            fps: self.fps.unwrap_or(fallback.fps),
            height: self.height.unwrap_or(fallback.height),
            width: self.width.unwrap_or(fallback.width),
            latent_interpolation_steps: self
                .latent_interpolation_steps
                .unwrap_or(fallback.latent_interpolation_steps),
            strength: self.strength.unwrap_or(fallback.strength),
            latent_interpolation: self
                .latent_interpolation
                .unwrap_or(fallback.latent_interpolation),
            upsample_factor: self.upsample_factor.unwrap_or(fallback.upsample_factor),
        }
    }
}

impl RunConfig {
    /// Check the walk can start. Prompt/seed count mismatches are reported first.
    pub fn validate(&self) -> WalkResult<()> {
        if self.prompts.len() != self.seeds.len() {
            return Err(WalkError::ConfigMismatch {
                prompts: self.prompts.len(),
                seeds: self.seeds.len(),
            });
        }
        if self.prompts.is_empty() {
            return Err(WalkError::validation("at least one prompt is required"));
        }
        if self.num_steps == 0 {
            return Err(WalkError::validation("num_steps must be > 0"));
        }
        if self.num_inference_steps == 0 {
            return Err(WalkError::validation("num_inference_steps must be > 0"));
        }
        if self.name.is_empty() || self.name.contains(['/', '\\']) {
            return Err(WalkError::validation(format!(
                "run name '{}' must be a non-empty single path component",
                self.name
            )));
        }
        if !self.guidance_scale.is_finite() || !self.eta.is_finite() {
            return Err(WalkError::validation("guidance_scale/eta must be finite"));
        }
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(WalkError::validation(format!(
                "strength must be within [0, 1] (got {})",
                self.strength
            )));
        }
        if self.upsample_factor == 0 {
            return Err(WalkError::validation("upsample_factor must be > 0"));
        }
        self.dims()?;
        self.video_fps()?;
        Ok(())
    }

    /// Validated output dimensions.
    pub fn dims(&self) -> WalkResult<Dimensions> {
        Dimensions::new(self.height, self.width)
    }

    /// Validated video frame rate.
    pub fn video_fps(&self) -> WalkResult<Fps> {
        Fps::new(self.fps)
    }

    /// Interpolation mode for text embeddings.
    pub fn embed_mode(&self) -> InterpMode {
        if self.use_lerp_for_text {
            InterpMode::Lerp
        } else {
            InterpMode::Slerp
        }
    }

    /// Interpolation mode for latents.
    pub fn latent_mode(&self) -> InterpMode {
        self.latent_interpolation
    }

    /// Number of anchor pairs the walk visits.
    pub fn pair_count(&self) -> usize {
        match (self.prompts.len(), self.do_loop) {
            (0, _) => 0,
            (n, true) => n,
            (n, false) => n - 1,
        }
    }

    /// Total frames planned across all pairs.
    pub fn planned_frames(&self) -> u64 {
        (self.pair_count() * self.num_steps) as u64
    }

    /// Pipeline parameters shared by every invocation of this run.
    pub fn generation_params(&self) -> WalkResult<GenerationParams> {
        Ok(GenerationParams {
            dims: self.dims()?,
            guidance_scale: self.guidance_scale,
            eta: self.eta,
            num_inference_steps: self.num_inference_steps,
        })
    }

    /// Render as the persisted JSON text.
    pub fn to_json(&self) -> WalkResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| WalkError::serde(e.to_string()))
    }

    /// Write the record to `path`.
    pub fn save(&self, path: &Path) -> WalkResult<()> {
        let text = self.to_json()?;
        std::fs::write(path, text)
            .with_context(|| format!("write run config '{}'", path.display()))?;
        Ok(())
    }

    /// Read a record from `path`; fields absent from older records come from `fallback`.
    pub fn load(path: &Path, fallback: &RunConfig) -> WalkResult<Self> {
        if !path.is_file() {
            return Err(WalkError::ConfigMissing(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read run config '{}'", path.display()))?;
        Self::from_json(&text, fallback)
    }

    /// Parse persisted JSON text.
    pub fn from_json(text: &str, fallback: &RunConfig) -> WalkResult<Self> {
        let stored: StoredRunConfig = serde_json::from_str(text)
            .map_err(|e| WalkError::serde(format!("parse run config: {e}")))?;
        Ok(stored.resolve(fallback))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/run/config.rs"]
mod tests;
