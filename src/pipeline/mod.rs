//! Collaborator contracts: the diffusion pipeline and the upsampler.
//!
//! The diffusion model itself lives outside this crate. A walk only needs the narrow surface
//! below; [`PreviewPipeline`](preview::PreviewPipeline) implements it deterministically without
//! a model.

/// Deterministic model-free pipeline.
pub mod preview;
/// Per-image upsampling.
pub mod upsample;

use image::RgbImage;

use crate::foundation::core::Dimensions;
use crate::foundation::error::WalkResult;
use crate::tensor::{Tensor, seeded_normal};

/// Noise schedule used by the diffusion loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheduler {
    /// PNDM.
    Default,
    /// DDIM without sample clipping.
    Ddim,
    /// LMS discrete.
    #[default]
    Klms,
}

impl Scheduler {
    /// Stable lowercase name, as persisted.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Ddim => "ddim",
            Self::Klms => "klms",
        }
    }
}

/// Construction-time pipeline settings.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Noise schedule.
    pub scheduler: Scheduler,
    /// Trade speed for memory (sliced attention).
    pub attention_slicing: bool,
    /// Report per-step denoising progress.
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scheduler: Scheduler::default(),
            attention_slicing: false,
            show_progress: true,
        }
    }
}

/// Per-invocation generation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationParams {
    /// Output size.
    pub dims: Dimensions,
    /// Classifier-free guidance scale.
    pub guidance_scale: f64,
    /// DDIM eta.
    pub eta: f64,
    /// Denoising steps.
    pub num_inference_steps: u32,
}

/// One batched pipeline invocation.
#[derive(Debug)]
pub struct GenerateRequest<'a> {
    /// Initial latents, batch axis first.
    pub latents: &'a Tensor,
    /// Text embeddings, batch axis first, same batch size as `latents`.
    pub embeddings: &'a Tensor,
    /// Generation parameters.
    pub params: GenerationParams,
    /// How far to move away from `prev_latent`; `1.0` ignores it.
    pub strength: f64,
    /// Last output latent of the previous invocation, if any.
    pub prev_latent: Option<&'a Tensor>,
}

/// Result of one invocation: one image and one decodable latent per batch member.
#[derive(Clone, Debug)]
pub struct GenerateOutput {
    /// Decoded images, in batch order.
    pub images: Vec<RgbImage>,
    /// Pre-decode latents, batch axis first.
    pub latents: Tensor,
}

/// The external diffusion pipeline.
///
/// Implementations own their model state; the walk borrows them mutably for its duration.
pub trait DiffusionPipeline {
    /// Shape of a single seeded latent for the given output size.
    fn latent_shape(&self, dims: Dimensions) -> Vec<usize>;

    /// Encode a prompt into its conditioning embedding (batch axis of 1).
    fn embed_text(&mut self, prompt: &str) -> WalkResult<Tensor>;

    /// Initial noise for `seed`.
    fn seed_latents(&mut self, seed: u64, dims: Dimensions) -> WalkResult<Tensor> {
        Ok(seeded_normal(seed, &self.latent_shape(dims)))
    }

    /// Run the denoising loop over a batch.
    fn generate(&mut self, req: &GenerateRequest<'_>) -> WalkResult<GenerateOutput>;

    /// Decode a single latent (batch axis of 1) into an image.
    fn decode(&mut self, latent: &Tensor) -> WalkResult<RgbImage>;
}
