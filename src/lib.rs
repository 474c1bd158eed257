//! Dreamwalk renders videos that walk through the latent space of a text-to-image diffusion
//! model.
//!
//! A walk is a list of (prompt, seed) anchors. Between each consecutive pair the prompt
//! embeddings and seeded noise latents are interpolated, every interpolated point is run
//! through the pipeline, and the results are written as numbered frames in one run directory.
//! The run records its configuration first, so an interrupted walk resumes where it stopped.
//!
//! - Describe the walk with a [`RunConfig`] and open a [`RunSession`]
//! - Lend a [`DiffusionPipeline`] to a [`Walker`] and run it
//! - Optionally assemble the frames into a video with a [`VideoEncoder`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// Gathering frames across seed runs.
pub mod collect;
/// Video assembly.
pub mod encode;
/// Collaborator contracts and the preview pipeline.
pub mod pipeline;
/// Persisted run state.
pub mod run;
/// Tensors and interpolation.
pub mod tensor;
/// Walk planning and driving.
pub mod walk;

pub use crate::foundation::core::{Dimensions, Fps, FrameIndex};
pub use crate::foundation::error::{WalkError, WalkResult};

pub use crate::collect::{CollectRequest, collect, read_prompts};
pub use crate::encode::ffmpeg::{FfmpegEncoder, FfmpegEncoderOpts};
pub use crate::encode::{VideoEncoder, VideoRequest};
pub use crate::pipeline::preview::PreviewPipeline;
pub use crate::pipeline::upsample::{ResizeUpsampler, Upsampler};
pub use crate::pipeline::{
    DiffusionPipeline, GenerateOutput, GenerateRequest, GenerationParams, PipelineConfig,
    Scheduler,
};
pub use crate::run::config::RunConfig;
pub use crate::run::frames::{FrameLayout, FrameNaming};
pub use crate::run::state::{RunSession, WalkOpts};
pub use crate::tensor::Tensor;
pub use crate::tensor::interp::InterpMode;
pub use crate::walk::driver::{WalkOutcome, Walker};
