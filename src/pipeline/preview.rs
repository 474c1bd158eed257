use image::{Rgb, RgbImage};
use ndarray::Axis;

use crate::foundation::core::Dimensions;
use crate::foundation::error::{WalkError, WalkResult};
use crate::foundation::math::Fnv1a64;
use crate::pipeline::{
    DiffusionPipeline, GenerateOutput, GenerateRequest, PipelineConfig, Scheduler,
};
use crate::tensor::{Tensor, seeded_normal, split_batch, stack_batch};

/// Latent channels of the preview model.
pub const PREVIEW_LATENT_CHANNELS: usize = 4;
/// Token count of a preview embedding.
pub const PREVIEW_EMBED_TOKENS: usize = 77;
/// Width of a preview embedding token.
pub const PREVIEW_EMBED_DIM: usize = 8;

/// Model-free pipeline that honours the [`DiffusionPipeline`] contract deterministically.
///
/// Prompts hash to fixed embeddings, "denoising" is a cheap contraction of the latent toward
/// the embedding mean, and decoding maps the first three latent channels to RGB at 8x scale.
/// Identical inputs always produce identical pixels, which makes it suitable for dry runs and
/// for checking walk bookkeeping.
#[derive(Debug)]
pub struct PreviewPipeline {
    cfg: PipelineConfig,
}

impl PreviewPipeline {
    /// Construct with the given settings.
    pub fn new(cfg: PipelineConfig) -> Self {
        Self { cfg }
    }

    /// Construction-time settings.
    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    fn contraction(&self, guidance_scale: f64) -> f64 {
        let schedule = match self.cfg.scheduler {
            Scheduler::Default => 1.00,
            Scheduler::Ddim => 0.95,
            Scheduler::Klms => 0.90,
        };
        schedule / (1.0 + 0.1 * guidance_scale.max(0.0))
    }
}

impl Default for PreviewPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl DiffusionPipeline for PreviewPipeline {
    fn latent_shape(&self, dims: Dimensions) -> Vec<usize> {
        vec![
            1,
            PREVIEW_LATENT_CHANNELS,
            dims.latent_height(),
            dims.latent_width(),
        ]
    }

    fn embed_text(&mut self, prompt: &str) -> WalkResult<Tensor> {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(prompt.as_bytes());
        Ok(seeded_normal(
            h.finish(),
            &[1, PREVIEW_EMBED_TOKENS, PREVIEW_EMBED_DIM],
        ))
    }

    fn generate(&mut self, req: &GenerateRequest<'_>) -> WalkResult<GenerateOutput> {
        let batch = req.latents.len_of(Axis(0));
        if req.embeddings.len_of(Axis(0)) != batch {
            return Err(WalkError::pipeline(format!(
                "batch size mismatch: {batch} latents vs {} embeddings",
                req.embeddings.len_of(Axis(0))
            )));
        }
        let expected = self.latent_shape(req.params.dims);
        if req.latents.shape()[1..] != expected[1..] {
            return Err(WalkError::pipeline(format!(
                "latent shape {:?} does not match {}x{} output",
                req.latents.shape(),
                req.params.dims.width,
                req.params.dims.height
            )));
        }

        if self.cfg.show_progress {
            tracing::debug!(
                batch,
                steps = req.params.num_inference_steps,
                scheduler = self.cfg.scheduler.as_str(),
                "preview denoise"
            );
        }

        let k = self.contraction(req.params.guidance_scale) as f32;
        let eta = req.params.eta as f32;
        let strength = req.strength.clamp(0.0, 1.0) as f32;

        let mut outs = Vec::with_capacity(batch);
        for (latent, embed) in split_batch(req.latents)
            .into_iter()
            .zip(split_batch(req.embeddings))
        {
            let bias = embed.mean().unwrap_or(0.0);
            let mut out = latent.mapv(|v| k * v + (1.0 - k) * bias + eta * 0.01 * v.signum());
            if let Some(prev) = req.prev_latent
                && strength < 1.0
            {
                if prev.shape() != out.shape() {
                    return Err(WalkError::pipeline(format!(
                        "previous latent shape {:?} does not match {:?}",
                        prev.shape(),
                        out.shape()
                    )));
                }
                out.zip_mut_with(prev, |o, &p| *o = strength * *o + (1.0 - strength) * p);
            }
            outs.push(out);
        }

        let images = outs
            .iter()
            .map(|l| self.decode(l))
            .collect::<WalkResult<Vec<_>>>()?;
        let refs: Vec<&Tensor> = outs.iter().collect();
        let latents = stack_batch(&refs)?;
        Ok(GenerateOutput { images, latents })
    }

    fn decode(&mut self, latent: &Tensor) -> WalkResult<RgbImage> {
        let shape = latent.shape();
        if shape.len() != 4 || shape[0] != 1 || shape[1] < 3 {
            return Err(WalkError::pipeline(format!(
                "cannot decode latent of shape {shape:?}"
            )));
        }
        let (lh, lw) = (shape[2], shape[3]);
        let scale = Dimensions::LATENT_SCALE as usize;
        let to_u8 = |v: f32| (((v.tanh() * 0.5) + 0.5) * 255.0).round().clamp(0.0, 255.0) as u8;

        Ok(RgbImage::from_fn(
            (lw * scale) as u32,
            (lh * scale) as u32,
            |x, y| {
                let (ly, lx) = (y as usize / scale, x as usize / scale);
                Rgb([
                    to_u8(latent[[0, 0, ly, lx]]),
                    to_u8(latent[[0, 1, ly, lx]]),
                    to_u8(latent[[0, 2, ly, lx]]),
                ])
            },
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/preview.rs"]
mod tests;
