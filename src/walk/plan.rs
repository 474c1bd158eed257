use crate::foundation::core::Dimensions;
use crate::foundation::error::{WalkError, WalkResult};
use crate::foundation::math::linspace01;
use crate::pipeline::DiffusionPipeline;
use crate::tensor::Tensor;
use crate::tensor::interp::InterpMode;

/// A walk checkpoint: a prompt and the seed of its latent noise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    /// Conditioning prompt.
    pub prompt: String,
    /// Latent noise seed.
    pub seed: u64,
}

impl Anchor {
    /// Compute the anchor's embedding and seeded latent.
    pub fn materialize(
        &self,
        pipeline: &mut dyn DiffusionPipeline,
        dims: Dimensions,
    ) -> WalkResult<Endpoint> {
        Ok(Endpoint {
            embedding: pipeline.embed_text(&self.prompt)?,
            latent: pipeline.seed_latents(self.seed, dims)?,
        })
    }
}

/// Pair prompts with seeds, in order. With `do_loop` the first anchor is repeated at the end.
pub fn anchors(prompts: &[String], seeds: &[u64], do_loop: bool) -> WalkResult<Vec<Anchor>> {
    if prompts.len() != seeds.len() {
        return Err(WalkError::ConfigMismatch {
            prompts: prompts.len(),
            seeds: seeds.len(),
        });
    }
    let mut out: Vec<Anchor> = prompts
        .iter()
        .zip(seeds)
        .map(|(prompt, &seed)| Anchor {
            prompt: prompt.clone(),
            seed,
        })
        .collect();
    if do_loop && let Some(first) = out.first().cloned() {
        out.push(first);
    }
    Ok(out)
}

/// An anchor's computed embedding and latent.
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    /// Prompt embedding.
    pub embedding: Tensor,
    /// Seeded latent noise.
    pub latent: Tensor,
}

/// One interpolated sample between two anchors.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedFrame {
    /// Index of the anchor pair.
    pub pair: usize,
    /// Step within the pair, `0..num_steps`.
    pub step: usize,
    /// Global planned index across the whole walk.
    pub planned: u64,
    /// Interpolation fraction.
    pub t: f64,
    /// Whether this is the pair's final step.
    pub last_in_pair: bool,
    /// Interpolated embedding.
    pub embedding: Tensor,
    /// Interpolated latent.
    pub latent: Tensor,
}

/// Plans the frames between two anchors.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlanner {
    fractions: Vec<f64>,
    embed_mode: InterpMode,
    latent_mode: InterpMode,
}

impl FramePlanner {
    /// Planner for `num_steps` frames per pair with independent embedding/latent modes.
    pub fn new(num_steps: usize, embed_mode: InterpMode, latent_mode: InterpMode) -> WalkResult<Self> {
        if num_steps == 0 {
            return Err(WalkError::validation("num_steps must be > 0"));
        }
        Ok(Self {
            fractions: linspace01(num_steps),
            embed_mode,
            latent_mode,
        })
    }

    /// Frames per pair.
    pub fn steps(&self) -> usize {
        self.fractions.len()
    }

    /// Fractions of one pair, evenly spaced over `[0, 1]`.
    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    /// Global planned index of `step` in `pair`.
    pub fn planned_index(&self, pair: usize, step: usize) -> u64 {
        (pair * self.steps() + step) as u64
    }

    /// Interpolate a single step of `pair`.
    pub fn plan_step(
        &self,
        pair: usize,
        step: usize,
        a: &Endpoint,
        b: &Endpoint,
    ) -> WalkResult<PlannedFrame> {
        let t = *self.fractions.get(step).ok_or_else(|| {
            WalkError::validation(format!("step {step} out of range 0..{}", self.steps()))
        })?;
        Ok(PlannedFrame {
            pair,
            step,
            planned: self.planned_index(pair, step),
            t,
            last_in_pair: step + 1 == self.steps(),
            embedding: self.embed_mode.apply(&a.embedding, &b.embedding, t)?,
            latent: self.latent_mode.apply(&a.latent, &b.latent, t)?,
        })
    }

    /// Interpolate every step of `pair`.
    pub fn plan_pair(&self, pair: usize, a: &Endpoint, b: &Endpoint) -> WalkResult<Vec<PlannedFrame>> {
        (0..self.steps())
            .map(|step| self.plan_step(pair, step, a, b))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/walk/plan.rs"]
mod tests;
