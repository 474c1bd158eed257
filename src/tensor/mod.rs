//! The single numeric abstraction shared by embeddings and latents.
//!
//! Both are plain `f32` tensors with a leading batch axis. A single sample has batch size 1;
//! batches are built by concatenating samples along axis 0.

/// Linear and spherical interpolation.
pub mod interp;

use ndarray::{ArrayD, Axis, IxDyn};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
use rand_distr::StandardNormal;

use crate::foundation::error::{WalkError, WalkResult};

/// Dynamic-rank `f32` tensor.
pub type Tensor = ArrayD<f32>;

/// Draw a standard-normal tensor of `shape` from a generator seeded with `seed`.
///
/// The same `(seed, shape)` always yields the same tensor.
pub fn seeded_normal(seed: u64, shape: &[usize]) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    ArrayD::from_shape_simple_fn(IxDyn(shape), || rng.sample(StandardNormal))
}

/// Concatenate single-sample tensors along the batch axis.
pub fn stack_batch(items: &[&Tensor]) -> WalkResult<Tensor> {
    if items.is_empty() {
        return Err(WalkError::validation("cannot stack an empty batch"));
    }
    let views: Vec<_> = items.iter().map(|t| t.view()).collect();
    ndarray::concatenate(Axis(0), &views)
        .map_err(|e| WalkError::validation(format!("batch shape mismatch: {e}")))
}

/// Split a batched tensor into single-sample tensors, each keeping a batch axis of 1.
pub fn split_batch(batch: &Tensor) -> Vec<Tensor> {
    if batch.ndim() == 0 {
        return vec![batch.clone()];
    }
    batch
        .axis_iter(Axis(0))
        .map(|sample| sample.insert_axis(Axis(0)).to_owned())
        .collect()
}

/// Fail unless `a` and `b` have the same shape.
pub fn ensure_same_shape(a: &Tensor, b: &Tensor) -> WalkResult<()> {
    if a.shape() != b.shape() {
        return Err(WalkError::validation(format!(
            "tensor shape mismatch: {:?} vs {:?}",
            a.shape(),
            b.shape()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/tensor/mod.rs"]
mod tests;
