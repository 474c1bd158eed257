use ndarray::Zip;

use crate::foundation::error::WalkResult;
use crate::tensor::{Tensor, ensure_same_shape};

/// Above this absolute cosine similarity, spherical interpolation degrades to linear.
pub const DOT_THRESHOLD: f64 = 0.9995;

/// How two tensors are blended along a walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpMode {
    /// Elementwise weighted average.
    Lerp,
    /// Great-circle rotation between the two directions, scaled by their magnitudes.
    #[default]
    Slerp,
}

impl InterpMode {
    /// Interpolate `a -> b` at fraction `t` using this mode.
    pub fn apply(self, a: &Tensor, b: &Tensor, t: f64) -> WalkResult<Tensor> {
        match self {
            Self::Lerp => lerp(a, b, t),
            Self::Slerp => slerp(a, b, t),
        }
    }
}

/// `(1 - t) * a + t * b`, elementwise.
pub fn lerp(a: &Tensor, b: &Tensor, t: f64) -> WalkResult<Tensor> {
    ensure_same_shape(a, b)?;
    Ok(lerp_unchecked(a, b, t))
}

fn lerp_unchecked(a: &Tensor, b: &Tensor, t: f64) -> Tensor {
    let s = 1.0 - t;
    Zip::from(a)
        .and(b)
        .map_collect(|&x, &y| (s * f64::from(x) + t * f64::from(y)) as f32)
}

/// Spherical interpolation of `a -> b` at fraction `t`.
///
/// Falls back to [`lerp`] when the inputs are nearly parallel (|cos| > [`DOT_THRESHOLD`]) or
/// when either has zero norm.
pub fn slerp(a: &Tensor, b: &Tensor, t: f64) -> WalkResult<Tensor> {
    ensure_same_shape(a, b)?;

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return Ok(lerp_unchecked(a, b, t));
    }

    let cos = dot / denom;
    if cos.abs() > DOT_THRESHOLD {
        return Ok(lerp_unchecked(a, b, t));
    }

    let theta_0 = cos.clamp(-1.0, 1.0).acos();
    let sin_theta_0 = theta_0.sin();
    let theta_t = theta_0 * t;
    let s0 = (theta_0 - theta_t).sin() / sin_theta_0;
    let s1 = theta_t.sin() / sin_theta_0;

    Ok(Zip::from(a)
        .and(b)
        .map_collect(|&x, &y| (s0 * f64::from(x) + s1 * f64::from(y)) as f32))
}

#[cfg(test)]
#[path = "../../tests/unit/tensor/interp.rs"]
mod tests;
