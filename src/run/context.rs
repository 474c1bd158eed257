use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{WalkError, WalkResult};
use crate::tensor::Tensor;

/// The last pipeline output latent of a run, tagged with the planned frame that produced it.
///
/// Persisted after every batch so a resumed run can condition on (and interpolate from) the
/// output that preceded the interruption.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LatentContext {
    /// Global planned frame index of `latent`.
    pub planned: u64,
    /// Output latent, batch axis of 1.
    pub latent: Tensor,
}

impl LatentContext {
    /// Write to `path`, replacing any previous context atomically.
    pub fn save(&self, path: &Path) -> WalkResult<()> {
        let bytes = serde_json::to_vec(self).map_err(|e| WalkError::serde(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)
            .with_context(|| format!("write latent context '{}'", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("replace latent context '{}'", path.display()))?;
        Ok(())
    }

    /// Read from `path`; `None` when no context was stored.
    pub fn load(path: &Path) -> WalkResult<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("read latent context '{}'", path.display()))?;
        let ctx = serde_json::from_slice(&bytes)
            .map_err(|e| WalkError::serde(format!("parse latent context: {e}")))?;
        Ok(Some(ctx))
    }
}
