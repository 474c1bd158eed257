use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type WalkResult<T> = Result<T, WalkError>;

/// Errors surfaced by a walk.
#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    /// Invalid parameters or mismatched tensor shapes.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resume was requested but no configuration record exists for the run.
    #[error("configuration missing: resume requested but no run config was found at '{}'", .0.display())]
    ConfigMissing(PathBuf),

    /// Prompt and seed lists differ in length.
    #[error("configuration mismatch: {prompts} prompts but {seeds} seeds")]
    ConfigMismatch {
        /// Number of prompts supplied.
        prompts: usize,
        /// Number of seeds supplied.
        seeds: usize,
    },

    /// The diffusion pipeline (or upsampler) failed.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// The video encoder failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// A persisted record could not be read or written.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Filesystem or other I/O failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WalkError {
    /// Build a [`WalkError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WalkError::Pipeline`].
    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }

    /// Build a [`WalkError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`WalkError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
