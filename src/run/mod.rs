//! Run state: the persisted configuration, frame file naming, and resume bookkeeping.

/// Persisted run configuration.
pub mod config;
/// Persisted latent context.
pub mod context;
/// Frame file naming and index layout.
pub mod frames;
/// Run preparation and resume detection.
pub mod state;
