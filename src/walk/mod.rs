//! The walk itself: anchors to planned frames, planned frames to batches, batches to files.

/// Batch accumulation.
pub mod batch;
/// Pipeline driving, frame emission and video assembly.
pub mod driver;
/// Anchors and frame planning.
pub mod plan;
