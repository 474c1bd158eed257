use crate::foundation::error::{WalkError, WalkResult};
use crate::tensor::{Tensor, stack_batch};
use crate::walk::plan::PlannedFrame;

/// Planned frames submitted to the pipeline in one invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    /// Members, in planned order.
    pub frames: Vec<PlannedFrame>,
}

impl Batch {
    /// Number of members.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the batch has no members.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Planned index of the first member.
    pub fn first_planned(&self) -> Option<u64> {
        self.frames.first().map(|f| f.planned)
    }

    /// Member embeddings stacked along the batch axis.
    pub fn embeddings(&self) -> WalkResult<Tensor> {
        let refs: Vec<&Tensor> = self.frames.iter().map(|f| &f.embedding).collect();
        stack_batch(&refs)
    }

    /// Member latents stacked along the batch axis.
    pub fn latents(&self) -> WalkResult<Tensor> {
        let refs: Vec<&Tensor> = self.frames.iter().map(|f| &f.latent).collect();
        stack_batch(&refs)
    }
}

/// Groups planned frames into batches of at most `max` members.
///
/// A batch is flushed when it is full or when the pushed frame ends its anchor pair.
#[derive(Debug)]
pub struct BatchAccumulator {
    max: usize,
    pending: Vec<PlannedFrame>,
}

impl BatchAccumulator {
    /// Accumulator with a maximum batch size of `max`.
    pub fn new(max: usize) -> WalkResult<Self> {
        if max == 0 {
            return Err(WalkError::validation("batch_size must be > 0"));
        }
        Ok(Self {
            max,
            pending: Vec::with_capacity(max),
        })
    }

    /// Maximum batch size.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Frames waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Add a frame; returns a batch when this push completes one.
    pub fn push(&mut self, frame: PlannedFrame) -> Option<Batch> {
        let ends_pair = frame.last_in_pair;
        self.pending.push(frame);
        if self.pending.len() >= self.max || ends_pair {
            return self.flush();
        }
        None
    }

    /// Drain whatever is pending.
    pub fn flush(&mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            return None;
        }
        let frames = std::mem::replace(&mut self.pending, Vec::with_capacity(self.max));
        Some(Batch { frames })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/walk/batch.rs"]
mod tests;
