//! Gathering the same frame from several seed runs of one prompt list.
//!
//! A seed sweep produces one run directory per seed (`<runs-root>/<prefix><seed>`). Collecting
//! copies frame `i` of every seed into a folder named after the prompt that frame belongs to,
//! so the seeds can be compared side by side.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WalkError, WalkResult};
use crate::run::frames::FrameNaming;

/// Characters of the prompt kept in a group folder name.
pub const PROMPT_NAME_CHARS: usize = 120;

/// One collection job.
#[derive(Clone, Debug)]
pub struct CollectRequest {
    /// Directory holding the per-seed run directories.
    pub runs_root: PathBuf,
    /// Run directory name prefix; the seed is appended.
    pub run_prefix: String,
    /// Seeds to gather from.
    pub seeds: Vec<u64>,
    /// Prompt list of the sweep, in walk order.
    pub prompts: Vec<String>,
    /// Frame indices to gather.
    pub frames: Vec<u64>,
    /// Frames generated per prompt; frame `i` belongs to prompt `i / frames_per_prompt`.
    pub frames_per_prompt: u64,
    /// Destination root.
    pub out_dir: PathBuf,
    /// Frame file naming used by the runs.
    pub naming: FrameNaming,
}

/// Read a prompt list: one prompt per non-blank line, surrounding whitespace trimmed.
pub fn read_prompts(path: &Path) -> WalkResult<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read prompts file '{}'", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Folder name for prompt group `group`: the group number followed by the start of the prompt.
pub fn group_dir_name(group: u64, prompt: &str) -> String {
    let head: String = prompt
        .chars()
        .take(PROMPT_NAME_CHARS)
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("{group}{}", head.trim_end())
}

/// Copy every requested frame of every seed run; returns the written paths.
///
/// Fails on the first missing source frame, leaving earlier copies in place.
#[tracing::instrument(skip(req), fields(seeds = req.seeds.len(), frames = req.frames.len()))]
pub fn collect(req: &CollectRequest) -> WalkResult<Vec<PathBuf>> {
    if req.frames_per_prompt == 0 {
        return Err(WalkError::validation("frames per prompt must be > 0"));
    }

    let mut written = Vec::with_capacity(req.seeds.len() * req.frames.len());
    for &frame in &req.frames {
        let group = frame / req.frames_per_prompt;
        let prompt = usize::try_from(group)
            .ok()
            .and_then(|g| req.prompts.get(g))
            .ok_or_else(|| {
                WalkError::validation(format!(
                    "frame {frame} belongs to prompt {group}, but only {} prompts were given",
                    req.prompts.len()
                ))
            })?;
        let group_dir = req.out_dir.join(group_dir_name(group, prompt));
        std::fs::create_dir_all(&group_dir)
            .with_context(|| format!("create directory '{}'", group_dir.display()))?;

        for &seed in &req.seeds {
            let run_dir = req.runs_root.join(format!("{}{seed}", req.run_prefix));
            let src = req.naming.path(&run_dir, FrameIndex(frame));
            if !src.is_file() {
                return Err(WalkError::validation(format!(
                    "frame {frame} of seed {seed} not found at '{}'",
                    src.display()
                )));
            }
            let dst = group_dir.join(format!("Seed{seed}{}", req.naming.ext()));
            std::fs::copy(&src, &dst).with_context(|| {
                format!("copy '{}' to '{}'", src.display(), dst.display())
            })?;
            tracing::debug!(src = %src.display(), dst = %dst.display(), "collected");
            written.push(dst);
        }
    }
    tracing::info!(files = written.len(), out = %req.out_dir.display(), "collect finished");
    Ok(written)
}

#[cfg(test)]
#[path = "../tests/unit/collect.rs"]
mod tests;
