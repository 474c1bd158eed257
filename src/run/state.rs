use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::WalkResult;
use crate::pipeline::PipelineConfig;
use crate::run::config::RunConfig;
use crate::run::context::LatentContext;
use crate::run::frames::{FrameLayout, FrameNaming};

/// File name of the persisted run configuration.
pub const CONFIG_FILE_NAME: &str = "prompt_config.json";
/// File name of the persisted latent context.
pub const CONTEXT_FILE_NAME: &str = "latent_context.json";

/// Invocation options that are never persisted.
#[derive(Clone, Debug)]
pub struct WalkOpts {
    /// Root directory; the run lives in `<output_dir>/<name>`.
    pub output_dir: PathBuf,
    /// Continue an interrupted run from its persisted config.
    pub resume: bool,
    /// Maximum frames per pipeline invocation.
    pub batch_size: usize,
    /// Frame file naming.
    pub naming: FrameNaming,
    /// Report per-step pipeline progress.
    pub show_progress: bool,
    /// Ask the pipeline to trade speed for memory.
    pub attention_slicing: bool,
}

impl Default for WalkOpts {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dreams"),
            resume: false,
            batch_size: 1,
            naming: FrameNaming::default(),
            show_progress: true,
            attention_slicing: false,
        }
    }
}

/// A prepared run: resolved configuration, its directory, and where a resume picks up.
///
/// The run directory is single-writer: two walks must not share `<output_dir>/<name>`.
#[derive(Clone, Debug)]
pub struct RunSession {
    dir: PathBuf,
    config: RunConfig,
    opts: WalkOpts,
    resume_from: FrameIndex,
}

impl RunSession {
    /// Prepare a run.
    ///
    /// A fresh run validates `config`, creates the run directory and writes the config record
    /// before anything is generated. A resumed run requires the record to exist, loads every
    /// persisted field from it (`config` only fills fields older records lack) and scans the
    /// frame files for the resume point.
    #[tracing::instrument(skip(config, opts), fields(name = %config.name, resume = opts.resume))]
    pub fn open(config: RunConfig, opts: WalkOpts) -> WalkResult<Self> {
        let dir = opts.output_dir.join(&config.name);
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !opts.resume {
            config.validate()?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create run directory '{}'", dir.display()))?;
            config.save(&config_path)?;
            tracing::info!(dir = %dir.display(), "starting run");
            return Ok(Self {
                dir,
                config,
                opts,
                resume_from: FrameIndex(0),
            });
        }

        let loaded = RunConfig::load(&config_path, &config)?;
        loaded.validate()?;
        let resume_from = opts
            .naming
            .scan_highest(&dir)?
            .map_or(FrameIndex(0), FrameIndex::next);
        tracing::info!(
            dir = %dir.display(),
            from = resume_from.0,
            "resuming run"
        );
        Ok(Self {
            dir,
            config: loaded,
            opts,
            resume_from,
        })
    }

    /// Run directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolved configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Invocation options.
    pub fn opts(&self) -> &WalkOpts {
        &self.opts
    }

    /// Whether this session continues an earlier run.
    pub fn is_resume(&self) -> bool {
        self.opts.resume
    }

    /// First frame index after the highest one found on disk (0 for a fresh run).
    pub fn resume_from(&self) -> FrameIndex {
        self.resume_from
    }

    /// Frame file naming.
    pub fn naming(&self) -> &FrameNaming {
        &self.opts.naming
    }

    /// Planned-frame to frame-index layout.
    pub fn layout(&self) -> FrameLayout {
        FrameLayout::new(self.config.latent_interpolation_steps)
    }

    /// Path of the persisted config record.
    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    /// Pipeline settings for this run.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            scheduler: self.config.scheduler,
            attention_slicing: self.opts.attention_slicing,
            show_progress: self.opts.show_progress,
        }
    }

    /// Whether every frame owned by planned frame `planned` already exists.
    pub fn planned_frame_done(&self, planned: u64) -> bool {
        self.layout()
            .indices(planned)
            .all(|idx| self.opts.naming.path(&self.dir, idx).is_file())
    }

    /// Latent context persisted by an earlier invocation, if any.
    pub fn load_context(&self) -> WalkResult<Option<LatentContext>> {
        LatentContext::load(&self.dir.join(CONTEXT_FILE_NAME))
    }

    /// Persist the latest latent context.
    pub fn store_context(&self, ctx: &LatentContext) -> WalkResult<()> {
        ctx.save(&self.dir.join(CONTEXT_FILE_NAME))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/run/state.rs"]
mod tests;
