use std::path::PathBuf;

use image::RgbImage;

use crate::encode::ffmpeg::FfmpegEncoder;
use crate::encode::{VideoEncoder, VideoRequest};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WalkError, WalkResult};
use crate::pipeline::upsample::{ResizeUpsampler, Upsampler};
use crate::pipeline::{DiffusionPipeline, GenerateRequest, GenerationParams};
use crate::run::context::LatentContext;
use crate::run::frames::FrameLayout;
use crate::run::state::RunSession;
use crate::tensor::interp::lerp;
use crate::tensor::{Tensor, split_batch};
use crate::walk::batch::{Batch, BatchAccumulator};
use crate::walk::plan::{FramePlanner, anchors};

const PROGRESS_EVERY: u64 = 20;

/// Summary of a finished walk.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Frame files written by this invocation.
    pub frames_written: u64,
    /// Planned frames skipped because their files already existed.
    pub frames_skipped: u64,
    /// Pipeline invocations made by this invocation.
    pub pipeline_calls: u64,
    /// Video result when one was requested. Encoding failures land here and never fail the walk.
    pub video: Option<WalkResult<PathBuf>>,
}

impl WalkOutcome {
    /// Path of the written video, if one was requested and encoding succeeded.
    pub fn video_path(&self) -> Option<&PathBuf> {
        self.video.as_ref().and_then(|v| v.as_ref().ok())
    }
}

/// Drives a walk: anchors pairwise, frames planned and batched, one pipeline call per batch,
/// frames written in index order, optional video at the end.
///
/// The pipeline is borrowed for the duration of the walker; collaborators not supplied are
/// defaulted ([`ResizeUpsampler`], [`FfmpegEncoder`]) when the run asks for them.
pub struct Walker<'a> {
    pipeline: &'a mut dyn DiffusionPipeline,
    upsampler: Option<Box<dyn Upsampler + 'a>>,
    encoder: Option<Box<dyn VideoEncoder + 'a>>,
}

struct EmitState<'s> {
    session: &'s RunSession,
    layout: FrameLayout,
    params: GenerationParams,
    prev: Option<LatentContext>,
    stored: Option<LatentContext>,
    next_report: u64,
    outcome: WalkOutcome,
}

impl EmitState<'_> {
    /// Output latent of planned frame `first - 1`, from this invocation or a persisted context.
    fn context_for(&mut self, first: u64) -> Option<Tensor> {
        let follows = |c: &LatentContext| c.planned + 1 == first;
        if self.prev.as_ref().is_some_and(follows) {
            return self.prev.take().map(|c| c.latent);
        }
        if self.stored.as_ref().is_some_and(follows) {
            return self.stored.take().map(|c| c.latent);
        }
        None
    }
}

impl<'a> Walker<'a> {
    /// Walker over `pipeline`.
    pub fn new(pipeline: &'a mut dyn DiffusionPipeline) -> Self {
        Self {
            pipeline,
            upsampler: None,
            encoder: None,
        }
    }

    /// Use `upsampler` when the run enables upsampling.
    pub fn with_upsampler(mut self, upsampler: impl Upsampler + 'a) -> Self {
        self.upsampler = Some(Box::new(upsampler));
        self
    }

    /// Use `encoder` when the run asks for a video.
    pub fn with_encoder(mut self, encoder: impl VideoEncoder + 'a) -> Self {
        self.encoder = Some(Box::new(encoder));
        self
    }

    /// Run the walk described by `session` to completion.
    ///
    /// On a resumed session, planned frames whose files all exist are skipped without touching
    /// the pipeline. Pipeline errors abort the walk; resuming is the recovery path.
    #[tracing::instrument(skip_all, fields(run = %session.config().name))]
    pub fn run(&mut self, session: &RunSession) -> WalkResult<WalkOutcome> {
        let cfg = session.config();
        let anchors = anchors(&cfg.prompts, &cfg.seeds, cfg.do_loop)?;
        let planner = FramePlanner::new(cfg.num_steps, cfg.embed_mode(), cfg.latent_mode())?;
        let mut acc = BatchAccumulator::new(session.opts().batch_size)?;
        let params = cfg.generation_params()?;

        if cfg.upsample && self.upsampler.is_none() {
            self.upsampler = Some(Box::new(ResizeUpsampler::new(cfg.upsample_factor)?));
        }

        let mut st = EmitState {
            session,
            layout: session.layout(),
            params,
            prev: None,
            stored: if session.is_resume() {
                session.load_context()?
            } else {
                None
            },
            next_report: 0,
            outcome: WalkOutcome::default(),
        };

        let Some((first, rest)) = anchors.split_first() else {
            return Ok(st.outcome);
        };
        let total = st.layout.total_frames(cfg.planned_frames());
        tracing::info!(
            pairs = rest.len(),
            planned = cfg.planned_frames(),
            frames = total,
            "walk planned"
        );

        let mut a = first.materialize(&mut *self.pipeline, params.dims)?;
        for (pair, anchor) in rest.iter().enumerate() {
            let b = anchor.materialize(&mut *self.pipeline, params.dims)?;

            for step in 0..planner.steps() {
                let planned = planner.planned_index(pair, step);
                if session.is_resume() && session.planned_frame_done(planned) {
                    tracing::debug!(planned, "frames exist, skipping");
                    st.outcome.frames_skipped += 1;
                    continue;
                }
                let frame = planner.plan_step(pair, step, &a, &b)?;
                if let Some(batch) = acc.push(frame) {
                    self.submit(batch, &mut st, total)?;
                }
            }
            // Leftovers when the pair's final frame was skipped on resume.
            if let Some(batch) = acc.flush() {
                self.submit(batch, &mut st, total)?;
            }
            a = b;
        }

        if cfg.make_video {
            st.outcome.video = Some(self.make_video(session));
        }
        tracing::info!(
            written = st.outcome.frames_written,
            skipped = st.outcome.frames_skipped,
            calls = st.outcome.pipeline_calls,
            "walk finished"
        );
        Ok(st.outcome)
    }

    fn submit(&mut self, batch: Batch, st: &mut EmitState<'_>, total: u64) -> WalkResult<()> {
        let Some(first) = batch.first_planned() else {
            return Ok(());
        };
        let context = st.context_for(first);
        let cfg = st.session.config();
        let strength = if context.is_some() { cfg.strength } else { 1.0 };

        let first_index = st.layout.first_index(first).0;
        if first_index >= st.next_report || batch.frames[0].step == 0 {
            tracing::info!(frame = first_index, total, "progress");
            st.next_report = (first_index / PROGRESS_EVERY + 1) * PROGRESS_EVERY;
        }
        tracing::debug!(first, size = batch.len(), strength, "submitting batch");

        let out = {
            let latents = batch.latents()?;
            let embeddings = batch.embeddings()?;
            self.pipeline.generate(&GenerateRequest {
                latents: &latents,
                embeddings: &embeddings,
                params: st.params,
                strength,
                prev_latent: context.as_ref(),
            })?
        };
        st.outcome.pipeline_calls += 1;

        let out_latents = split_batch(&out.latents);
        if out.images.len() != batch.len() || out_latents.len() != batch.len() {
            return Err(WalkError::pipeline(format!(
                "pipeline returned {} images and {} latents for a batch of {}",
                out.images.len(),
                out_latents.len(),
                batch.len()
            )));
        }

        let mut prev = context;
        let mut last = None;
        for ((frame, image), latent) in batch.frames.iter().zip(out.images).zip(out_latents) {
            self.emit_in_betweens(frame.planned, prev.as_ref(), &latent, &image, st)?;
            self.write(st.layout.output_index(frame.planned), image, st)?;
            // Stored per output so an interruption inside a batch still resumes seamlessly.
            let ctx = LatentContext {
                planned: frame.planned,
                latent,
            };
            st.session.store_context(&ctx)?;
            prev = Some(ctx.latent.clone());
            last = Some(ctx);
        }
        st.prev = last;
        Ok(())
    }

    fn emit_in_betweens(
        &mut self,
        planned: u64,
        prev: Option<&Tensor>,
        latent: &Tensor,
        image: &RgbImage,
        st: &mut EmitState<'_>,
    ) -> WalkResult<()> {
        let n = st.layout.in_betweens();
        if n == 0 || planned == 0 {
            return Ok(());
        }
        let first = st.layout.first_index(planned).0;

        let Some(prev) = prev else {
            tracing::warn!(
                planned,
                "no latent context for in-between frames; repeating the output frame"
            );
            for j in 0..n {
                self.write(FrameIndex(first + j), image.clone(), st)?;
            }
            return Ok(());
        };

        let stride = st.layout.stride() as f64;
        for j in 1..=n {
            let mid = lerp(prev, latent, j as f64 / stride)?;
            let img = self.pipeline.decode(&mid)?;
            self.write(FrameIndex(first + j - 1), img, st)?;
        }
        Ok(())
    }

    fn write(&mut self, idx: FrameIndex, image: RgbImage, st: &mut EmitState<'_>) -> WalkResult<()> {
        let image = match self.upsampler.as_mut() {
            Some(up) if st.session.config().upsample => up.upsample(&image)?,
            _ => image,
        };
        st.session
            .naming()
            .save(st.session.dir(), idx, &image)?;
        st.outcome.frames_written += 1;
        Ok(())
    }

    fn make_video(&mut self, session: &RunSession) -> WalkResult<PathBuf> {
        let cfg = session.config();
        let out_path = session.dir().join(format!("{}.mp4", cfg.name));
        let pattern = session.naming().printf_pattern();
        let req = VideoRequest {
            frame_dir: session.dir(),
            pattern: &pattern,
            fps: cfg.video_fps()?,
            out_path: &out_path,
        };

        let res = match self.encoder.as_mut() {
            Some(enc) => enc.encode(&req),
            None => FfmpegEncoder::default().encode(&req),
        };
        match &res {
            Ok(path) => tracing::info!(path = %path.display(), "video written"),
            Err(e) => tracing::warn!(error = %e, "video encoding failed; frames are kept"),
        }
        res
    }
}

#[cfg(test)]
#[path = "../../tests/unit/walk/driver.rs"]
mod tests;
