use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use dreamwalk::{
    CollectRequest, DiffusionPipeline, FrameNaming, InterpMode, PipelineConfig, PreviewPipeline,
    ResizeUpsampler, RunConfig, RunSession, Scheduler, WalkOpts, Walker,
};

#[derive(Parser, Debug)]
#[command(name = "dreamwalk", version)]
struct Cli {
    /// Only log warnings and errors (`RUST_LOG` still takes precedence).
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk between prompts and write the frames (optionally an MP4).
    Walk(WalkArgs),
    /// Gather the same frames from several seed runs into per-prompt folders.
    Collect(CollectArgs),
}

#[derive(Parser, Debug)]
struct WalkArgs {
    /// Anchor prompt; repeat for each anchor.
    #[arg(long = "prompt")]
    prompts: Vec<String>,

    /// Read anchor prompts from a file, one per line.
    #[arg(long, conflicts_with = "prompts")]
    prompts_file: Option<PathBuf>,

    /// Anchor seeds, comma separated, one per prompt.
    #[arg(long, value_delimiter = ',')]
    seeds: Vec<u64>,

    /// Frames generated between each pair of anchors.
    #[arg(long, default_value_t = 5)]
    num_steps: usize,

    /// Run name; frames go to `<output-dir>/<name>`.
    #[arg(long, default_value = "berry_good_spaghetti")]
    name: String,

    /// Root directory for runs.
    #[arg(long, default_value = "dreams")]
    output_dir: PathBuf,

    /// Classifier-free guidance scale.
    #[arg(long, default_value_t = 7.5)]
    guidance_scale: f64,

    /// DDIM eta.
    #[arg(long, default_value_t = 0.0)]
    eta: f64,

    /// Denoising steps per frame.
    #[arg(long, default_value_t = 50)]
    num_inference_steps: u32,

    /// Walk from the last anchor back to the first.
    #[arg(long = "loop")]
    do_loop: bool,

    /// Encode the frames to `<name>.mp4` (requires `ffmpeg` on PATH).
    #[arg(long)]
    make_video: bool,

    /// Interpolate prompt embeddings linearly instead of spherically.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    use_lerp_for_text: bool,

    /// Noise scheduler.
    #[arg(long, value_enum, default_value_t = SchedulerChoice::Klms)]
    scheduler: SchedulerChoice,

    /// Upsample every frame before saving.
    #[arg(long)]
    upsample: bool,

    /// Upsampling factor (recorded with the run).
    #[arg(long, default_value_t = ResizeUpsampler::DEFAULT_FACTOR)]
    upsample_factor: u32,

    /// Video frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Output height (multiple of 8).
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Output width (multiple of 8).
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Frames per generated frame including decoded in-betweens; 0 or 1 disables them.
    #[arg(long, default_value_t = 0)]
    latent_interpolation_steps: u32,

    /// How far each frame moves away from the previous latent (1.0 ignores it).
    #[arg(long, default_value_t = 1.0)]
    strength: f64,

    /// Interpolation between seeded latents.
    #[arg(long, value_enum, default_value_t = InterpChoice::Slerp)]
    latent_interpolation: InterpChoice,

    /// Continue the run recorded in `<output-dir>/<name>`.
    #[arg(long)]
    resume: bool,

    /// Frames per pipeline invocation.
    #[arg(long, default_value_t = 1)]
    batch_size: usize,

    /// Frame file extension (`.png` or `.jpg`).
    #[arg(long, default_value = ".png")]
    frame_ext: String,

    /// Trade speed for memory in the pipeline.
    #[arg(long)]
    less_vram: bool,

    /// Hide per-frame pipeline progress.
    #[arg(long)]
    no_progress: bool,

    /// Pipeline backend.
    #[arg(long, value_enum, default_value_t = BackendChoice::Preview)]
    backend: BackendChoice,
}

#[derive(Parser, Debug)]
struct CollectArgs {
    /// Directory holding the per-seed runs.
    #[arg(long)]
    runs_root: PathBuf,

    /// Run directory prefix; the seed is appended.
    #[arg(long, default_value = "")]
    run_prefix: String,

    /// Seeds to gather, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    seeds: Vec<u64>,

    /// Prompt list of the sweep, one per line.
    #[arg(long)]
    prompts_file: PathBuf,

    /// Frame index to gather; repeat for more.
    #[arg(long = "frame", required = true)]
    frames: Vec<u64>,

    /// Frames generated per prompt.
    #[arg(long)]
    frames_per_prompt: u64,

    /// Destination directory.
    #[arg(long)]
    out: PathBuf,

    /// Frame file extension used by the runs.
    #[arg(long, default_value = ".png")]
    frame_ext: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Preview,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchedulerChoice {
    Default,
    Ddim,
    Klms,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InterpChoice {
    Lerp,
    Slerp,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);
    match cli.cmd {
        Command::Walk(args) => cmd_walk(args),
        Command::Collect(args) => cmd_collect(args),
    }
}

fn init_tracing(quiet: bool) {
    let fallback = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn make_pipeline(choice: BackendChoice, cfg: PipelineConfig) -> Box<dyn DiffusionPipeline> {
    match choice {
        BackendChoice::Preview => Box::new(PreviewPipeline::new(cfg)),
    }
}

fn run_config(args: &WalkArgs) -> anyhow::Result<RunConfig> {
    let defaults = RunConfig::default();
    let prompts = match &args.prompts_file {
        Some(path) => dreamwalk::read_prompts(path)?,
        None if args.prompts.is_empty() => defaults.prompts,
        None => args.prompts.clone(),
    };
    let seeds = if args.seeds.is_empty() {
        defaults.seeds
    } else {
        args.seeds.clone()
    };

    Ok(RunConfig {
        prompts,
        seeds,
        num_steps: args.num_steps,
        name: args.name.clone(),
        guidance_scale: args.guidance_scale,
        eta: args.eta,
        num_inference_steps: args.num_inference_steps,
        do_loop: args.do_loop,
        make_video: args.make_video,
        use_lerp_for_text: args.use_lerp_for_text,
        scheduler: match args.scheduler {
            SchedulerChoice::Default => Scheduler::Default,
            SchedulerChoice::Ddim => Scheduler::Ddim,
            SchedulerChoice::Klms => Scheduler::Klms,
        },
        upsample: args.upsample,
        fps: args.fps,
        height: args.height,
        width: args.width,
        latent_interpolation_steps: args.latent_interpolation_steps,
        strength: args.strength,
        latent_interpolation: match args.latent_interpolation {
            InterpChoice::Lerp => InterpMode::Lerp,
            InterpChoice::Slerp => InterpMode::Slerp,
        },
        upsample_factor: args.upsample_factor,
    })
}

fn cmd_walk(args: WalkArgs) -> anyhow::Result<()> {
    let config = run_config(&args)?;
    let opts = WalkOpts {
        output_dir: args.output_dir.clone(),
        resume: args.resume,
        batch_size: args.batch_size,
        naming: FrameNaming::new(&args.frame_ext)?,
        show_progress: !args.no_progress,
        attention_slicing: args.less_vram,
    };

    let session = RunSession::open(config, opts)?;
    if session.config().make_video && !dreamwalk::encode::ffmpeg::is_ffmpeg_on_path() {
        tracing::warn!("ffmpeg was not found on PATH; frames will be written but no video");
    }
    // Built from the resolved config so a resumed run keeps its recorded scheduler.
    let mut pipeline = make_pipeline(args.backend, session.pipeline_config());

    let outcome = Walker::new(pipeline.as_mut())
        .run(&session)
        .with_context(|| format!("walk '{}'", session.dir().display()))?;

    eprintln!(
        "wrote {} frames to {} ({} already present)",
        outcome.frames_written,
        session.dir().display(),
        outcome.frames_skipped
    );
    if let Some(path) = outcome.video_path() {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_collect(args: CollectArgs) -> anyhow::Result<()> {
    let req = CollectRequest {
        prompts: dreamwalk::read_prompts(&args.prompts_file)?,
        runs_root: args.runs_root,
        run_prefix: args.run_prefix,
        seeds: args.seeds,
        frames: args.frames,
        frames_per_prompt: args.frames_per_prompt,
        out_dir: args.out,
        naming: FrameNaming::new(&args.frame_ext)?,
    };
    let written = dreamwalk::collect(&req)?;
    eprintln!("collected {} frames into {}", written.len(), req.out_dir.display());
    Ok(())
}
