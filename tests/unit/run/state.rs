use super::*;
use crate::foundation::error::WalkError;
use crate::pipeline::Scheduler;

fn root(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_run_state").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn cfg() -> RunConfig {
    RunConfig {
        prompts: vec!["cat".to_string(), "dog".to_string()],
        seeds: vec![1, 2],
        num_steps: 3,
        name: "run".to_string(),
        height: 64,
        width: 64,
        ..RunConfig::default()
    }
}

fn opts(root: &Path, resume: bool) -> WalkOpts {
    WalkOpts {
        output_dir: root.to_path_buf(),
        resume,
        ..WalkOpts::default()
    }
}

#[test]
fn fresh_run_writes_config_before_anything_else() {
    let root = root("fresh");
    let session = RunSession::open(cfg(), opts(&root, false)).unwrap();
    assert_eq!(session.dir(), root.join("run"));
    assert!(session.config_path().is_file());
    assert_eq!(session.resume_from(), FrameIndex(0));

    let text = std::fs::read_to_string(session.config_path()).unwrap();
    assert_eq!(text, cfg().to_json().unwrap());
}

#[test]
fn fresh_run_rejects_mismatch_without_touching_disk() {
    let root = root("mismatch");
    let bad = RunConfig {
        seeds: vec![1],
        ..cfg()
    };
    let err = RunSession::open(bad, opts(&root, false)).unwrap_err();
    assert!(matches!(err, WalkError::ConfigMismatch { .. }));
    assert!(!root.join("run").exists());
}

#[test]
fn resume_without_record_is_config_missing() {
    let root = root("missing");
    let err = RunSession::open(cfg(), opts(&root, true)).unwrap_err();
    assert!(matches!(err, WalkError::ConfigMissing(p) if p == root.join("run").join(CONFIG_FILE_NAME)));
}

#[test]
fn resume_loads_persisted_fields_and_keeps_invocation_options() {
    let root = root("reload");
    let original = RunConfig {
        scheduler: Scheduler::Ddim,
        guidance_scale: 9.0,
        ..cfg()
    };
    RunSession::open(original.clone(), opts(&root, false)).unwrap();

    // Only the name is needed to find the run; everything else comes from the record.
    let invocation = RunConfig {
        prompts: vec![],
        seeds: vec![],
        scheduler: Scheduler::Klms,
        ..cfg()
    };
    let resume_opts = WalkOpts {
        show_progress: false,
        batch_size: 4,
        ..opts(&root, true)
    };
    let session = RunSession::open(invocation, resume_opts).unwrap();
    assert_eq!(session.config(), &original);
    assert_eq!(session.resume_from(), FrameIndex(0));
    assert_eq!(session.opts().batch_size, 4);

    let pc = session.pipeline_config();
    assert_eq!(pc.scheduler, Scheduler::Ddim);
    assert!(!pc.show_progress);
}

#[test]
fn resume_point_follows_highest_frame() {
    let root = root("point");
    let session = RunSession::open(cfg(), opts(&root, false)).unwrap();
    for i in [0u64, 1, 2] {
        std::fs::write(session.naming().path(session.dir(), FrameIndex(i)), b"x").unwrap();
    }
    let resumed = RunSession::open(cfg(), opts(&root, true)).unwrap();
    assert_eq!(resumed.resume_from(), FrameIndex(3));
    assert!(resumed.planned_frame_done(2));
    assert!(!resumed.planned_frame_done(3));
}

#[test]
fn planned_frame_done_requires_every_in_between() {
    let root = root("in_betweens");
    let session = RunSession::open(
        RunConfig {
            latent_interpolation_steps: 3,
            ..cfg()
        },
        opts(&root, false),
    )
    .unwrap();
    let write = |i: u64| {
        std::fs::write(session.naming().path(session.dir(), FrameIndex(i)), b"x").unwrap()
    };
    write(0);
    write(1);
    write(3);
    assert!(session.planned_frame_done(0));
    assert!(!session.planned_frame_done(1));
    write(2);
    assert!(session.planned_frame_done(1));
}
