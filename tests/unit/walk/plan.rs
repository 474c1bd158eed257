use super::*;
use crate::pipeline::preview::PreviewPipeline;

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn endpoints(p: &mut PreviewPipeline, anchors: &[Anchor]) -> Vec<Endpoint> {
    let dims = Dimensions::new(64, 64).unwrap();
    anchors
        .iter()
        .map(|a| a.materialize(&mut *p, dims).unwrap())
        .collect()
}

#[test]
fn anchors_require_matching_lengths() {
    let err = anchors(&strings(&["cat", "dog"]), &[1], false).unwrap_err();
    assert!(matches!(
        err,
        WalkError::ConfigMismatch {
            prompts: 2,
            seeds: 1
        }
    ));
}

#[test]
fn cat_dog_without_loop_is_one_pair_of_three_frames() {
    let anchors = anchors(&strings(&["cat", "dog"]), &[1, 2], false).unwrap();
    assert_eq!(anchors.windows(2).count(), 1);

    let mut p = PreviewPipeline::default();
    let ends = endpoints(&mut p, &anchors);
    let planner = FramePlanner::new(3, InterpMode::Lerp, InterpMode::Slerp).unwrap();
    let frames = planner.plan_pair(0, &ends[0], &ends[1]).unwrap();

    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames.iter().map(|f| f.t).collect::<Vec<_>>(),
        vec![0.0, 0.5, 1.0]
    );
    assert_eq!(
        frames.iter().map(|f| f.last_in_pair).collect::<Vec<_>>(),
        vec![false, false, true]
    );
}

#[test]
fn cat_dog_with_loop_is_two_pairs_of_six_frames() {
    let anchors = anchors(&strings(&["cat", "dog"]), &[1, 2], true).unwrap();
    assert_eq!(anchors.len(), 3);
    assert_eq!(anchors[2], anchors[0]);

    let mut p = PreviewPipeline::default();
    let ends = endpoints(&mut p, &anchors);
    let planner = FramePlanner::new(3, InterpMode::Lerp, InterpMode::Slerp).unwrap();
    let frames: Vec<PlannedFrame> = ends
        .windows(2)
        .enumerate()
        .flat_map(|(pair, w)| planner.plan_pair(pair, &w[0], &w[1]).unwrap())
        .collect();

    assert_eq!(frames.len(), 6);
    assert_eq!(
        frames.iter().map(|f| f.planned).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4, 5]
    );
    // dog -> cat ends where cat -> dog began.
    assert_eq!(frames[5].latent, frames[0].latent);
    assert_eq!(frames[5].embedding, frames[0].embedding);
}

#[test]
fn endpoints_of_a_pair_are_the_anchors() {
    let anchors = anchors(&strings(&["cat", "dog"]), &[1, 2], false).unwrap();
    let mut p = PreviewPipeline::default();
    let ends = endpoints(&mut p, &anchors);
    let planner = FramePlanner::new(4, InterpMode::Slerp, InterpMode::Slerp).unwrap();
    let frames = planner.plan_pair(0, &ends[0], &ends[1]).unwrap();

    let close = |a: &Tensor, b: &Tensor| a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5);
    assert!(close(&frames[0].latent, &ends[0].latent));
    assert!(close(&frames[3].latent, &ends[1].latent));
    assert!(close(&frames[0].embedding, &ends[0].embedding));
    assert!(close(&frames[3].embedding, &ends[1].embedding));
}

#[test]
fn modes_apply_independently() {
    let anchors = anchors(&strings(&["cat", "dog"]), &[1, 2], false).unwrap();
    let mut p = PreviewPipeline::default();
    let ends = endpoints(&mut p, &anchors);

    let lerp_text = FramePlanner::new(3, InterpMode::Lerp, InterpMode::Slerp).unwrap();
    let slerp_text = FramePlanner::new(3, InterpMode::Slerp, InterpMode::Slerp).unwrap();
    let a = lerp_text.plan_step(0, 1, &ends[0], &ends[1]).unwrap();
    let b = slerp_text.plan_step(0, 1, &ends[0], &ends[1]).unwrap();

    assert_eq!(a.latent, b.latent);
    assert_ne!(a.embedding, b.embedding);
}

#[test]
fn planning_is_bit_reproducible() {
    let anchors = anchors(&strings(&["cat", "dog"]), &[1, 2], false).unwrap();
    let mut p = PreviewPipeline::default();
    let ends = endpoints(&mut p, &anchors);
    let planner = FramePlanner::new(5, InterpMode::Lerp, InterpMode::Slerp).unwrap();
    assert_eq!(
        planner.plan_pair(0, &ends[0], &ends[1]).unwrap(),
        planner.plan_pair(0, &ends[0], &ends[1]).unwrap()
    );
}

#[test]
fn single_step_pair_is_its_own_last_frame() {
    let planner = FramePlanner::new(1, InterpMode::Lerp, InterpMode::Slerp).unwrap();
    assert_eq!(planner.fractions(), &[0.0]);
    assert!(FramePlanner::new(0, InterpMode::Lerp, InterpMode::Slerp).is_err());

    let anchors = anchors(&strings(&["cat", "dog"]), &[1, 2], false).unwrap();
    let mut p = PreviewPipeline::default();
    let ends = endpoints(&mut p, &anchors);
    let f = planner.plan_step(0, 0, &ends[0], &ends[1]).unwrap();
    assert!(f.last_in_pair);
    assert!(planner.plan_step(0, 1, &ends[0], &ends[1]).is_err());
}
