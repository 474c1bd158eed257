use super::*;
use crate::tensor::seeded_normal;

fn frame(pair: usize, step: usize, steps: usize) -> PlannedFrame {
    let planned = (pair * steps + step) as u64;
    PlannedFrame {
        pair,
        step,
        planned,
        t: if steps > 1 {
            step as f64 / (steps - 1) as f64
        } else {
            0.0
        },
        last_in_pair: step + 1 == steps,
        embedding: seeded_normal(planned, &[1, 3, 2]),
        latent: seeded_normal(planned + 1000, &[1, 4, 2, 2]),
    }
}

fn run(pairs: usize, steps: usize, max: usize) -> (Vec<PlannedFrame>, Vec<Batch>) {
    let planned: Vec<PlannedFrame> = (0..pairs)
        .flat_map(|p| (0..steps).map(move |s| frame(p, s, steps)))
        .collect();
    let mut acc = BatchAccumulator::new(max).unwrap();
    let mut batches = Vec::new();
    for f in planned.iter().cloned() {
        if let Some(b) = acc.push(f) {
            batches.push(b);
        }
    }
    assert_eq!(acc.pending(), 0, "pair ends always flush");
    (planned, batches)
}

#[test]
fn zero_batch_size_is_rejected() {
    assert!(BatchAccumulator::new(0).is_err());
}

#[test]
fn batch_count_is_ceil_n_over_k_per_pair() {
    for steps in 1..=9 {
        for max in 1..=5 {
            let (_, batches) = run(1, steps, max);
            assert_eq!(batches.len(), steps.div_ceil(max), "N={steps} K={max}");
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= max));
        }
    }
}

#[test]
fn concatenated_batches_reproduce_plan() {
    let (planned, batches) = run(3, 7, 3);
    let flat: Vec<PlannedFrame> = batches.into_iter().flat_map(|b| b.frames).collect();
    assert_eq!(flat, planned);
}

#[test]
fn batches_never_span_pairs() {
    let (_, batches) = run(2, 5, 4);
    assert_eq!(
        batches.iter().map(Batch::len).collect::<Vec<_>>(),
        vec![4, 1, 4, 1]
    );
    for b in &batches {
        let pair = b.frames[0].pair;
        assert!(b.frames.iter().all(|f| f.pair == pair));
    }
}

#[test]
fn flush_drains_partial_batch() {
    let mut acc = BatchAccumulator::new(4).unwrap();
    assert!(acc.push(frame(0, 0, 5)).is_none());
    assert!(acc.push(frame(0, 1, 5)).is_none());
    let b = acc.flush().unwrap();
    assert_eq!(b.len(), 2);
    assert_eq!(b.first_planned(), Some(0));
    assert!(acc.flush().is_none());
}

#[test]
fn stacked_tensors_have_batch_axis() {
    let (_, batches) = run(1, 3, 3);
    let b = &batches[0];
    assert_eq!(b.latents().unwrap().shape(), &[3, 4, 2, 2]);
    assert_eq!(b.embeddings().unwrap().shape(), &[3, 3, 2]);
}
