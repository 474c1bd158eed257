use super::*;

#[test]
fn seeded_normal_is_deterministic_per_seed() {
    let a = seeded_normal(42, &[1, 4, 8, 8]);
    let b = seeded_normal(42, &[1, 4, 8, 8]);
    let c = seeded_normal(123, &[1, 4, 8, 8]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.shape(), &[1, 4, 8, 8]);
}

#[test]
fn seeded_normal_has_roughly_unit_statistics() {
    let t = seeded_normal(7, &[1, 4, 32, 32]);
    let n = t.len() as f64;
    let mean = t.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let var = t.iter().map(|&v| (f64::from(v) - mean).powi(2)).sum::<f64>() / n;
    assert!(mean.abs() < 0.1, "mean={mean}");
    assert!((var - 1.0).abs() < 0.1, "var={var}");
}

#[test]
fn any_shape_is_filled_from_the_seed() {
    let t = seeded_normal(1, &[1, 3]);
    assert_eq!(t.len(), 3);
    assert!(t.iter().all(|v| v.is_finite()));
    // Same stream, so a longer draw starts with the shorter one.
    let longer = seeded_normal(1, &[1, 5]);
    assert_eq!(t.as_slice().unwrap(), &longer.as_slice().unwrap()[..3]);
    assert_eq!(seeded_normal(1, &[1, 0]).len(), 0);
}

#[test]
fn stack_then_split_preserves_samples() {
    let a = seeded_normal(1, &[1, 2, 3]);
    let b = seeded_normal(2, &[1, 2, 3]);
    let batch = stack_batch(&[&a, &b]).unwrap();
    assert_eq!(batch.shape(), &[2, 2, 3]);

    let parts = split_batch(&batch);
    assert_eq!(parts, vec![a, b]);
}

#[test]
fn stack_rejects_empty_and_mismatched() {
    assert!(stack_batch(&[]).is_err());
    let a = seeded_normal(1, &[1, 2, 3]);
    let b = seeded_normal(2, &[1, 3, 2]);
    assert!(stack_batch(&[&a, &b]).is_err());
    assert!(ensure_same_shape(&a, &b).is_err());
    assert!(ensure_same_shape(&a, &a).is_ok());
}
