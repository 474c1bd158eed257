use super::*;

#[test]
fn prompt_hash_is_streaming_and_stable() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"dreamwalk");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"dream");
    b.write_bytes(b"walk");
    assert_eq!(a.finish(), b.finish());
    // Reference FNV-1a 64 value of the empty input.
    assert_eq!(Fnv1a64::new_default().finish(), 0xcbf2_9ce4_8422_2325);

    let mut c = Fnv1a64::new_default();
    c.write_bytes(b"dreamwalk ");
    assert_ne!(a.finish(), c.finish());
}

#[test]
fn linspace_includes_both_endpoints() {
    assert_eq!(linspace01(3), vec![0.0, 0.5, 1.0]);
    assert_eq!(linspace01(5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn linspace_degenerate_lengths() {
    assert!(linspace01(0).is_empty());
    assert_eq!(linspace01(1), vec![0.0]);
    assert_eq!(linspace01(2), vec![0.0, 1.0]);
}

#[test]
fn linspace_last_is_exactly_one() {
    for n in [2usize, 7, 13, 60, 199] {
        let t = linspace01(n);
        assert_eq!(t.len(), n);
        assert_eq!(t[n - 1], 1.0);
        assert!(t.windows(2).all(|w| w[0] < w[1]));
    }
}
