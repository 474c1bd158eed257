use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_run_frames").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn names_are_zero_padded() {
    let n = FrameNaming::default();
    assert_eq!(n.file_name(FrameIndex(0)), "frame000000.png");
    assert_eq!(n.file_name(FrameIndex(42)), "frame000042.png");
    assert_eq!(n.file_name(FrameIndex(1_234_567)), "frame1234567.png");
    assert_eq!(n.printf_pattern(), "frame%06d.png");

    let jpg = FrameNaming::new("jpg").unwrap();
    assert_eq!(jpg.file_name(FrameIndex(3)), "frame000003.jpg");
}

#[test]
fn unsupported_extensions_are_rejected() {
    assert!(FrameNaming::new(".gif").is_err());
    assert!(FrameNaming::new(".PNG").is_ok());
}

#[test]
fn parse_accepts_only_matching_names() {
    let n = FrameNaming::default();
    assert_eq!(n.parse("frame000012.png"), Some(FrameIndex(12)));
    assert_eq!(n.parse("frame1234567.png"), Some(FrameIndex(1_234_567)));
    assert_eq!(n.parse("frame000012.jpg"), None);
    assert_eq!(n.parse("frame12.png"), None);
    assert_eq!(n.parse("frame00001x.png"), None);
    assert_eq!(n.parse("prompt_config.json"), None);
}

#[test]
fn scan_finds_highest_index_and_ignores_others() {
    let dir = scratch("scan");
    let n = FrameNaming::default();
    for name in [
        "frame000000.png",
        "frame000007.png",
        "frame000003.png",
        "frame000099.jpg",
        "prompt_config.json",
    ] {
        std::fs::write(dir.join(name), b"x").unwrap();
    }
    assert_eq!(n.scan_highest(&dir).unwrap(), Some(FrameIndex(7)));
}

#[test]
fn scan_of_empty_or_missing_dir_is_none() {
    let dir = scratch("empty");
    let n = FrameNaming::default();
    assert_eq!(n.scan_highest(&dir).unwrap(), None);
    assert_eq!(n.scan_highest(&dir.join("nope")).unwrap(), None);
}

#[test]
fn save_writes_decodable_png() {
    let dir = scratch("save");
    let n = FrameNaming::default();
    let img = RgbImage::from_pixel(4, 2, image::Rgb([1, 2, 3]));
    let path = n.save(&dir, FrameIndex(5), &img).unwrap();
    assert_eq!(path, dir.join("frame000005.png"));
    let back = image::open(&path).unwrap().to_rgb8();
    assert_eq!(back, img);
}

#[test]
fn layout_without_secondary_interpolation_is_identity() {
    let l = FrameLayout::new(0);
    assert_eq!(l, FrameLayout::new(1));
    assert_eq!(l.output_index(4), FrameIndex(4));
    assert_eq!(l.indices(4).collect::<Vec<_>>(), vec![FrameIndex(4)]);
    assert_eq!(l.total_frames(6), 6);
}

#[test]
fn layout_with_secondary_interpolation_is_gap_free() {
    let l = FrameLayout::new(3);
    assert_eq!(l.indices(0).collect::<Vec<_>>(), vec![FrameIndex(0)]);
    assert_eq!(
        l.indices(1).collect::<Vec<_>>(),
        vec![FrameIndex(1), FrameIndex(2), FrameIndex(3)]
    );
    assert_eq!(l.first_index(2), FrameIndex(4));
    assert_eq!(l.output_index(2), FrameIndex(6));

    let all: Vec<u64> = (0..5).flat_map(|p| l.indices(p)).map(|i| i.0).collect();
    assert_eq!(all, (0..l.total_frames(5)).collect::<Vec<_>>());
}
