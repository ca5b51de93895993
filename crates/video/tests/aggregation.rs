use image::{Rgb, RgbImage};
use video::{MemorySource, VideoConfig, VideoError, VideoFingerprinter};

fn scene(seed: u32, w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        let r = ((x * 3 + seed * 17) % 256) as u8;
        let g = ((y * 5 + seed * 29) % 256) as u8;
        let b = (((x / 16 + y / 16 + seed) % 2) * 200) as u8;
        Rgb([r, g, b])
    })
}

fn clip(len: u32, seed: u32) -> Vec<RgbImage> {
    (0..len).map(|i| scene(seed + i / 10, 160, 120)).collect()
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[test]
fn fingerprint_is_unit_length() {
    let fp = VideoFingerprinter::new(VideoConfig::default()).unwrap();
    for frames in [clip(1, 0), clip(2, 3), clip(40, 7), clip(200, 1)] {
        let v = fp.fingerprint(&mut MemorySource::new("clip", frames)).unwrap();
        assert_eq!(v.len(), 736);
        assert!((norm(&v) - 1.0).abs() < 1e-4);
    }
}

#[test]
fn identical_videos_fingerprint_identically() {
    let fp = VideoFingerprinter::new(VideoConfig::default()).unwrap();
    let a = fp.fingerprint(&mut MemorySource::new("a", clip(90, 4))).unwrap();
    let b = fp.fingerprint(&mut MemorySource::new("b", clip(90, 4))).unwrap();
    assert!(cosine(&a, &b) >= 0.999);
}

#[test]
fn undecodable_frames_are_skipped() {
    let fp = VideoFingerprinter::new(VideoConfig::default()).unwrap();
    let frames: Vec<Option<RgbImage>> = clip(30, 2)
        .into_iter()
        .enumerate()
        .map(|(i, f)| if i % 3 == 1 { None } else { Some(f) })
        .collect();
    let v = fp
        .fingerprint(&mut MemorySource::with_gaps("gappy", frames))
        .unwrap();
    assert!((norm(&v) - 1.0).abs() < 1e-4);
}

#[test]
fn no_decodable_frames_is_an_error() {
    let fp = VideoFingerprinter::new(VideoConfig::default()).unwrap();
    let err = fp
        .fingerprint(&mut MemorySource::with_gaps("broken", vec![None, None, None]))
        .unwrap_err();
    assert!(matches!(err, VideoError::NoFrames { .. }));

    let err = fp
        .frame_hashes(&mut MemorySource::new("empty", Vec::new()))
        .unwrap_err();
    assert!(matches!(err, VideoError::NoFrames { .. }));
}

#[test]
fn frame_hashes_follow_sampling() {
    let cfg = VideoConfig::default().with_frame_samples(8);
    let fp = VideoFingerprinter::new(cfg).unwrap();
    let hashes = fp.frame_hashes(&mut MemorySource::new("c", clip(100, 9))).unwrap();
    assert_eq!(hashes.len(), 8);

    let short = fp.frame_hashes(&mut MemorySource::new("s", clip(3, 9))).unwrap();
    assert_eq!(short.len(), 3);
}

#[test]
fn single_pass_matches_separate_calls() {
    let fp = VideoFingerprinter::new(VideoConfig::default().with_frame_samples(16)).unwrap();
    let frames = clip(50, 5);
    let both = fp.analyze(&mut MemorySource::new("x", frames.clone())).unwrap();
    let vector = fp.fingerprint(&mut MemorySource::new("x", frames.clone())).unwrap();
    let hashes = fp.frame_hashes(&mut MemorySource::new("x", frames)).unwrap();
    assert_eq!(both.fingerprint, vector);
    assert_eq!(both.frame_hashes, hashes);
}

#[test]
fn different_content_scores_lower_than_self() {
    let fp = VideoFingerprinter::new(VideoConfig::default()).unwrap();
    let a = fp.fingerprint(&mut MemorySource::new("a", clip(60, 0))).unwrap();
    let dark: Vec<RgbImage> = (0..60)
        .map(|i| RgbImage::from_pixel(160, 120, Rgb([10, 10, (i % 3) as u8 * 40])))
        .collect();
    let b = fp.fingerprint(&mut MemorySource::new("b", dark)).unwrap();
    assert!(cosine(&a, &b) < cosine(&a, &a) - 1e-3);
}
