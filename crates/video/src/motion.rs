//! Inter-frame motion measurement.

use image::GrayImage;

/// Mean absolute difference between two grayscale frames, scaled to `[0, 1]`.
///
/// Returns `None` when the frames differ in size and cannot be compared.
pub fn mean_abs_diff(a: &GrayImage, b: &GrayImage) -> Option<f32> {
    if a.dimensions() != b.dimensions() || a.as_raw().is_empty() {
        return None;
    }
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| x.abs_diff(y) as u64)
        .sum();
    let mean = total as f64 / a.as_raw().len() as f64;
    Some((mean / 255.0) as f32)
}

/// Density histogram of motion samples over `[0, 1]` with `bins` equal bins.
///
/// Heights are `count / (n * bin_width)`, so `Σ height * bin_width ≈ 1`.
/// Samples are clamped into range; `1.0` lands in the last bin. With no
/// samples all mass goes to bin 0 as a plain `1.0`.
pub fn motion_histogram(samples: &[f32], bins: usize) -> Vec<f32> {
    let mut hist = vec![0f32; bins];
    if bins == 0 {
        return hist;
    }
    if samples.is_empty() {
        hist[0] = 1.0;
        return hist;
    }
    for &s in samples {
        let v = s.clamp(0.0, 1.0);
        let bin = ((v * bins as f32) as usize).min(bins - 1);
        hist[bin] += 1.0;
    }
    let bin_width = 1.0 / bins as f32;
    let scale = samples.len() as f32 * bin_width;
    for h in hist.iter_mut() {
        *h /= scale;
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn identical_frames_have_no_motion() {
        let a = GrayImage::from_pixel(8, 8, Luma([77]));
        assert_eq!(mean_abs_diff(&a, &a), Some(0.0));
    }

    #[test]
    fn black_to_white_is_full_motion() {
        let a = GrayImage::from_pixel(8, 8, Luma([0]));
        let b = GrayImage::from_pixel(8, 8, Luma([255]));
        let d = mean_abs_diff(&a, &b).unwrap();
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_sizes_are_skipped() {
        let a = GrayImage::new(8, 8);
        let b = GrayImage::new(8, 9);
        assert_eq!(mean_abs_diff(&a, &b), None);
    }

    #[test]
    fn empty_samples_fall_back_to_first_bin() {
        let h = motion_histogram(&[], 16);
        assert_eq!(h[0], 1.0);
        assert!(h[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn density_integrates_to_one() {
        let samples = [0.0, 0.01, 0.2, 0.5, 0.51, 0.99, 1.0, 1.5];
        let h = motion_histogram(&samples, 16);
        let area: f32 = h.iter().map(|v| v / 16.0).sum();
        assert!((area - 1.0).abs() < 1e-5);
    }

    #[test]
    fn upper_edge_lands_in_last_bin() {
        let h = motion_histogram(&[1.0], 4);
        assert!(h[3] > 0.0);
        assert!(h[..3].iter().all(|&v| v == 0.0));
    }
}
