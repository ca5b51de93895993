//! Joint hue/saturation/value histogram.

use image::RgbImage;

/// Added to every normalization denominator.
pub const NORM_EPSILON: f32 = 1e-8;

const HUE_RANGE: u32 = 180;
const CHANNEL_RANGE: u32 = 256;

/// Convert one RGB pixel to 8-bit HSV: hue in `[0, 180)`, saturation and value
/// in `[0, 256)`.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|c| c as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { delta * 255.0 / max } else { 0.0 };
    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }
    // 360 degrees folded into [0, 180).
    let h = ((h / 2.0).round() as u32 % HUE_RANGE) as u8;
    [h, s.round().min(255.0) as u8, max as u8]
}

/// Joint HSV histogram with `bins[0] × bins[1] × bins[2]` cells, hue-major,
/// normalized by its sum.
pub fn hsv_histogram(frame: &RgbImage, bins: [u32; 3]) -> Vec<f32> {
    let [hb, sb, vb] = bins;
    let mut hist = vec![0f32; (hb * sb * vb) as usize];
    for px in frame.pixels() {
        let [h, s, v] = rgb_to_hsv(px.0);
        let hi = (h as u32 * hb / HUE_RANGE).min(hb - 1);
        let si = (s as u32 * sb / CHANNEL_RANGE).min(sb - 1);
        let vi = (v as u32 * vb / CHANNEL_RANGE).min(vb - 1);
        hist[((hi * sb + si) * vb + vi) as usize] += 1.0;
    }
    l1_normalize(&mut hist);
    hist
}

/// Divide every value by the sum plus [`NORM_EPSILON`].
pub(crate) fn l1_normalize(values: &mut [f32]) {
    let total: f32 = values.iter().sum::<f32>() + NORM_EPSILON;
    for v in values.iter_mut() {
        *v /= total;
    }
}
