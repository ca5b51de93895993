//! Frame preprocessing shared by the feature encoder and the frame hasher.
//!
//! Every frame goes through the same two steps before any feature is
//! computed: a central crop that trims a fixed margin from each border, then
//! an area-averaging resize to a fixed square. Both the coarse features and
//! the precise frame hash rely on this producing identical pixels for
//! identical input.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};

use crate::config::{FeatureConfig, PerceptualError};

/// A frame after crop + resize, with its grayscale plane computed once.
#[derive(Debug, Clone)]
pub struct PreparedFrame {
    pub rgb: RgbImage,
    pub gray: GrayImage,
}

impl PreparedFrame {
    /// Crop, resize and convert `frame` according to `cfg`.
    pub fn new(frame: &RgbImage, cfg: &FeatureConfig) -> Result<Self, PerceptualError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(PerceptualError::EmptyFrame { width, height });
        }
        let cropped = center_crop(frame, cfg.center_crop_margin);
        let rgb = resize_area(&cropped, cfg.frame_side, cfg.frame_side);
        let gray = grayscale(&rgb);
        Ok(Self { rgb, gray })
    }
}

/// Trim `margin` of the height from top and bottom and of the width from left
/// and right. When the crop would leave no pixels the frame is returned as is.
pub fn center_crop(frame: &RgbImage, margin: f32) -> RgbImage {
    let (w, h) = frame.dimensions();
    let dy = (h as f32 * margin) as u32;
    let dx = (w as f32 * margin) as u32;
    if 2 * dy >= h || 2 * dx >= w {
        return frame.clone();
    }
    imageops::crop_imm(frame, dx, dy, w - 2 * dx, h - 2 * dy).to_image()
}

/// BT.601 luma, rounded to nearest.
pub fn grayscale(frame: &RgbImage) -> GrayImage {
    let (w, h) = frame.dimensions();
    let mut out = GrayImage::new(w, h);
    for (x, y, px) in frame.enumerate_pixels() {
        let [r, g, b] = px.0;
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        out.put_pixel(x, y, Luma([luma as u8]));
    }
    out
}

/// Resize with pixel-area averaging.
///
/// Each destination pixel is the coverage-weighted mean of the source pixels
/// it spans. When either axis would be enlarged the area method degenerates,
/// so those frames are resized with a triangle filter instead.
pub fn resize_area(frame: &RgbImage, dst_w: u32, dst_h: u32) -> RgbImage {
    let (src_w, src_h) = frame.dimensions();
    if (src_w, src_h) == (dst_w, dst_h) {
        return frame.clone();
    }
    if src_w < dst_w || src_h < dst_h {
        return imageops::resize(frame, dst_w, dst_h, FilterType::Triangle);
    }

    let x_weights = axis_weights(src_w, dst_w);
    let y_weights = axis_weights(src_h, dst_h);
    let src = frame.as_raw();

    // Horizontal pass: src_h rows of dst_w pixels.
    let mut rows = vec![0f32; src_h as usize * dst_w as usize * 3];
    for y in 0..src_h as usize {
        let src_row = &src[y * src_w as usize * 3..(y + 1) * src_w as usize * 3];
        for (dx, taps) in x_weights.iter().enumerate() {
            let mut acc = [0f32; 3];
            for &(sx, wgt) in taps {
                for c in 0..3 {
                    acc[c] += src_row[sx * 3 + c] as f32 * wgt;
                }
            }
            let base = (y * dst_w as usize + dx) * 3;
            rows[base..base + 3].copy_from_slice(&acc);
        }
    }

    // Vertical pass.
    let mut out = RgbImage::new(dst_w, dst_h);
    for (dy, taps) in y_weights.iter().enumerate() {
        for dx in 0..dst_w as usize {
            let mut acc = [0f32; 3];
            for &(sy, wgt) in taps {
                let base = (sy * dst_w as usize + dx) * 3;
                for c in 0..3 {
                    acc[c] += rows[base + c] * wgt;
                }
            }
            let px = out.get_pixel_mut(dx as u32, dy as u32);
            for c in 0..3 {
                px.0[c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// For each destination index, the source indices it covers and the fraction
/// of the destination cell each one contributes. Weights of a cell sum to 1.
fn axis_weights(src: u32, dst: u32) -> Vec<Vec<(usize, f32)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|d| {
            let start = d as f64 * scale;
            let end = ((d + 1) as f64 * scale).min(src as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src as usize);
            (first..last)
                .filter_map(|s| {
                    let overlap = end.min(s as f64 + 1.0) - start.max(s as f64);
                    (overlap > 1e-9).then(|| (s, (overlap / scale) as f32))
                })
                .collect()
        })
        .collect()
}
