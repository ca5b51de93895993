//! Video-level aggregation.
//!
//! Sampled frames are decoded sequentially from one stream. Each decoded frame
//! is cropped and resized right away so that full-resolution pixels are only
//! held for the motion measurement against the previous frame. Per-frame
//! features and frame hashes are then computed in parallel.

use image::GrayImage;
use perceptual::preprocess::grayscale;
use perceptual::{FrameFeatureEncoder, PreparedFrame};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::VideoConfig;
use crate::error::{VideoError, VideoResult};
use crate::motion::{mean_abs_diff, motion_histogram};
use crate::sampler::sample_indices;
use crate::source::FrameSource;

/// Added to the norm before dividing.
pub const L2_EPSILON: f32 = 1e-8;

/// Both outputs of a single decode pass.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAnalysis {
    /// L2-normalized coarse fingerprint.
    pub fingerprint: Vec<f32>,
    /// Packed pHash of every decoded sampled frame, in frame order.
    pub frame_hashes: Vec<u64>,
}

struct SampledFrames {
    prepared: Vec<PreparedFrame>,
    motion: Vec<f32>,
}

/// Turns a [`FrameSource`] into a coarse fingerprint and/or frame hashes.
#[derive(Debug)]
pub struct VideoFingerprinter {
    cfg: VideoConfig,
    encoder: FrameFeatureEncoder,
}

impl VideoFingerprinter {
    pub fn new(cfg: VideoConfig) -> VideoResult<Self> {
        cfg.validate()?;
        let encoder = FrameFeatureEncoder::new(cfg.features.clone())?;
        Ok(Self { cfg, encoder })
    }

    pub fn config(&self) -> &VideoConfig {
        &self.cfg
    }

    /// Length of every fingerprint this instance produces.
    pub fn fingerprint_len(&self) -> usize {
        self.encoder.feature_len() + self.cfg.motion_bins
    }

    /// Coarse, L2-normalized fingerprint of the whole video.
    pub fn fingerprint(&self, source: &mut dyn FrameSource) -> VideoResult<Vec<f32>> {
        let sampled = self.sample(source, true)?;
        Ok(self.aggregate(&sampled))
    }

    /// Packed pHash of every decoded sampled frame.
    pub fn frame_hashes(&self, source: &mut dyn FrameSource) -> VideoResult<Vec<u64>> {
        let sampled = self.sample(source, false)?;
        Ok(self.hashes(&sampled))
    }

    /// Fingerprint and frame hashes from one decode pass.
    pub fn analyze(&self, source: &mut dyn FrameSource) -> VideoResult<VideoAnalysis> {
        let sampled = self.sample(source, true)?;
        Ok(VideoAnalysis {
            fingerprint: self.aggregate(&sampled),
            frame_hashes: self.hashes(&sampled),
        })
    }

    fn sample(&self, source: &mut dyn FrameSource, with_motion: bool) -> VideoResult<SampledFrames> {
        let indices = sample_indices(source.frame_count(), self.cfg.frame_samples);
        let features = &self.cfg.features;

        let mut prepared = Vec::with_capacity(indices.len());
        let mut motion = Vec::new();
        let mut prev_gray: Option<GrayImage> = None;

        source.for_each_frame(&indices, &mut |idx, frame| {
            match PreparedFrame::new(&frame, features) {
                Ok(p) => prepared.push(p),
                Err(e) => {
                    warn!(index = idx, error = %e, "skipping unusable frame");
                    return;
                }
            }
            if with_motion {
                let gray = grayscale(&frame);
                if let Some(prev) = &prev_gray {
                    match mean_abs_diff(prev, &gray) {
                        Some(d) => motion.push(d),
                        None => debug!(index = idx, "frame size changed; motion sample skipped"),
                    }
                }
                prev_gray = Some(gray);
            }
        })?;

        if prepared.is_empty() {
            return Err(VideoError::NoFrames {
                source_label: source.label().to_string(),
            });
        }
        debug!(
            source = source.label(),
            requested = indices.len(),
            decoded = prepared.len(),
            motion_samples = motion.len(),
            "sampled video"
        );
        Ok(SampledFrames { prepared, motion })
    }

    fn aggregate(&self, sampled: &SampledFrames) -> Vec<f32> {
        let per_frame: Vec<Vec<f32>> = sampled
            .prepared
            .par_iter()
            .map(|frame| self.encoder.encode_prepared(frame))
            .collect();
        let visual_mean = mean_columns(&per_frame, self.encoder.feature_len());
        let motion = motion_histogram(&sampled.motion, self.cfg.motion_bins);
        combine(&[
            (self.cfg.visual_weight, visual_mean.as_slice()),
            (self.cfg.motion_weight, motion.as_slice()),
        ])
    }

    fn hashes(&self, sampled: &SampledFrames) -> Vec<u64> {
        sampled
            .prepared
            .par_iter()
            .map(|frame| self.encoder.frame_hash(frame))
            .collect()
    }
}

/// Element-wise arithmetic mean of equally sized rows.
fn mean_columns(rows: &[Vec<f32>], len: usize) -> Vec<f32> {
    let mut sum = vec![0f64; len];
    for row in rows {
        for (acc, &v) in sum.iter_mut().zip(row) {
            *acc += v as f64;
        }
    }
    let n = rows.len().max(1) as f64;
    sum.into_iter().map(|s| (s / n) as f32).collect()
}

/// Scale every part by its weight, concatenate in order, then L2-normalize.
pub fn combine(parts: &[(f32, &[f32])]) -> Vec<f32> {
    let len = parts.iter().map(|(_, p)| p.len()).sum();
    let mut out = Vec::with_capacity(len);
    for &(weight, part) in parts {
        out.extend(part.iter().map(|&v| v * weight));
    }
    l2_normalize(&mut out);
    out
}

/// Divide by the Euclidean norm plus [`L2_EPSILON`].
pub fn l2_normalize(values: &mut [f32]) {
    let norm = values.iter().map(|&v| (v as f64) * (v as f64)).sum::<f64>().sqrt() as f32;
    let denom = norm + L2_EPSILON;
    for v in values.iter_mut() {
        *v /= denom;
    }
}
