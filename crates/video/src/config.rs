use perceptual::FeatureConfig;
use serde::{Deserialize, Serialize};

use crate::error::VideoError;

/// Configuration for video-level aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    /// Number of frames sampled per video.
    pub frame_samples: usize,
    /// Bin count of the motion histogram over `[0, 1]`.
    pub motion_bins: usize,
    /// Scalar applied to the mean per-frame feature before concatenation.
    pub visual_weight: f32,
    /// Scalar applied to the motion histogram before concatenation.
    pub motion_weight: f32,
    /// Per-frame feature configuration.
    pub features: FeatureConfig,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            frame_samples: 64,
            motion_bins: 16,
            visual_weight: 1.0,
            motion_weight: 0.6,
            features: FeatureConfig::default(),
        }
    }
}

impl VideoConfig {
    pub fn with_frame_samples(mut self, frame_samples: usize) -> Self {
        self.frame_samples = frame_samples;
        self
    }

    pub fn with_motion_bins(mut self, motion_bins: usize) -> Self {
        self.motion_bins = motion_bins;
        self
    }

    pub fn with_weights(mut self, visual: f32, motion: f32) -> Self {
        self.visual_weight = visual;
        self.motion_weight = motion;
        self
    }

    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }

    /// Length of every fingerprint produced with this configuration.
    pub fn fingerprint_len(&self) -> usize {
        self.features.feature_len() + self.motion_bins
    }

    pub fn validate(&self) -> Result<(), VideoError> {
        if self.frame_samples == 0 {
            return Err(VideoError::InvalidConfig(
                "frame_samples must be at least 1".into(),
            ));
        }
        if self.motion_bins == 0 {
            return Err(VideoError::InvalidConfig(
                "motion_bins must be at least 1".into(),
            ));
        }
        for (name, w) in [
            ("visual_weight", self.visual_weight),
            ("motion_weight", self.motion_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(VideoError::InvalidConfig(format!(
                    "{name} must be a finite non-negative number (got {w})"
                )));
            }
        }
        self.features.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_fingerprint_is_736() {
        assert_eq!(VideoConfig::default().fingerprint_len(), 736);
    }

    #[test]
    fn rejects_zero_bins() {
        let cfg = VideoConfig::default().with_motion_bins(0);
        assert!(matches!(cfg.validate(), Err(VideoError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_negative_weight() {
        let cfg = VideoConfig::default().with_weights(1.0, -0.1);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn surfaces_feature_errors() {
        let cfg = VideoConfig::default()
            .with_features(FeatureConfig::default().with_hash_size(1));
        assert!(matches!(cfg.validate(), Err(VideoError::Perceptual(_))));
    }
}
