//! Configuration and error types for VOFP frame-level features.
//!
//! This module defines the public configuration surface for the perceptual
//! layer. It is intentionally free of any I/O so that every extractor is a
//! pure function of `(frame, config)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for per-frame feature extraction and frame hashing.
///
/// Any change that alters the produced feature layout must bump `version`,
/// because stored fingerprints are only comparable when they share a layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeatureConfig {
    /// Configuration schema version.
    pub version: u32,
    /// Side length of each perceptual hash grid. `hash_size²` bits per hash;
    /// must fit in a `u64` so the frame hash can be packed.
    pub hash_size: u32,
    /// Side of the tile grid used for the edge-density histogram.
    pub edge_grid: u32,
    /// Bin counts for the joint hue/saturation/value histogram.
    pub hsv_bins: [u32; 3],
    /// Fraction of width/height trimmed from every border before resizing.
    /// Suppresses letterboxing and burned-in borders.
    pub center_crop_margin: f32,
    /// Side of the square every frame is resized to after cropping.
    pub frame_side: u32,
    /// Lower hysteresis threshold for the Canny edge map, on the L1 Sobel
    /// magnitude of the unblurred frame (a `d`-level step scores `4 * d`).
    pub canny_low: f32,
    /// Upper hysteresis threshold, same scale as `canny_low`.
    pub canny_high: f32,
}

impl FeatureConfig {
    /// Create a new configuration with the reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hash_size(mut self, hash_size: u32) -> Self {
        self.hash_size = hash_size;
        self
    }

    pub fn with_edge_grid(mut self, edge_grid: u32) -> Self {
        self.edge_grid = edge_grid;
        self
    }

    pub fn with_hsv_bins(mut self, hsv_bins: [u32; 3]) -> Self {
        self.hsv_bins = hsv_bins;
        self
    }

    pub fn with_center_crop_margin(mut self, margin: f32) -> Self {
        self.center_crop_margin = margin;
        self
    }

    pub fn with_frame_side(mut self, frame_side: u32) -> Self {
        self.frame_side = frame_side;
        self
    }

    /// Number of bits produced by one hash variant.
    pub fn hash_bits(&self) -> usize {
        (self.hash_size * self.hash_size) as usize
    }

    /// Length of the concatenated hash-bit sub-vector (three hash variants).
    pub fn hash_feature_len(&self) -> usize {
        3 * self.hash_bits()
    }

    /// Length of the HSV joint histogram sub-vector.
    pub fn color_feature_len(&self) -> usize {
        self.hsv_bins.iter().map(|&b| b as usize).product()
    }

    /// Length of the edge-density sub-vector.
    pub fn edge_feature_len(&self) -> usize {
        (self.edge_grid * self.edge_grid) as usize
    }

    /// Total PerFrameFeature length for this configuration.
    pub fn feature_len(&self) -> usize {
        self.hash_feature_len() + self.color_feature_len() + self.edge_feature_len()
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if !(2..=8).contains(&self.hash_size) {
            return Err(PerceptualError::InvalidHashSize {
                hash_size: self.hash_size,
            });
        }
        if self.edge_grid == 0 || self.edge_grid > self.frame_side {
            return Err(PerceptualError::InvalidEdgeGrid {
                grid: self.edge_grid,
            });
        }
        let [h, s, v] = self.hsv_bins;
        if h == 0 || s == 0 || v == 0 || h > 180 || s > 256 || v > 256 {
            return Err(PerceptualError::InvalidHsvBins {
                bins: self.hsv_bins,
            });
        }
        if !(0.0..0.5).contains(&self.center_crop_margin) {
            return Err(PerceptualError::InvalidCropMargin {
                margin: self.center_crop_margin,
            });
        }
        if self.frame_side < 4 * self.hash_size {
            return Err(PerceptualError::InvalidFrameSide {
                side: self.frame_side,
            });
        }
        if self.canny_low < 0.0 || self.canny_low > self.canny_high {
            return Err(PerceptualError::InvalidCannyThresholds {
                low: self.canny_low,
                high: self.canny_high,
            });
        }
        Ok(())
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            version: 1,
            hash_size: 8,
            edge_grid: 4,
            hsv_bins: [8, 8, 8],
            center_crop_margin: 0.06,
            frame_side: 256,
            canny_low: 100.0,
            canny_high: 200.0,
        }
    }
}

/// Errors returned by the perceptual layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PerceptualError {
    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("invalid config: hash_size must be in 2..=8 (got {hash_size})")]
    InvalidHashSize { hash_size: u32 },

    #[error("invalid config: edge_grid must be in 1..=frame_side (got {grid})")]
    InvalidEdgeGrid { grid: u32 },

    #[error("invalid config: hsv_bins out of range (got {bins:?})")]
    InvalidHsvBins { bins: [u32; 3] },

    #[error("invalid config: center_crop_margin must be in [0, 0.5) (got {margin})")]
    InvalidCropMargin { margin: f32 },

    #[error("invalid config: frame_side must be >= 4 * hash_size (got {side})")]
    InvalidFrameSide { side: u32 },

    #[error("invalid config: canny thresholds must satisfy 0 <= low <= high (got {low}, {high})")]
    InvalidCannyThresholds { low: f32, high: f32 },

    #[error("frame has no pixels ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
}
