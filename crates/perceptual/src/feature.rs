//! Ordered list of named sub-extractors that together form a per-frame
//! feature vector.
//!
//! Each sub-extractor produces a fixed-length, independently normalized
//! slice. [`FrameFeatureEncoder`] concatenates them in declaration order; the
//! order is part of the stored fingerprint layout.

use std::sync::Arc;

use image::RgbImage;

use crate::color::hsv_histogram;
use crate::config::{FeatureConfig, PerceptualError};
use crate::edges::edge_density;
use crate::hash::FrameHashers;
use crate::preprocess::PreparedFrame;

/// One named component of the per-frame feature.
pub trait SubExtractor: Send + Sync {
    /// Stable name, used in logs and layout descriptions.
    fn name(&self) -> &'static str;

    /// Number of values [`SubExtractor::extract`] always produces.
    fn len(&self) -> usize;

    /// Append this component's values for `frame` to `out`.
    fn extract(&self, frame: &PreparedFrame, out: &mut Vec<f32>);
}

/// pHash, dHash and aHash bits, in that order, as 0.0 / 1.0 values.
#[derive(Debug, Clone)]
pub struct HashBits {
    hashers: Arc<FrameHashers>,
}

impl SubExtractor for HashBits {
    fn name(&self) -> &'static str {
        "hash_bits"
    }

    fn len(&self) -> usize {
        let side = self.hashers.hash_size() as usize;
        3 * side * side
    }

    fn extract(&self, frame: &PreparedFrame, out: &mut Vec<f32>) {
        for bits in [
            self.hashers.phash_bits(&frame.gray),
            self.hashers.dhash_bits(&frame.gray),
            self.hashers.ahash_bits(&frame.gray),
        ] {
            out.extend(bits.into_iter().map(|b| if b { 1.0 } else { 0.0 }));
        }
    }
}

/// Joint HSV histogram, L1-normalized.
#[derive(Debug, Clone)]
pub struct HsvHistogram {
    bins: [u32; 3],
}

impl SubExtractor for HsvHistogram {
    fn name(&self) -> &'static str {
        "hsv_histogram"
    }

    fn len(&self) -> usize {
        self.bins.iter().map(|&b| b as usize).product()
    }

    fn extract(&self, frame: &PreparedFrame, out: &mut Vec<f32>) {
        out.extend(hsv_histogram(&frame.rgb, self.bins));
    }
}

/// Canny edge density per tile, L1-normalized.
#[derive(Debug, Clone)]
pub struct EdgeDensity {
    grid: u32,
    low: f32,
    high: f32,
}

impl SubExtractor for EdgeDensity {
    fn name(&self) -> &'static str {
        "edge_density"
    }

    fn len(&self) -> usize {
        (self.grid * self.grid) as usize
    }

    fn extract(&self, frame: &PreparedFrame, out: &mut Vec<f32>) {
        out.extend(edge_density(&frame.gray, self.grid, self.low, self.high));
    }
}

/// Turns one decoded frame into its fixed-length per-frame feature.
pub struct FrameFeatureEncoder {
    cfg: FeatureConfig,
    hashers: Arc<FrameHashers>,
    extractors: Vec<Box<dyn SubExtractor>>,
}

impl std::fmt::Debug for FrameFeatureEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameFeatureEncoder")
            .field("layout", &self.layout())
            .finish()
    }
}

impl FrameFeatureEncoder {
    /// Build the reference extractor list (hashes, color, edges) for `cfg`.
    pub fn new(cfg: FeatureConfig) -> Result<Self, PerceptualError> {
        cfg.validate()?;
        let hashers = Arc::new(FrameHashers::new(cfg.hash_size));
        let extractors: Vec<Box<dyn SubExtractor>> = vec![
            Box::new(HashBits {
                hashers: Arc::clone(&hashers),
            }),
            Box::new(HsvHistogram { bins: cfg.hsv_bins }),
            Box::new(EdgeDensity {
                grid: cfg.edge_grid,
                low: cfg.canny_low,
                high: cfg.canny_high,
            }),
        ];
        Ok(Self {
            cfg,
            hashers,
            extractors,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.cfg
    }

    /// `(name, len)` of every sub-extractor in output order.
    pub fn layout(&self) -> Vec<(&'static str, usize)> {
        self.extractors.iter().map(|e| (e.name(), e.len())).collect()
    }

    /// Total length of every vector this encoder produces.
    pub fn feature_len(&self) -> usize {
        self.extractors.iter().map(|e| e.len()).sum()
    }

    /// Preprocess `frame` and encode it.
    pub fn encode(&self, frame: &RgbImage) -> Result<Vec<f32>, PerceptualError> {
        let prepared = PreparedFrame::new(frame, &self.cfg)?;
        Ok(self.encode_prepared(&prepared))
    }

    /// Packed pHash of a prepared frame, for frame-by-frame comparison.
    pub fn frame_hash(&self, frame: &PreparedFrame) -> u64 {
        self.hashers.phash(&frame.gray)
    }

    /// Encode a frame that has already been through [`PreparedFrame::new`].
    pub fn encode_prepared(&self, frame: &PreparedFrame) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.feature_len());
        for extractor in &self.extractors {
            let start = out.len();
            extractor.extract(frame, &mut out);
            debug_assert_eq!(
                out.len() - start,
                extractor.len(),
                "{} produced the wrong number of values",
                extractor.name()
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn frame() -> RgbImage {
        RgbImage::from_fn(320, 240, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn layout_matches_reference() {
        let enc = FrameFeatureEncoder::new(FeatureConfig::default()).unwrap();
        assert_eq!(
            enc.layout(),
            vec![("hash_bits", 192), ("hsv_histogram", 512), ("edge_density", 16)]
        );
        assert_eq!(enc.feature_len(), 720);
    }

    #[test]
    fn encode_produces_fixed_length() {
        let enc = FrameFeatureEncoder::new(FeatureConfig::default()).unwrap();
        let v = enc.encode(&frame()).unwrap();
        assert_eq!(v.len(), 720);
        assert!(v.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn encode_is_deterministic() {
        let enc = FrameFeatureEncoder::new(FeatureConfig::default()).unwrap();
        let f = frame();
        assert_eq!(enc.encode(&f).unwrap(), enc.encode(&f).unwrap());
    }

    #[test]
    fn hash_bits_are_binary_and_histograms_sum_to_one() {
        let enc = FrameFeatureEncoder::new(FeatureConfig::default()).unwrap();
        let v = enc.encode(&frame()).unwrap();
        assert!(v[..192].iter().all(|&b| b == 0.0 || b == 1.0));
        let color: f32 = v[192..704].iter().sum();
        assert!((color - 1.0).abs() < 1e-4);
        let edges: f32 = v[704..].iter().sum();
        assert!((edges - 1.0).abs() < 1e-4);
    }

    #[test]
    fn stepped_frame_fills_edge_grid() {
        // 80-level luma bands; each boundary is an edge
        let frame = RgbImage::from_fn(320, 240, |x, _| {
            let v = if (x / 40) % 2 == 0 { 90 } else { 170 };
            Rgb([v, v, v])
        });
        let enc = FrameFeatureEncoder::new(FeatureConfig::default()).unwrap();
        let v = enc.encode(&frame).unwrap();
        let edges = &v[704..];
        assert!((edges.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        assert!(edges.iter().filter(|&&e| e > 0.0).count() >= 8);
    }

    #[test]
    fn frame_hash_matches_standalone_phash() {
        let cfg = FeatureConfig::default();
        let enc = FrameFeatureEncoder::new(cfg.clone()).unwrap();
        let prepared = PreparedFrame::new(&frame(), &cfg).unwrap();
        assert_eq!(
            enc.frame_hash(&prepared),
            crate::frame_phash(&frame(), &cfg).unwrap()
        );
    }

    #[test]
    fn smaller_hash_shrinks_layout() {
        let cfg = FeatureConfig::default().with_hash_size(4);
        let enc = FrameFeatureEncoder::new(cfg).unwrap();
        assert_eq!(enc.feature_len(), 48 + 512 + 16);
        assert_eq!(enc.encode(&frame()).unwrap().len(), 576);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = FeatureConfig::default().with_edge_grid(0);
        assert!(FrameFeatureEncoder::new(cfg).is_err());
    }
}
