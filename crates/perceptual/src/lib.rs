//! # VOFP Perceptual Features
//!
//! Frame-level building blocks for the Video Originality Fingerprinting (VOFP)
//! pipeline. Given one decoded RGB frame, this crate produces:
//!
//! - a fixed-length **per-frame feature** (hash bits, HSV joint histogram,
//!   edge-density grid) used by the coarse, vector-based comparison, and
//! - a packed 64-bit **frame hash** (pHash) used by the precise,
//!   frame-by-frame comparison.
//!
//! ## Contract
//!
//! - Every function here is a pure function of `(frame, config)`: no I/O, no
//!   clocks, no global state.
//! - Both outputs start from the same preprocessing (central crop, then area
//!   resize to a fixed square), so a frame hash and a per-frame feature computed
//!   from the same frame describe the same pixels.
//!
//! Invariant: for the same frame and the same [`FeatureConfig`], the output is
//! bit identical.
//!
//! ## Feature layout
//!
//! With the default configuration a per-frame feature has 720 values:
//!
//! | range     | sub-extractor     | normalization          |
//! |-----------|-------------------|------------------------|
//! | 0..192    | pHash, dHash, aHash bits | none (0.0 / 1.0) |
//! | 192..704  | 8×8×8 HSV histogram      | sum ≈ 1          |
//! | 704..720  | 4×4 edge density         | sum ≈ 1          |
//!
//! ## Example Usage
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use perceptual::{frame_phash, hamming, FeatureConfig, FrameFeatureEncoder};
//!
//! let cfg = FeatureConfig::default();
//! let frame = RgbImage::from_fn(320, 240, |x, y| Rgb([x as u8, y as u8, 64]));
//!
//! let encoder = FrameFeatureEncoder::new(cfg.clone()).unwrap();
//! let feature = encoder.encode(&frame).unwrap();
//! assert_eq!(feature.len(), 720);
//!
//! let hash = frame_phash(&frame, &cfg).unwrap();
//! assert_eq!(hamming(hash, hash), 0);
//! ```
//!
pub mod color;
pub mod config;
pub mod edges;
pub mod feature;
pub mod hash;
pub mod preprocess;

pub use crate::config::{FeatureConfig, PerceptualError};
pub use crate::feature::{FrameFeatureEncoder, SubExtractor};
pub use crate::hash::{hamming, pack_bits, FrameHashers};
pub use crate::preprocess::PreparedFrame;

use image::RgbImage;

/// Current feature layout version for this crate.
pub const PERCEPTUAL_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const PERCEPTUAL_ALGORITHM: &str = "phash_dhash_ahash_hsv_canny_v1";

/// Packed pHash of `frame` after the shared crop + resize.
///
/// Builds its hashers on every call; use [`FrameFeatureEncoder::frame_hash`]
/// for many frames.
pub fn frame_phash(frame: &RgbImage, cfg: &FeatureConfig) -> Result<u64, PerceptualError> {
    cfg.validate()?;
    let prepared = PreparedFrame::new(frame, cfg)?;
    Ok(FrameHashers::new(cfg.hash_size).phash(&prepared.gray))
}
