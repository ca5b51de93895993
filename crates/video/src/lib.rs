//! # VOFP Video Fingerprinting
//!
//! Drives the perceptual layer across a whole video:
//!
//! 1. **Sampling**: [`sample_indices`] picks evenly spaced frame indices, so
//!    re-fingerprinting the same file always looks at the same frames.
//! 2. **Decoding**: a [`FrameSource`] hands over every sampled frame that
//!    decodes. [`FfmpegDecoder`] opens local files through `ffprobe`/`ffmpeg`;
//!    [`MemorySource`] serves frames already in memory.
//! 3. **Aggregation**: [`VideoFingerprinter`] averages per-frame features,
//!    builds a motion histogram from consecutive frame differences, weights
//!    and concatenates both, then L2-normalizes the result.
//!
//! The same decode pass can also yield the packed pHash of every sampled frame
//! for frame-level comparison.
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use video::{MemorySource, VideoConfig, VideoFingerprinter};
//!
//! let frames: Vec<RgbImage> = (0..10u8)
//!     .map(|i| RgbImage::from_fn(64, 48, move |x, y| Rgb([x as u8 * 4, y as u8 * 5, i * 20])))
//!     .collect();
//! let mut source = MemorySource::new("clip", frames);
//!
//! let fp = VideoFingerprinter::new(VideoConfig::default()).unwrap();
//! let vector = fp.fingerprint(&mut source).unwrap();
//! assert_eq!(vector.len(), 736);
//! ```

pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod fingerprint;
pub mod motion;
pub mod sampler;
pub mod source;

pub use crate::config::VideoConfig;
pub use crate::error::{VideoError, VideoResult};
pub use crate::ffmpeg::{FfmpegDecoder, FfmpegSource, StreamInfo};
pub use crate::fingerprint::{combine, l2_normalize, VideoAnalysis, VideoFingerprinter};
pub use crate::motion::{mean_abs_diff, motion_histogram};
pub use crate::sampler::sample_indices;
pub use crate::source::{FrameSource, MemorySource, VideoDecoder};
