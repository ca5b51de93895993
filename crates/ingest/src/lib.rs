//! # VOFP Ingest
//!
//! The acquisition boundary. A remote URL goes in; a local, decodable video
//! file and its [`VideoIdentity`] come out, or a definite
//! [`AcquisitionError`]. Nothing downstream retries or sees the network.
//!
//! ## What happens here
//!
//! - **Download** with yt-dlp into a fresh scratch directory under
//!   [`IngestConfig::work_dir`], bounded by a timeout. The child process is
//!   killed when the timeout fires.
//! - **Identify** the video through a metadata probe. When the probe fails the
//!   downloaded file stem becomes the id and the title stays empty.
//! - **Clean up** when the [`AcquiredVideo`] is dropped.
//!
//! ## Example
//!
//! ```no_run
//! use ingest::{IngestConfig, YtDlpFetcher};
//!
//! # async fn run() -> Result<(), ingest::AcquisitionError> {
//! let fetcher = YtDlpFetcher::new(IngestConfig::default())?;
//! let video = fetcher.fetch("https://example.com/watch?v=abc123").await?;
//! println!("{} -> {}", video.identity.id, video.path().display());
//! # Ok(())
//! # }
//! ```

mod config;
mod download;
mod error;
mod metadata;
mod process;
mod types;

pub use crate::config::IngestConfig;
pub use crate::download::{locate_ytdlp, YtDlpFetcher};
pub use crate::error::AcquisitionError;
pub use crate::metadata::{identity_from_info, probe_metadata, stem_id};
pub use crate::types::{AcquiredVideo, VideoIdentity};
