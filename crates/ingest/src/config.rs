//! Configuration for the acquisition boundary.
//!
//! ```rust
//! use ingest::IngestConfig;
//!
//! let config = IngestConfig::default().with_timeout_secs(120);
//! config.validate().expect("valid configuration");
//! ```
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AcquisitionError;

/// Runtime configuration for fetching source videos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// Parent directory for per-download scratch directories.
    pub work_dir: PathBuf,
    /// Upper bound on one download, in seconds.
    pub timeout_secs: u64,
    /// yt-dlp format selector.
    pub format: String,
    /// Upper bound on the metadata probe, in seconds.
    pub metadata_timeout_secs: u64,
    /// Explicit yt-dlp binary; looked up on `PATH` when unset.
    pub ytdlp_path: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("vofp"),
            timeout_secs: 300,
            format: "mp4/best".to_string(),
            metadata_timeout_secs: 60,
            ytdlp_path: None,
        }
    }
}

impl IngestConfig {
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_ytdlp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ytdlp_path = Some(path.into());
        self
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), AcquisitionError> {
        if self.timeout_secs == 0 || self.metadata_timeout_secs == 0 {
            return Err(AcquisitionError::InvalidConfig(
                "timeouts must be at least one second".into(),
            ));
        }
        if self.format.trim().is_empty() {
            return Err(AcquisitionError::InvalidConfig(
                "format selector must not be empty".into(),
            ));
        }
        if self.work_dir.as_os_str().is_empty() {
            return Err(AcquisitionError::InvalidConfig(
                "work_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}
