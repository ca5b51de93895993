use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;

/// Who a video is: the corpus key plus display metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoIdentity {
    /// Platform identifier, or the downloaded file stem when unavailable.
    pub id: String,
    pub url: String,
    pub title: Option<String>,
}

/// A downloaded video and the scratch directory holding it.
///
/// The directory and file are removed when this value is dropped.
#[derive(Debug)]
pub struct AcquiredVideo {
    pub identity: VideoIdentity,
    path: PathBuf,
    _dir: Option<TempDir>,
}

impl AcquiredVideo {
    /// Wrap a file that lives inside `dir`.
    pub fn scoped(identity: VideoIdentity, path: PathBuf, dir: TempDir) -> Self {
        Self {
            identity,
            path,
            _dir: Some(dir),
        }
    }

    /// Wrap a file whose lifetime the caller manages.
    pub fn unmanaged(identity: VideoIdentity, path: PathBuf) -> Self {
        Self {
            identity,
            path,
            _dir: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
