//! Errors produced at the acquisition boundary.
//!
//! Every variant is terminal for the request that raised it. Nothing here is
//! retried by the fingerprinting core.
//!
//! | Error | Meaning |
//! |-------|---------|
//! | [`ToolMissing`](AcquisitionError::ToolMissing) | yt-dlp is not installed |
//! | [`Failed`](AcquisitionError::Failed) | yt-dlp ran and reported failure |
//! | [`TimedOut`](AcquisitionError::TimedOut) | the download exceeded its budget |
//! | [`FileMissing`](AcquisitionError::FileMissing) | yt-dlp succeeded but left no file |
//! | [`Io`](AcquisitionError::Io) | local filesystem or process I/O failed |
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("{tool} not found in PATH")]
    ToolMissing { tool: String },

    #[error("download of {url} failed: {message}")]
    Failed { url: String, message: String },

    #[error("download of {url} timed out after {secs}s")]
    TimedOut { url: String, secs: u64 },

    #[error("download of {url} produced no file")]
    FileMissing { url: String },

    #[error("io error: {0}")]
    Io(String),

    #[error("invalid ingest config: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for AcquisitionError {
    fn from(e: std::io::Error) -> Self {
        AcquisitionError::Io(e.to_string())
    }
}
