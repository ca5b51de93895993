use perceptual::PerceptualError;
use thiserror::Error;

pub type VideoResult<T> = Result<T, VideoError>;

/// Errors raised while turning a video into a fingerprint or frame hashes.
#[derive(Debug, Error)]
pub enum VideoError {
    /// The decoder could not open or read the video at all.
    #[error("cannot decode {source_label}: {reason}")]
    Decode {
        source_label: String,
        reason: String,
    },

    /// Sampling succeeded but not a single frame could be decoded.
    #[error("no frames decoded from {source_label}")]
    NoFrames { source_label: String },

    #[error("invalid video config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Perceptual(#[from] PerceptualError),
}

impl VideoError {
    pub fn decode(source_label: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            source_label: source_label.into(),
            reason: reason.to_string(),
        }
    }
}
