use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One ranked corpus entry. Produced per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub video_id: String,
    pub url: String,
    pub title: Option<String>,
    /// Cosine similarity clamped into `[0, 1]`.
    pub similarity: f32,
}

/// Errors surfaced by matching operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}
