//! # VOFP Matcher (`matcher`)
//!
//! Pure comparison primitives used by the originality decision:
//!
//! - [`cosine_similarity`] and [`rank`]: the coarse pass. Fingerprints are
//!   L2-normalized, so cosine similarity is a dot product, clamped into
//!   `[0, 1]` to absorb floating-point drift. Comparing vectors of different
//!   lengths is an error, never a silent truncation.
//! - [`frame_overlap`]: the precise pass. The fraction of query frame hashes
//!   that have a candidate frame hash within a Hamming radius.
//! - [`originality_score`]: a graded score derived from the best similarity,
//!   reported alongside the boolean verdict.
//!
//! No I/O happens here.
//!
//! ## Example Usage
//!
//! ```
//! use index::CorpusEntry;
//! use matcher::rank;
//!
//! let corpus = vec![
//!     CorpusEntry { id: "a".into(), url: "https://x/a".into(), title: None, vector: vec![1.0, 0.0] },
//!     CorpusEntry { id: "b".into(), url: "https://x/b".into(), title: None, vector: vec![0.6, 0.8] },
//! ];
//! let hits = rank(&[0.6, 0.8], &corpus, 1).unwrap();
//! assert_eq!(hits[0].video_id, "b");
//! ```

mod engine;
mod types;

pub use crate::engine::{
    cosine_similarity, frame_overlap, originality_score, rank, MIN_ORIGINALITY,
};
pub use crate::types::{Match, MatchError};
