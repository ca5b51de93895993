use index::CorpusEntry;
use perceptual::hamming;

use crate::types::{Match, MatchError};


/// Lower bound of [`originality_score`].
pub const MIN_ORIGINALITY: f32 = 0.01;

/// Cosine similarity of two L2-normalized vectors, clamped into `[0, 1]`.
///
/// Fails instead of truncating when the lengths differ. A non-finite dot
/// product counts as no similarity.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, MatchError> {
    if a.len() != b.len() {
        return Err(MatchError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    if !dot.is_finite() {
        return Ok(0.0);
    }
    Ok(dot.clamp(0.0, 1.0))
}

/// Rank `corpus` by similarity to `query`, best first, keeping at most
/// `top_k` entries.
///
/// The sort is stable: equal similarities keep corpus order. Every entry
/// must have the query's length; callers filter by dimension first.
pub fn rank(query: &[f32], corpus: &[CorpusEntry], top_k: usize) -> Result<Vec<Match>, MatchError> {
    let mut matches = Vec::with_capacity(corpus.len());
    for entry in corpus {
        matches.push(Match {
            video_id: entry.id.clone(),
            url: entry.url.clone(),
            title: entry.title.clone(),
            similarity: cosine_similarity(query, &entry.vector)?,
        });
    }
    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    matches.truncate(top_k);
    Ok(matches)
}

/// Fraction of `query` hashes whose nearest `candidate` hash lies within
/// `close_bits` Hamming distance.
///
/// With no candidate hashes nothing is close. With no query hashes the
/// result is `0.0`.
pub fn frame_overlap(query: &[u64], candidate: &[u64], close_bits: u32) -> f32 {
    let close = query
        .iter()
        .filter(|&&q| {
            candidate
                .iter()
                .map(|&c| hamming(q, c))
                .min()
                .is_some_and(|d| d <= close_bits)
        })
        .count();
    close as f32 / query.len().max(1) as f32
}

/// Graded originality in `[MIN_ORIGINALITY, 1]` derived from the best coarse
/// similarity: `sqrt(1 - similarity)`, floored.
pub fn originality_score(max_similarity: f32) -> f32 {
    let s = if max_similarity.is_finite() {
        max_similarity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    (1.0 - s).sqrt().max(MIN_ORIGINALITY)
}
