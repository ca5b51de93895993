//! Workspace umbrella crate for video originality fingerprinting (VOFP).
//!
//! This crate stitches acquisition, fingerprinting, the corpus and the
//! matcher into the two operations callers actually want:
//!
//! - [`OriginalityPipeline::index`]: download a video, fingerprint it and
//!   upsert it into the corpus.
//! - [`OriginalityPipeline::analyze`] / [`OriginalityPipeline::is_original`]:
//!   download a video and decide whether it is a near-duplicate of anything
//!   already indexed.
//!
//! The decision runs a cheap coarse pass (cosine similarity of whole-video
//! fingerprints) and only falls back to the precise pass (frame pHash overlap
//! against the single best candidate) when the coarse pass is not decisive.
//! [`AnalysisReport::stage`] records which step produced the verdict.
//!
//! Acquisition, decoding and storage are reached through narrow seams
//! ([`Acquirer`], [`VideoAnalyzer`], [`FingerprintStore`]) so the decision
//! logic runs unchanged against in-memory fakes.

pub mod config;
mod pipeline;
mod seams;

pub use index::{
    BackendConfig, CorpusEntry, FingerprintIndex, FingerprintStore, IndexError,
};
pub use ingest::{AcquiredVideo, AcquisitionError, IngestConfig, VideoIdentity, YtDlpFetcher};
pub use matcher::{Match, MatchError};
pub use video::{VideoAnalysis, VideoConfig, VideoError};

pub use crate::config::{ConfigLoadError, VofpConfig};
pub use crate::pipeline::{AnalysisReport, DecisionConfig, DecisionStage, OriginalityPipeline};
pub use crate::seams::{Acquirer, DecodingAnalyzer, VideoAnalyzer};

use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

/// Errors that can occur while indexing or analyzing a video.
#[derive(Debug)]
pub enum PipelineError {
    Acquisition(AcquisitionError),
    Video(VideoError),
    Index(IndexError),
    Match(MatchError),
    Config(String),
    /// A blocking worker panicked or was cancelled.
    Join(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Acquisition(err) => write!(f, "acquisition failure: {err}"),
            PipelineError::Video(err) => write!(f, "fingerprinting failure: {err}"),
            PipelineError::Index(err) => write!(f, "corpus failure: {err}"),
            PipelineError::Match(err) => write!(f, "matching failure: {err}"),
            PipelineError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            PipelineError::Join(msg) => write!(f, "worker task failed: {msg}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Acquisition(err) => Some(err),
            PipelineError::Video(err) => Some(err),
            PipelineError::Index(err) => Some(err),
            PipelineError::Match(err) => Some(err),
            PipelineError::Config(_) | PipelineError::Join(_) => None,
        }
    }
}

impl From<AcquisitionError> for PipelineError {
    fn from(value: AcquisitionError) -> Self {
        PipelineError::Acquisition(value)
    }
}

impl From<VideoError> for PipelineError {
    fn from(value: VideoError) -> Self {
        PipelineError::Video(value)
    }
}

impl From<IndexError> for PipelineError {
    fn from(value: IndexError) -> Self {
        PipelineError::Index(value)
    }
}

impl From<MatchError> for PipelineError {
    fn from(value: MatchError) -> Self {
        PipelineError::Match(value)
    }
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::Config(value.to_string())
    }
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(value: tokio::task::JoinError) -> Self {
        PipelineError::Join(value.to_string())
    }
}

/// Metrics observer for pipeline stages.
///
/// `fingerprint` covers decoding the query (or the video being indexed),
/// `coarse` the corpus scan and ranking, `precise` the candidate download and
/// frame-hash overlap.
pub trait PipelineMetrics: Send + Sync {
    fn record_fingerprint(&self, latency: Duration, result: Result<(), &PipelineError>);
    fn record_coarse(&self, latency: Duration, result: Result<(), &PipelineError>);
    fn record_precise(&self, latency: Duration, result: Result<(), &PipelineError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

pub(crate) struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    pub(crate) fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    pub(crate) fn record_fingerprint<T>(self, result: &Result<T, PipelineError>) {
        self.recorder
            .record_fingerprint(self.start.elapsed(), result.as_ref().map(|_| ()));
    }

    pub(crate) fn record_coarse<T>(self, result: &Result<T, PipelineError>) {
        self.recorder
            .record_coarse(self.start.elapsed(), result.as_ref().map(|_| ()));
    }

    pub(crate) fn record_precise<T>(self, result: &Result<T, PipelineError>) {
        self.recorder
            .record_precise(self.start.elapsed(), result.as_ref().map(|_| ()));
    }
}

/// Run CPU-bound or blocking storage work off the async runtime.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_keep_their_source() {
        let err = PipelineError::from(IndexError::Backend("disk gone".into()));
        assert_eq!(err.to_string(), "corpus failure: backend error: disk gone");
        assert!(err.source().is_some());

        let err = PipelineError::Config("bad".into());
        assert!(err.source().is_none());
    }

    #[test]
    fn acquisition_errors_convert() {
        let err: PipelineError = AcquisitionError::ToolMissing {
            tool: "yt-dlp".into(),
        }
        .into();
        assert!(matches!(err, PipelineError::Acquisition(_)));
    }

    #[tokio::test]
    async fn blocking_surfaces_panics_as_join_errors() {
        let result: Result<(), PipelineError> = blocking(|| panic!("boom")).await;
        assert!(matches!(result, Err(PipelineError::Join(_))));
    }
}
