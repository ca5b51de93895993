//! The two collaborators the pipeline drives: something that turns a URL into
//! a local file, and something that turns a local file into fingerprints.

use std::path::Path;

use async_trait::async_trait;
use ingest::{AcquiredVideo, AcquisitionError, YtDlpFetcher};
use video::{
    FfmpegDecoder, VideoAnalysis, VideoConfig, VideoDecoder, VideoError, VideoFingerprinter,
};

/// Fetches a remote video into a local, decodable file.
///
/// Implementations apply their own timeouts and return a definite result.
#[async_trait]
pub trait Acquirer: Send + Sync {
    async fn acquire(&self, url: &str) -> Result<AcquiredVideo, AcquisitionError>;
}

#[async_trait]
impl Acquirer for YtDlpFetcher {
    async fn acquire(&self, url: &str) -> Result<AcquiredVideo, AcquisitionError> {
        self.fetch(url).await
    }
}

/// Fingerprints local video files. Calls are synchronous and CPU-bound.
pub trait VideoAnalyzer: Send + Sync {
    /// Length of every fingerprint this analyzer produces.
    fn fingerprint_len(&self) -> usize;

    fn fingerprint(&self, path: &Path) -> Result<Vec<f32>, VideoError>;

    fn frame_hashes(&self, path: &Path) -> Result<Vec<u64>, VideoError>;

    /// Fingerprint and frame hashes of the same file.
    fn analyze(&self, path: &Path) -> Result<VideoAnalysis, VideoError>;
}

/// [`VideoAnalyzer`] that opens files with a [`VideoDecoder`] and runs a
/// [`VideoFingerprinter`] over them.
pub struct DecodingAnalyzer {
    decoder: Box<dyn VideoDecoder>,
    fingerprinter: VideoFingerprinter,
}

impl DecodingAnalyzer {
    pub fn new<D>(decoder: D, cfg: VideoConfig) -> Result<Self, VideoError>
    where
        D: VideoDecoder + 'static,
    {
        Ok(Self {
            decoder: Box::new(decoder),
            fingerprinter: VideoFingerprinter::new(cfg)?,
        })
    }

    /// Decode with the `ffmpeg`/`ffprobe` binaries found on `PATH`.
    pub fn ffmpeg(cfg: VideoConfig) -> Result<Self, VideoError> {
        Self::new(FfmpegDecoder::from_path()?, cfg)
    }

    pub fn config(&self) -> &VideoConfig {
        self.fingerprinter.config()
    }
}

impl VideoAnalyzer for DecodingAnalyzer {
    fn fingerprint_len(&self) -> usize {
        self.fingerprinter.fingerprint_len()
    }

    fn fingerprint(&self, path: &Path) -> Result<Vec<f32>, VideoError> {
        let mut source = self.decoder.open(path)?;
        self.fingerprinter.fingerprint(source.as_mut())
    }

    fn frame_hashes(&self, path: &Path) -> Result<Vec<u64>, VideoError> {
        let mut source = self.decoder.open(path)?;
        self.fingerprinter.frame_hashes(source.as_mut())
    }

    fn analyze(&self, path: &Path) -> Result<VideoAnalysis, VideoError> {
        let mut source = self.decoder.open(path)?;
        self.fingerprinter.analyze(source.as_mut())
    }
}
