#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vofp::{
    AcquiredVideo, AcquisitionError, Acquirer, BackendConfig, DecisionConfig, FingerprintIndex,
    FingerprintStore, OriginalityPipeline, VideoAnalysis, VideoAnalyzer, VideoError,
    VideoIdentity,
};

pub fn fake_path(id: &str) -> PathBuf {
    PathBuf::from(format!("/fake/{id}.mp4"))
}

/// Serves known URLs without touching the network and counts requests.
#[derive(Default)]
pub struct FakeAcquirer {
    videos: HashMap<String, (VideoIdentity, PathBuf)>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeAcquirer {
    pub fn with_video(self, url: &str, id: &str) -> Self {
        self.with_file(url, id, id)
    }

    /// `url` resolves to `id`, downloaded as the analyzer's video `file`.
    /// Lets two uploads share one id.
    pub fn with_file(mut self, url: &str, id: &str, file: &str) -> Self {
        self.videos.insert(
            url.to_string(),
            (
                VideoIdentity {
                    id: id.to_string(),
                    url: url.to_string(),
                    title: Some(format!("title of {id}")),
                },
                fake_path(file),
            ),
        );
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Acquirer for FakeAcquirer {
    async fn acquire(&self, url: &str) -> Result<AcquiredVideo, AcquisitionError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        let (identity, path) =
            self.videos
                .get(url)
                .cloned()
                .ok_or_else(|| AcquisitionError::Failed {
                    url: url.to_string(),
                    message: "HTTP Error 404: Not Found".into(),
                })?;
        Ok(AcquiredVideo::unmanaged(identity, path))
    }
}

/// Returns canned fingerprints and frame hashes per video id.
pub struct FakeAnalyzer {
    dims: usize,
    videos: Mutex<HashMap<PathBuf, VideoAnalysis>>,
}

impl FakeAnalyzer {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            videos: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_video(self, id: &str, fingerprint: Vec<f32>, frame_hashes: Vec<u64>) -> Self {
        self.set_video(id, fingerprint, frame_hashes);
        self
    }

    pub fn set_video(&self, id: &str, fingerprint: Vec<f32>, frame_hashes: Vec<u64>) {
        self.videos.lock().unwrap().insert(
            fake_path(id),
            VideoAnalysis {
                fingerprint,
                frame_hashes,
            },
        );
    }

    fn lookup(&self, path: &Path) -> Result<VideoAnalysis, VideoError> {
        self.videos
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| VideoError::decode(path.display().to_string(), "unknown test video"))
    }
}

impl VideoAnalyzer for FakeAnalyzer {
    fn fingerprint_len(&self) -> usize {
        self.dims
    }

    fn fingerprint(&self, path: &Path) -> Result<Vec<f32>, VideoError> {
        Ok(self.lookup(path)?.fingerprint)
    }

    fn frame_hashes(&self, path: &Path) -> Result<Vec<u64>, VideoError> {
        Ok(self.lookup(path)?.frame_hashes)
    }

    fn analyze(&self, path: &Path) -> Result<VideoAnalysis, VideoError> {
        self.lookup(path)
    }
}

/// Unit vector at `similarity` cosine from `[1, 0]`.
pub fn at_similarity(similarity: f32) -> Vec<f32> {
    vec![similarity, (1.0 - similarity * similarity).max(0.0).sqrt()]
}

/// `total` query hashes of which `close` sit within a few bits of `0`.
pub fn query_hashes(close: usize, total: usize) -> Vec<u64> {
    (0..total)
        .map(|i| if i < close { 0b111 } else { u64::MAX })
        .collect()
}

pub struct Harness {
    pub acquirer: Arc<FakeAcquirer>,
    pub analyzer: Arc<FakeAnalyzer>,
    pub store: Arc<FingerprintIndex>,
    pub pipeline: OriginalityPipeline,
}

pub fn harness(acquirer: FakeAcquirer, analyzer: FakeAnalyzer, cfg: DecisionConfig) -> Harness {
    let acquirer = Arc::new(acquirer);
    let analyzer = Arc::new(analyzer);
    let store = Arc::new(FingerprintIndex::new(&BackendConfig::in_memory()).unwrap());
    let pipeline = OriginalityPipeline::new(
        acquirer.clone(),
        analyzer.clone(),
        store.clone() as Arc<dyn FingerprintStore>,
        cfg,
    )
    .unwrap();
    Harness {
        acquirer,
        analyzer,
        store,
        pipeline,
    }
}
