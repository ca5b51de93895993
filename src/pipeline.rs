//! The originality decision.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use index::{BackendConfig, CorpusEntry, FingerprintIndex, FingerprintStore};
use ingest::{VideoIdentity, YtDlpFetcher};
use lru::LruCache;
use matcher::{frame_overlap, originality_score, rank, Match};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::VofpConfig;
use crate::seams::{Acquirer, DecodingAnalyzer, VideoAnalyzer};
use crate::{blocking, MetricsSpan, PipelineError};

/// Thresholds of the two-pass decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecisionConfig {
    /// Best coarse similarity at or above which a video is not original.
    pub not_original_threshold: f32,
    /// Largest Hamming distance that still counts as a matching frame.
    pub hamming_close_bits: u32,
    /// Close-frame fraction at or above which a video is not original.
    pub overlap_threshold: f32,
    /// Matches kept from the coarse ranking; only the best one is used.
    pub coarse_top_k: usize,
    /// Candidate frame-hash arrays kept between requests. `0` disables the
    /// cache and every precise pass re-downloads its candidate.
    pub candidate_cache_capacity: usize,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            not_original_threshold: 0.90,
            hamming_close_bits: 10,
            overlap_threshold: 0.25,
            coarse_top_k: 3,
            candidate_cache_capacity: 0,
        }
    }
}

impl DecisionConfig {
    pub fn with_candidate_cache(mut self, capacity: usize) -> Self {
        self.candidate_cache_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, v) in [
            ("not_original_threshold", self.not_original_threshold),
            ("overlap_threshold", self.overlap_threshold),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(PipelineError::Config(format!(
                    "{name} must be within [0, 1] (got {v})"
                )));
            }
        }
        if self.hamming_close_bits > 64 {
            return Err(PipelineError::Config(format!(
                "hamming_close_bits must be at most 64 (got {})",
                self.hamming_close_bits
            )));
        }
        if self.coarse_top_k == 0 {
            return Err(PipelineError::Config(
                "coarse_top_k must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// The step that settled a verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStage {
    /// Nothing has been indexed yet.
    EmptyCorpus,
    /// The query's id is already in the corpus.
    KnownIdentity,
    /// No stored fingerprint has the query's length.
    NoComparableEntries,
    /// Coarse similarity reached the threshold.
    CoarseMatch,
    /// The precise pass found enough matching frames.
    PreciseOverlap,
    /// The precise pass found too few matching frames.
    PreciseBelowOverlap,
}

impl DecisionStage {
    pub fn is_original(self) -> bool {
        matches!(
            self,
            DecisionStage::EmptyCorpus
                | DecisionStage::NoComparableEntries
                | DecisionStage::PreciseBelowOverlap
        )
    }
}

/// Outcome of one analysis.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisReport {
    pub query: VideoIdentity,
    pub original: bool,
    pub stage: DecisionStage,
    /// Best coarse match, when ranking ran.
    pub best_match: Option<Match>,
    /// Close-frame fraction, when the precise pass ran.
    pub overlap: Option<f32>,
    /// Graded originality from the best coarse similarity. Informational;
    /// never changes `original`.
    pub originality: f32,
}

impl AnalysisReport {
    fn new(
        query: VideoIdentity,
        stage: DecisionStage,
        best_match: Option<Match>,
        overlap: Option<f32>,
    ) -> Self {
        let originality = match (&best_match, stage) {
            (Some(m), _) => originality_score(m.similarity),
            (None, DecisionStage::KnownIdentity) => originality_score(1.0),
            (None, _) => 1.0,
        };
        Self {
            query,
            original: stage.is_original(),
            stage,
            best_match,
            overlap,
            originality,
        }
    }
}

enum Coarse {
    Settled(DecisionStage, Option<Match>),
    Ambiguous(Match),
}

/// Indexes videos and answers "is this original?".
pub struct OriginalityPipeline {
    acquirer: Arc<dyn Acquirer>,
    analyzer: Arc<dyn VideoAnalyzer>,
    store: Arc<dyn FingerprintStore>,
    cfg: DecisionConfig,
    candidates: Option<Mutex<LruCache<String, Arc<[u64]>>>>,
    /// Bumped under the cache lock on every index write. An analysis only
    /// caches candidate hashes when no write happened since it started
    /// reading the corpus.
    generation: AtomicU64,
}

impl OriginalityPipeline {
    pub fn new(
        acquirer: Arc<dyn Acquirer>,
        analyzer: Arc<dyn VideoAnalyzer>,
        store: Arc<dyn FingerprintStore>,
        cfg: DecisionConfig,
    ) -> Result<Self, PipelineError> {
        cfg.validate()?;
        let candidates =
            NonZeroUsize::new(cfg.candidate_cache_capacity).map(|n| Mutex::new(LruCache::new(n)));
        Ok(Self {
            acquirer,
            analyzer,
            store,
            cfg,
            candidates,
            generation: AtomicU64::new(0),
        })
    }

    /// Production wiring: yt-dlp, ffmpeg and the configured corpus backend.
    pub fn from_config(cfg: &VofpConfig) -> Result<Self, PipelineError> {
        Self::from_config_with_backend(cfg, &cfg.index.backend_config())
    }

    /// Like [`from_config`](Self::from_config) with an explicit corpus backend.
    pub fn from_config_with_backend(
        cfg: &VofpConfig,
        backend: &BackendConfig,
    ) -> Result<Self, PipelineError> {
        cfg.validate()?;
        let acquirer = YtDlpFetcher::new(cfg.ingest.clone())?;
        let analyzer = DecodingAnalyzer::ffmpeg(cfg.video.clone())?;
        let store = FingerprintIndex::new(backend)?;
        Self::new(
            Arc::new(acquirer),
            Arc::new(analyzer),
            Arc::new(store),
            cfg.decision.clone(),
        )
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.cfg
    }

    pub fn store(&self) -> &Arc<dyn FingerprintStore> {
        &self.store
    }

    /// Download `url`, fingerprint it and upsert it into the corpus.
    pub async fn index(&self, url: &str) -> Result<VideoIdentity, PipelineError> {
        let video = self.acquirer.acquire(url).await?;
        let identity = video.identity.clone();

        let analyzer = Arc::clone(&self.analyzer);
        let span = MetricsSpan::start();
        let fingerprint = blocking(move || Ok(analyzer.fingerprint(video.path())?)).await;
        if let Some(span) = span {
            span.record_fingerprint(&fingerprint);
        }
        let fingerprint = fingerprint?;

        let store = Arc::clone(&self.store);
        let entry = identity.clone();
        let dims = fingerprint.len();
        blocking(move || {
            store.upsert(&entry.id, &entry.url, entry.title.as_deref(), &fingerprint)?;
            Ok(())
        })
        .await?;

        self.forget_candidate(&identity.id);
        info!(id = %identity.id, url, dims, "indexed video");
        Ok(identity)
    }

    /// Verdict only.
    pub async fn is_original(&self, url: &str) -> Result<bool, PipelineError> {
        Ok(self.analyze(url).await?.original)
    }

    /// Run the full decision for `url` and report how it was reached.
    pub async fn analyze(&self, url: &str) -> Result<AnalysisReport, PipelineError> {
        let video = self.acquirer.acquire(url).await?;
        let query = video.identity.clone();

        let analyzer = Arc::clone(&self.analyzer);
        let span = MetricsSpan::start();
        let analysis = blocking(move || Ok(analyzer.analyze(video.path())?)).await;
        if let Some(span) = span {
            span.record_fingerprint(&analysis);
        }
        let analysis = analysis?;

        let generation = self.generation.load(Ordering::SeqCst);
        let span = MetricsSpan::start();
        let coarse = self.coarse(&query.id, analysis.fingerprint).await;
        if let Some(span) = span {
            span.record_coarse(&coarse);
        }
        let best = match coarse? {
            Coarse::Settled(stage, best) => {
                return Ok(self.settle(AnalysisReport::new(query, stage, best, None)));
            }
            Coarse::Ambiguous(best) => best,
        };

        let span = MetricsSpan::start();
        let overlap = self
            .precise(&best, &analysis.frame_hashes, generation)
            .await;
        if let Some(span) = span {
            span.record_precise(&overlap);
        }
        let overlap = overlap?;
        let stage = if overlap >= self.cfg.overlap_threshold {
            DecisionStage::PreciseOverlap
        } else {
            DecisionStage::PreciseBelowOverlap
        };
        Ok(self.settle(AnalysisReport::new(
            query,
            stage,
            Some(best),
            Some(overlap),
        )))
    }

    fn settle(&self, report: AnalysisReport) -> AnalysisReport {
        info!(
            id = %report.query.id,
            original = report.original,
            stage = ?report.stage,
            similarity = report.best_match.as_ref().map(|m| m.similarity),
            overlap = report.overlap,
            "originality decided"
        );
        report
    }

    async fn coarse(&self, query_id: &str, fingerprint: Vec<f32>) -> Result<Coarse, PipelineError> {
        let store = Arc::clone(&self.store);
        let query_id = query_id.to_string();
        let cfg = self.cfg.clone();
        blocking(move || {
            if store.is_empty()? {
                return Ok(Coarse::Settled(DecisionStage::EmptyCorpus, None));
            }
            let entries = store.all()?;
            if entries.iter().any(|e| e.id == query_id) {
                return Ok(Coarse::Settled(DecisionStage::KnownIdentity, None));
            }

            let total = entries.len();
            let comparable: Vec<CorpusEntry> = entries
                .into_iter()
                .filter(|e| e.vector.len() == fingerprint.len())
                .collect();
            debug!(total, comparable = comparable.len(), "filtered corpus by dimension");

            let ranked = rank(&fingerprint, &comparable, cfg.coarse_top_k)?;
            let Some(best) = ranked.into_iter().next() else {
                return Ok(Coarse::Settled(DecisionStage::NoComparableEntries, None));
            };
            debug!(candidate = %best.video_id, similarity = best.similarity, "coarse best match");
            if best.similarity >= cfg.not_original_threshold {
                Ok(Coarse::Settled(DecisionStage::CoarseMatch, Some(best)))
            } else {
                Ok(Coarse::Ambiguous(best))
            }
        })
        .await
    }

    /// `generation` is the write generation observed before the corpus read
    /// that produced `best`.
    async fn precise(
        &self,
        best: &Match,
        query_hashes: &[u64],
        generation: u64,
    ) -> Result<f32, PipelineError> {
        let candidate = match self.cached_candidate(&best.video_id, generation) {
            Some(hashes) => hashes,
            None => {
                let video = self.acquirer.acquire(&best.url).await?;
                let analyzer = Arc::clone(&self.analyzer);
                let hashes: Arc<[u64]> =
                    blocking(move || Ok(analyzer.frame_hashes(video.path())?.into())).await?;
                self.remember_candidate(&best.video_id, Arc::clone(&hashes), generation);
                hashes
            }
        };
        let overlap = frame_overlap(query_hashes, &candidate, self.cfg.hamming_close_bits);
        debug!(
            candidate = %best.video_id,
            query_frames = query_hashes.len(),
            candidate_frames = candidate.len(),
            overlap,
            "precise pass"
        );
        Ok(overlap)
    }

    fn cache(&self) -> Option<MutexGuard<'_, LruCache<String, Arc<[u64]>>>> {
        self.candidates
            .as_ref()
            .map(|c| c.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    fn cached_candidate(&self, id: &str, generation: u64) -> Option<Arc<[u64]>> {
        let mut cache = self.cache()?;
        if self.generation.load(Ordering::SeqCst) != generation {
            return None;
        }
        cache.get(id).cloned()
    }

    fn remember_candidate(&self, id: &str, hashes: Arc<[u64]>, generation: u64) {
        if let Some(mut cache) = self.cache() {
            if self.generation.load(Ordering::SeqCst) == generation {
                cache.put(id.to_string(), hashes);
            } else {
                debug!(candidate = id, "corpus changed during analysis, not caching");
            }
        }
    }

    fn forget_candidate(&self, id: &str) {
        let cache = self.cache();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(mut cache) = cache {
            cache.pop(id);
        }
    }
}
