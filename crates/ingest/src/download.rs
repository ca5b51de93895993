//! Video download through yt-dlp.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::error::AcquisitionError;
use crate::metadata::{identity_from_info, probe_metadata};
use crate::process::run_tool;
use crate::types::AcquiredVideo;

const YTDLP: &str = "yt-dlp";

/// Container extension preferred when yt-dlp leaves more than one file.
const PREFERRED_EXT: &str = "mp4";

/// Downloads remote videos into per-request scratch directories.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    cfg: IngestConfig,
    binary: PathBuf,
}

impl YtDlpFetcher {
    /// Validate `cfg` and resolve the yt-dlp binary.
    pub fn new(cfg: IngestConfig) -> Result<Self, AcquisitionError> {
        cfg.validate()?;
        let binary = locate_ytdlp(&cfg)?;
        Ok(Self { cfg, binary })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.cfg
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Download `url` and resolve its identity.
    ///
    /// The returned value owns the scratch directory; dropping it deletes the
    /// file. Metadata failures never fail the download, they only cost the
    /// platform id and title.
    pub async fn fetch(&self, url: &str) -> Result<AcquiredVideo, AcquisitionError> {
        tokio::fs::create_dir_all(&self.cfg.work_dir).await?;
        let dir = tempfile::Builder::new()
            .prefix("dl_")
            .tempdir_in(&self.cfg.work_dir)?;

        let template = dir.path().join("%(id)s.%(ext)s").into_os_string();
        let args: Vec<OsString> = vec![
            "--quiet".into(),
            "--no-progress".into(),
            "--no-playlist".into(),
            "--no-part".into(),
            "--merge-output-format".into(),
            PREFERRED_EXT.into(),
            "-f".into(),
            self.cfg.format.as_str().into(),
            "-o".into(),
            template,
            url.into(),
        ];
        run_tool(&self.binary, &args, url, self.cfg.download_timeout()).await?;

        let path = find_download(dir.path())
            .await?
            .ok_or_else(|| AcquisitionError::FileMissing {
                url: url.to_string(),
            })?;

        let info = match probe_metadata(&self.binary, url, self.cfg.metadata_timeout()).await {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(url, error = %e, "metadata probe failed; using file name as id");
                None
            }
        };
        let identity = identity_from_info(url, info.as_deref(), &path);
        info!(id = %identity.id, url, path = %path.display(), "downloaded video");
        Ok(AcquiredVideo::scoped(identity, path, dir))
    }
}

/// Resolve yt-dlp from the configured path or `PATH`.
pub fn locate_ytdlp(cfg: &IngestConfig) -> Result<PathBuf, AcquisitionError> {
    let missing = || AcquisitionError::ToolMissing {
        tool: YTDLP.to_string(),
    };
    match &cfg.ytdlp_path {
        Some(path) if path.is_file() => Ok(path.clone()),
        Some(_) => Err(missing()),
        None => which::which(YTDLP).map_err(|_| missing()),
    }
}

/// Pick the finished download out of a scratch directory.
///
/// Leftover partial files are ignored. Among the rest an `.mp4` wins, then the
/// lexicographically first name.
pub(crate) async fn find_download(dir: &Path) -> Result<Option<PathBuf>, AcquisitionError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if matches!(ext, "part" | "ytdl" | "tmp") {
            continue;
        }
        files.push(path);
    }
    files.sort();
    let preferred = files
        .iter()
        .position(|p| p.extension().and_then(|e| e.to_str()) == Some(PREFERRED_EXT));
    Ok(match preferred {
        Some(i) => Some(files.swap_remove(i)),
        None => files.into_iter().next(),
    })
}
