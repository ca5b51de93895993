//! Identity resolution from yt-dlp metadata.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AcquisitionError;
use crate::process::run_tool;
use crate::types::VideoIdentity;

#[derive(Debug, Deserialize)]
struct InfoJson {
    id: Option<serde_json::Value>,
    title: Option<String>,
}

/// Fetch the platform's JSON description of `url` without downloading it.
pub async fn probe_metadata(
    ytdlp: &Path,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, AcquisitionError> {
    let args = [
        "--dump-single-json",
        "--skip-download",
        "--no-playlist",
        "--no-warnings",
        url,
    ];
    let stdout = run_tool(ytdlp, &args, url, timeout).await?;
    debug!(url, bytes = stdout.len(), "probed video metadata");
    Ok(stdout)
}

/// Fallback identifier derived from the downloaded file name.
pub fn stem_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Build an identity from `--dump-single-json` output.
///
/// Missing, empty or unreadable ids fall back to the file stem; a missing
/// title stays `None`.
pub fn identity_from_info(url: &str, info: Option<&[u8]>, file: &Path) -> VideoIdentity {
    let parsed = info.and_then(|bytes| match serde_json::from_slice::<InfoJson>(bytes) {
        Ok(info) => Some(info),
        Err(e) => {
            warn!(url, error = %e, "unreadable video metadata");
            None
        }
    });
    let (id, title) = match parsed {
        Some(info) => (info.id.and_then(id_string), info.title),
        None => (None, None),
    };
    VideoIdentity {
        id: id.unwrap_or_else(|| stem_id(file)),
        url: url.to_string(),
        title,
    }
}

fn id_string(value: serde_json::Value) -> Option<String> {
    let id = match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let id = id.trim().to_string();
    (!id.is_empty()).then_some(id)
}
