//! `ffprobe` / `ffmpeg` backed decoder.
//!
//! The container is probed once for dimensions and frame count, then a single
//! `ffmpeg` process decodes the whole stream and emits only the selected
//! frames as raw `rgb24` on stdout. One stream handle per fingerprinting call,
//! read sequentially.

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::RgbImage;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{VideoError, VideoResult};
use crate::source::{FrameSource, VideoDecoder};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    nb_frames: Option<String>,
    nb_read_packets: Option<String>,
}

/// Stream properties reported by `ffprobe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
}

/// Decoder that shells out to `ffprobe` and `ffmpeg` from `PATH`.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegDecoder {
    /// Locate both binaries on `PATH`.
    pub fn from_path() -> VideoResult<Self> {
        let ffmpeg = which::which("ffmpeg")
            .map_err(|e| VideoError::decode("ffmpeg", format!("not found in PATH: {e}")))?;
        let ffprobe = which::which("ffprobe")
            .map_err(|e| VideoError::decode("ffprobe", format!("not found in PATH: {e}")))?;
        Ok(Self { ffmpeg, ffprobe })
    }

    /// Use explicit binary locations.
    pub fn with_binaries(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn probe(&self, path: &Path) -> VideoResult<StreamInfo> {
        let label = path.display().to_string();
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-select_streams", "v:0", "-count_packets"])
            .args([
                "-show_entries",
                "stream=width,height,nb_frames,nb_read_packets",
                "-of",
                "json",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| VideoError::decode(&label, format!("ffprobe failed to start: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::decode(&label, stderr.trim()));
        }
        parse_probe(&output.stdout).map_err(|reason| VideoError::decode(&label, reason))
    }
}

/// Interpret `ffprobe -of json` output for the first video stream.
pub(crate) fn parse_probe(stdout: &[u8]) -> Result<StreamInfo, String> {
    let probe: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|e| format!("unreadable probe output: {e}"))?;
    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| "no video stream".to_string())?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        (w, h) => return Err(format!("unusable dimensions {w:?}x{h:?}")),
    };
    // Some containers omit nb_frames; the packet count is exact for video.
    let frame_count = [stream.nb_frames, stream.nb_read_packets]
        .into_iter()
        .flatten()
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .find(|&n| n > 0)
        .unwrap_or(0);

    Ok(StreamInfo {
        width,
        height,
        frame_count,
    })
}

impl VideoDecoder for FfmpegDecoder {
    fn open(&self, path: &Path) -> VideoResult<Box<dyn FrameSource>> {
        let info = self.probe(path)?;
        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            frames = info.frame_count,
            "probed video"
        );
        Ok(Box::new(FfmpegSource {
            ffmpeg: self.ffmpeg.clone(),
            path: path.to_path_buf(),
            label: path.display().to_string(),
            info,
        }))
    }
}

/// One opened video file.
#[derive(Debug)]
pub struct FfmpegSource {
    ffmpeg: PathBuf,
    path: PathBuf,
    label: String,
    info: StreamInfo,
}

impl FfmpegSource {
    pub fn info(&self) -> StreamInfo {
        self.info
    }
}

/// `select` filter keeping exactly the frames in `indices`.
pub(crate) fn select_filter(indices: &[u64]) -> String {
    let terms: Vec<String> = indices.iter().map(|i| format!("eq(n,{i})")).collect();
    format!("select='{}'", terms.join("+"))
}

impl FrameSource for FfmpegSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn frame_count(&self) -> u64 {
        self.info.frame_count
    }

    fn for_each_frame(
        &mut self,
        indices: &[u64],
        visit: &mut dyn FnMut(u64, RgbImage),
    ) -> VideoResult<()> {
        if indices.is_empty() {
            return Ok(());
        }
        let mut child = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-nostdin", "-noautorotate", "-i"])
            .arg(&self.path)
            .args(["-map", "0:v:0", "-vf"])
            .arg(select_filter(indices))
            .args(["-fps_mode", "passthrough", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VideoError::decode(&self.label, format!("ffmpeg failed to start: {e}")))?;

        // Drain stderr concurrently so a chatty decoder cannot block stdout.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        let StreamInfo { width, height, .. } = self.info;
        let frame_len = width as usize * height as usize * 3;
        let mut decoded = 0usize;
        if let Some(mut stdout) = child.stdout.take() {
            // Output frames arrive in stream order, one per selected index.
            for &idx in indices {
                let mut buf = vec![0u8; frame_len];
                match stdout.read_exact(&mut buf) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                    Err(e) => {
                        warn!(path = %self.label, error = %e, "frame read failed");
                        break;
                    }
                }
                match RgbImage::from_raw(width, height, buf) {
                    Some(frame) => {
                        decoded += 1;
                        visit(idx, frame);
                    }
                    None => warn!(path = %self.label, index = idx, "malformed frame buffer"),
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| VideoError::decode(&self.label, e))?;
        let stderr = stderr_reader
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        if !status.success() {
            warn!(
                path = %self.label,
                status = %status,
                stderr = %stderr.trim(),
                "ffmpeg exited with failure"
            );
        }
        if decoded < indices.len() {
            debug!(
                path = %self.label,
                requested = indices.len(),
                decoded,
                "some sampled frames did not decode"
            );
        }
        Ok(())
    }
}
