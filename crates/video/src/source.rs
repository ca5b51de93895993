//! Decoder seam.
//!
//! The aggregator never talks to a codec directly. It asks a [`FrameSource`]
//! for a list of frame indices and is handed every frame that decoded.
//! Frames that fail to decode are simply not visited.

use std::path::Path;

use image::RgbImage;

use crate::error::VideoResult;

/// An opened video stream.
pub trait FrameSource: Send {
    /// Human-readable name used in errors and logs.
    fn label(&self) -> &str;

    /// Total number of frames reported by the container, `0` when unknown.
    fn frame_count(&self) -> u64;

    /// Decode the frames at `indices` (strictly increasing) and pass each
    /// successfully decoded one to `visit`, in order.
    fn for_each_frame(
        &mut self,
        indices: &[u64],
        visit: &mut dyn FnMut(u64, RgbImage),
    ) -> VideoResult<()>;
}

/// Opens local video files as [`FrameSource`]s.
pub trait VideoDecoder: Send + Sync {
    fn open(&self, path: &Path) -> VideoResult<Box<dyn FrameSource>>;
}

/// A fully decoded video held in memory. `None` entries behave like frames
/// that fail to decode.
#[derive(Debug, Clone)]
pub struct MemorySource {
    label: String,
    frames: Vec<Option<RgbImage>>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>, frames: Vec<RgbImage>) -> Self {
        Self {
            label: label.into(),
            frames: frames.into_iter().map(Some).collect(),
        }
    }

    /// Build a source where some frames are unreadable.
    pub fn with_gaps(label: impl Into<String>, frames: Vec<Option<RgbImage>>) -> Self {
        Self {
            label: label.into(),
            frames,
        }
    }
}

impl FrameSource for MemorySource {
    fn label(&self) -> &str {
        &self.label
    }

    fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    fn for_each_frame(
        &mut self,
        indices: &[u64],
        visit: &mut dyn FnMut(u64, RgbImage),
    ) -> VideoResult<()> {
        for &idx in indices {
            if let Some(Some(frame)) = self.frames.get(idx as usize) {
                visit(idx, frame.clone());
            }
        }
        Ok(())
    }
}
