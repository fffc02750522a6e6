use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    assets::raster::save_png,
    foundation::{canvas::Canvas, error::WebpfexResult},
    metadata::{AnimationInfo, FrameDescriptor},
};

/// Consumer of reconstructed full frames.
///
/// Ordering contract: `push_frame` is called once per frame in stored order, between one `begin`
/// and one `end`. The canvas passed to `push_frame` is reused for the next frame, so a sink that
/// keeps pixels must copy them.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, info: &AnimationInfo) -> WebpfexResult<()>;
    /// Receive the full canvas after `frame` was composited.
    fn push_frame(&mut self, frame: &FrameDescriptor, canvas: &Canvas) -> WebpfexResult<()>;
    /// Called once after the last frame was pushed.
    fn end(&mut self) -> WebpfexResult<()>;
}

/// In-memory sink for tests and library callers that want every frame as a value.
#[derive(Debug, Default)]
pub struct InMemorySink {
    frames: Vec<(FrameDescriptor, Canvas)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured snapshots in stored order.
    pub fn frames(&self) -> &[(FrameDescriptor, Canvas)] {
        &self.frames
    }

    /// Whether `end` was reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_frames(self) -> Vec<(FrameDescriptor, Canvas)> {
        self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, info: &AnimationInfo) -> WebpfexResult<()> {
        self.frames.clear();
        self.frames.reserve(info.frames().len());
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameDescriptor, canvas: &Canvas) -> WebpfexResult<()> {
        self.frames.push((*frame, canvas.clone()));
        Ok(())
    }

    fn end(&mut self) -> WebpfexResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes each frame as `<out_dir>/<number:09>.png` (16-bit RGBA).
#[derive(Debug)]
pub struct PngSequenceSink {
    out_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            written: Vec::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Files written so far, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn frame_path(&self, frame: &FrameDescriptor) -> PathBuf {
        self.out_dir.join(format!("{:09}.png", frame.number()))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _info: &AnimationInfo) -> WebpfexResult<()> {
        std::fs::create_dir_all(&self.out_dir).with_context(|| {
            format!("failed to create output directory '{}'", self.out_dir.display())
        })?;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameDescriptor, canvas: &Canvas) -> WebpfexResult<()> {
        let path = self.frame_path(frame);
        save_png(canvas, &path)?;
        tracing::debug!(frame = frame.number(), path = %path.display(), "wrote frame");
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> WebpfexResult<()> {
        tracing::info!(
            frames = self.written.len(),
            dir = %self.out_dir.display(),
            "wrote png sequence"
        );
        Ok(())
    }
}
