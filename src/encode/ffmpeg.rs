use std::{
    io::Read as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
    thread::JoinHandle,
};

use crate::{
    assets::raster::canvas_to_rgba8,
    config::is_program_available,
    encode::sink::FrameSink,
    foundation::{
        canvas::Canvas,
        error::{WebpfexError, WebpfexResult},
    },
    metadata::{AnimationInfo, FrameDescriptor},
};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
    /// Straight-alpha RGBA8 color that translucent pixels are flattened over.
    pub bg_rgba: [u8; 4],
}

impl EncodeConfig {
    pub fn validate(&self) -> WebpfexResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(WebpfexError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(WebpfexError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // libx264 with yuv420p needs even dimensions.
            return Err(WebpfexError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

pub fn default_mp4_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
        bg_rgba: [0, 0, 0, 255],
    }
}

pub fn ensure_parent_dir(path: &Path) -> WebpfexResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams RGBA8 frames into a system `ffmpeg` process producing an H.264 MP4.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    pub fn new(program: &Path, cfg: EncodeConfig) -> WebpfexResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(WebpfexError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_program_available(program) {
            return Err(WebpfexError::tool(format!(
                "'{}' is required for MP4 encoding, but could not be run",
                program.display()
            )));
        }

        let mut cmd = Command::new(program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            WebpfexError::tool(format!(
                "failed to spawn '{}': {e}",
                program.display()
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WebpfexError::tool("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| WebpfexError::tool("failed to open ffmpeg stderr (unexpected)"))?;
        // Drained on a thread so a chatty ffmpeg cannot block on a full stderr pipe.
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            scratch: vec![0u8; cfg.width as usize * cfg.height as usize * 4],
            cfg,
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
        })
    }

    pub fn config(&self) -> &EncodeConfig {
        &self.cfg
    }

    /// Write one straight-alpha RGBA8 frame of the configured size.
    pub fn encode_frame(&mut self, rgba8: &[u8]) -> WebpfexResult<()> {
        if rgba8.len() != self.scratch.len() {
            return Err(WebpfexError::validation(format!(
                "frame has {} bytes, expected {} for {}x{} rgba8",
                rgba8.len(),
                self.scratch.len(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        flatten_to_opaque_rgba8(&mut self.scratch, rgba8, self.cfg.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(WebpfexError::encode("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            WebpfexError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        Ok(())
    }

    pub fn finish(mut self) -> WebpfexResult<()> {
        drop(self.stdin.take());

        let status = self.child.wait().map_err(|e| {
            WebpfexError::tool(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| WebpfexError::tool("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| WebpfexError::tool(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(WebpfexError::tool(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::info!(path = %self.cfg.out_path.display(), "wrote mp4");
        Ok(())
    }
}

/// Options for [`Mp4Sink`]; the frame size is taken from the animation.
#[derive(Clone, Debug)]
pub struct Mp4SinkOpts {
    pub out_path: PathBuf,
    pub fps: u32,
    pub overwrite: bool,
    pub bg_rgba: [u8; 4],
}

/// [`FrameSink`] that encodes every reconstructed frame into an MP4 through `ffmpeg`.
pub struct Mp4Sink {
    program: PathBuf,
    opts: Mp4SinkOpts,
    encoder: Option<FfmpegEncoder>,
}

impl Mp4Sink {
    pub fn new(program: impl Into<PathBuf>, opts: Mp4SinkOpts) -> Self {
        Self {
            program: program.into(),
            opts,
            encoder: None,
        }
    }
}

impl FrameSink for Mp4Sink {
    fn begin(&mut self, info: &AnimationInfo) -> WebpfexResult<()> {
        let cfg = EncodeConfig {
            width: info.width(),
            height: info.height(),
            fps: self.opts.fps,
            out_path: self.opts.out_path.clone(),
            overwrite: self.opts.overwrite,
            bg_rgba: self.opts.bg_rgba,
        };
        self.encoder = Some(FfmpegEncoder::new(&self.program, cfg)?);
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameDescriptor, canvas: &Canvas) -> WebpfexResult<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| WebpfexError::encode("mp4 sink not started"))?;
        encoder.encode_frame(&canvas_to_rgba8(canvas))?;
        tracing::debug!(frame = frame.number(), "encoded frame");
        Ok(())
    }

    fn end(&mut self) -> WebpfexResult<()> {
        self.encoder
            .take()
            .ok_or_else(|| WebpfexError::encode("mp4 sink not started"))?
            .finish()
    }
}

fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> WebpfexResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(WebpfexError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let r = mul_div255(s[0] as u16, a) + mul_div255(bg_r, inv);
        let g = mul_div255(s[1] as u16, a) + mul_div255(bg_g, inv);
        let b = mul_div255(s[2] as u16, a) + mul_div255(bg_b, inv);

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(default_mp4_config("out.mp4", 0, 10, 25).validate().is_err());
        assert!(default_mp4_config("out.mp4", 11, 10, 25).validate().is_err());
        assert!(default_mp4_config("out.mp4", 10, 10, 0).validate().is_err());
        assert!(default_mp4_config("out.mp4", 640, 640, 25).validate().is_ok());
    }

    #[test]
    fn flatten_straight_over_black_produces_expected_rgb() {
        // Straight red @ 50% alpha => rgb becomes 128,0,0 over black.
        let src = vec![255u8, 0, 0, 128];
        let mut dst = vec![0u8; 4];
        flatten_to_opaque_rgba8(&mut dst, &src, [0, 0, 0, 255]).unwrap();
        assert_eq!(dst, vec![128u8, 0, 0, 255]);
    }

    #[test]
    fn flatten_alpha_0_returns_bg_and_255_is_identity() {
        let src = vec![9u8, 9, 9, 0, 1, 2, 3, 255];
        let mut dst = vec![0u8; 8];
        flatten_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
        assert_eq!(dst, vec![10, 20, 30, 255, 1, 2, 3, 255]);
    }

    #[test]
    fn missing_ffmpeg_is_a_tool_error() {
        let cfg = default_mp4_config(
            PathBuf::from("target").join("ffmpeg_missing").join("out.mp4"),
            2,
            2,
            25,
        );
        let err = FfmpegEncoder::new(Path::new("webpfex-no-such-ffmpeg"), cfg)
            .err()
            .unwrap();
        assert!(matches!(err, WebpfexError::Tool(_)));
    }

    #[test]
    fn mp4_sink_rejects_frames_before_begin() {
        let mut sink = Mp4Sink::new(
            "ffmpeg",
            Mp4SinkOpts {
                out_path: PathBuf::from("unused.mp4"),
                fps: 25,
                overwrite: true,
                bg_rgba: [0, 0, 0, 255],
            },
        );
        let frame = FrameDescriptor::new(1, 1, 1, false, 0, 0, Default::default(), false);
        assert!(sink.push_frame(&frame, &Canvas::new(1, 1)).is_err());
        assert!(sink.end().is_err());
    }
}
