//! webpfex rebuilds the full frames of animated WebP files.
//!
//! Animated WebP stores each frame as a rectangle of new pixels plus an offset and a
//! blend/replace flag. Turning that into a sequence of complete images means painting every stored
//! frame, in order, onto one persistent canvas.
//!
//! # Pipeline overview
//!
//! 1. **Inspect**: `webpmux -info` report -> [`AnimationInfo`] ([`parse_animation_info`])
//! 2. **Supply**: each [`FrameDescriptor`] -> delta [`Canvas`] ([`FrameSource`], e.g.
//!    [`WebpmuxFrames`])
//! 3. **Composite**: [`overlay_blend`] or [`overlay_replace`] onto the accumulating canvas
//!    ([`Reconstruction`])
//! 4. **Emit**: the full canvas goes to a [`FrameSink`] (PNG sequence, MP4 through `ffmpeg`, or
//!    memory)
//!
//! Pixels are 16-bit-per-channel straight RGBA packed in a `u64` ([`Color`]). Only "keep
//! everything painted" disposal is modeled, and frame rectangles are never clipped: a rectangle
//! outside the canvas is a contract violation and panics.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod encode;
mod foundation;
mod metadata;
mod render;

pub use assets::raster::{
    Rgba16Image, canvas_from_rgba16, canvas_to_rgba8, canvas_to_rgba16, decode_canvas, save_png,
};
pub use assets::webpmux::{WebpmuxFrames, WebpmuxTool};
pub use config::{ConvertOpts, ToolPaths, is_program_available};
pub use encode::ffmpeg::{
    EncodeConfig, FfmpegEncoder, Mp4Sink, Mp4SinkOpts, default_mp4_config, ensure_parent_dir,
};
pub use encode::sink::{FrameSink, InMemorySink, PngSequenceSink};
pub use foundation::canvas::Canvas;
pub use foundation::color::{Color, MAX_CHANNEL_VALUE};
pub use foundation::error::{WebpfexError, WebpfexResult};
pub use metadata::{AnimationInfo, FrameDescriptor, ParsingError, parse_animation_info};
pub use render::composite::{blend_over, clear, overlay_blend, overlay_replace};
pub use render::export::{convert_to_mp4, extract_frames_as_png, fps_from_first_frame};
pub use render::pipeline::{FrameSource, Reconstruction, RunStats, reconstruct};
