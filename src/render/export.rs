use std::path::Path;

use crate::{
    assets::webpmux::WebpmuxTool,
    config::{ConvertOpts, ToolPaths},
    encode::{
        ffmpeg::{Mp4Sink, Mp4SinkOpts},
        sink::PngSequenceSink,
    },
    foundation::error::{WebpfexError, WebpfexResult},
    metadata::AnimationInfo,
    render::pipeline::{RunStats, reconstruct},
};

/// Reconstruct every frame of an animated WebP and write it as `<out_dir>/<number:09>.png`.
///
/// Requires `webpmux` (see [`ToolPaths::webpmux`]).
pub fn extract_frames_as_png(
    tools: &ToolPaths,
    webp: &Path,
    out_dir: &Path,
) -> WebpfexResult<RunStats> {
    let webpmux = WebpmuxTool::new(&tools.webpmux);
    let info = webpmux.info(webp)?;

    let mut sink = PngSequenceSink::new(out_dir);
    reconstruct(&info, &mut webpmux.frames(webp), &mut sink)
}

/// Reconstruct every frame of an animated WebP and encode them into an MP4.
///
/// Requires `webpmux` and `ffmpeg`. Every frame is shown for the same time: `opts.fps`, or the
/// rate implied by the first frame's duration.
pub fn convert_to_mp4(
    tools: &ToolPaths,
    webp: &Path,
    out_path: &Path,
    opts: &ConvertOpts,
) -> WebpfexResult<RunStats> {
    let webpmux = WebpmuxTool::new(&tools.webpmux);
    let info = webpmux.info(webp)?;
    let fps = match opts.fps {
        Some(fps) => fps,
        None => fps_from_first_frame(&info)?,
    };

    let mut sink = Mp4Sink::new(
        &tools.ffmpeg,
        Mp4SinkOpts {
            out_path: out_path.to_path_buf(),
            fps,
            overwrite: opts.overwrite,
            bg_rgba: opts.bg_rgba,
        },
    );
    reconstruct(&info, &mut webpmux.frames(webp), &mut sink)
}

/// `1000 / duration_ms` of the first frame, truncated.
pub fn fps_from_first_frame(info: &AnimationInfo) -> WebpfexResult<u32> {
    let first = info
        .frames()
        .first()
        .ok_or_else(|| WebpfexError::validation("animation has no frames"))?;
    let ms = first.duration().as_millis();
    if ms == 0 {
        return Err(WebpfexError::validation(
            "first frame has zero duration; pass an explicit fps",
        ));
    }

    let fps = 1000 / ms;
    if fps == 0 {
        return Err(WebpfexError::validation(format!(
            "first frame lasts {ms} ms, too long to derive an integer fps; pass an explicit fps"
        )));
    }
    Ok(fps as u32)
}
