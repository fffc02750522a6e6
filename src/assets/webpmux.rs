use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use crate::{
    assets::raster::decode_canvas,
    config::is_program_available,
    foundation::{
        canvas::Canvas,
        error::{WebpfexError, WebpfexResult},
    },
    metadata::{AnimationInfo, FrameDescriptor, parse_animation_info},
    render::pipeline::FrameSource,
};

/// Thin wrapper over the libwebp `webpmux` command line tool.
#[derive(Clone, Debug)]
pub struct WebpmuxTool {
    program: PathBuf,
}

impl WebpmuxTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn is_available(&self) -> bool {
        is_program_available(&self.program)
    }

    /// Run `webpmux -info <webp>` and parse the report.
    pub fn info(&self, webp: &Path) -> WebpfexResult<AnimationInfo> {
        let out = self.run(Command::new(&self.program).arg("-info").arg(webp), webp)?;
        let report = String::from_utf8_lossy(&out.stdout);
        Ok(parse_animation_info(&report)?)
    }

    /// Raw WebP bytes of stored frame `number` (1-based).
    pub fn extract_frame_bytes(&self, webp: &Path, number: u32) -> WebpfexResult<Vec<u8>> {
        let out = self.run(
            Command::new(&self.program)
                .args(["-get", "frame", &number.to_string()])
                .arg(webp)
                .args(["-o", "-"]),
            webp,
        )?;
        if out.stdout.is_empty() {
            return Err(WebpfexError::tool(format!(
                "webpmux returned no data for frame {number} of '{}'",
                webp.display()
            )));
        }
        Ok(out.stdout)
    }

    /// Decode stored frame `number` (1-based) into a canvas of the frame's own size.
    pub fn extract_frame(&self, webp: &Path, number: u32) -> WebpfexResult<Canvas> {
        let bytes = self.extract_frame_bytes(webp, number)?;
        decode_canvas(&bytes)
    }

    /// Frame source reading delta frames of `webp` through this tool.
    pub fn frames<'a>(&'a self, webp: &'a Path) -> WebpmuxFrames<'a> {
        WebpmuxFrames { tool: self, webp }
    }

    fn run(&self, cmd: &mut Command, webp: &Path) -> WebpfexResult<Output> {
        let out = cmd.output().map_err(|e| {
            WebpfexError::tool(format!(
                "failed to run '{}' (is it installed and on PATH?): {e}",
                self.program.display()
            ))
        })?;
        if !out.status.success() {
            return Err(WebpfexError::tool(format!(
                "webpmux failed for '{}': {}",
                webp.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(out)
    }
}

impl Default for WebpmuxTool {
    fn default() -> Self {
        Self::new("webpmux")
    }
}

/// [`FrameSource`] backed by `webpmux -get frame`.
#[derive(Clone, Copy, Debug)]
pub struct WebpmuxFrames<'a> {
    tool: &'a WebpmuxTool,
    webp: &'a Path,
}

impl FrameSource for WebpmuxFrames<'_> {
    fn load_frame(&mut self, descriptor: &FrameDescriptor) -> WebpfexResult<Canvas> {
        self.tool.extract_frame(self.webp, descriptor.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_tool_error() {
        let tool = WebpmuxTool::new("webpfex-no-such-webpmux");
        assert!(!tool.is_available());

        let err = tool.info(Path::new("anim.webp")).unwrap_err();
        assert!(matches!(err, WebpfexError::Tool(_)));
        assert!(err.to_string().contains("webpfex-no-such-webpmux"));

        let err = tool.extract_frame(Path::new("anim.webp"), 1).unwrap_err();
        assert!(matches!(err, WebpfexError::Tool(_)));
    }

    #[test]
    fn frame_source_forwards_the_frame_number() {
        let tool = WebpmuxTool::new("webpfex-no-such-webpmux");
        let webp = Path::new("anim.webp");
        let mut frames = tool.frames(webp);
        let desc = FrameDescriptor::new(3, 1, 1, false, 0, 0, Default::default(), false);
        assert!(frames.load_frame(&desc).is_err());
    }
}
