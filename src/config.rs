use std::path::{Path, PathBuf};

/// External programs invoked by the extraction and conversion entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolPaths {
    /// `webpmux` from libwebp, used to read metadata and pull single frames.
    pub webpmux: PathBuf,
    /// `ffmpeg`, used for MP4 output only.
    pub ffmpeg: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            webpmux: PathBuf::from("webpmux"),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// Options for [`crate::convert_to_mp4`].
#[derive(Clone, Debug)]
pub struct ConvertOpts {
    /// Output frame rate. Derived from the first frame's duration when unset.
    pub fps: Option<u32>,
    /// Color to flatten alpha over (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Whether to overwrite the output file if it already exists.
    pub overwrite: bool,
}

impl Default for ConvertOpts {
    fn default() -> Self {
        Self {
            fps: None,
            bg_rgba: [0, 0, 0, 255],
            overwrite: true,
        }
    }
}

/// Return `true` when `program -version` can be run successfully.
///
/// Both `webpmux` and `ffmpeg` understand `-version`.
pub fn is_program_available(program: &Path) -> bool {
    std::process::Command::new(program)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_programs_on_path() {
        let tools = ToolPaths::default();
        assert_eq!(tools.webpmux, PathBuf::from("webpmux"));
        assert_eq!(tools.ffmpeg, PathBuf::from("ffmpeg"));

        let opts = ConvertOpts::default();
        assert_eq!(opts.fps, None);
        assert!(opts.overwrite);
    }

    #[test]
    fn unknown_program_is_unavailable() {
        assert!(!is_program_available(Path::new("webpfex-no-such-program")));
    }
}
