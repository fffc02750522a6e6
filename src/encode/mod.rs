/// `ffmpeg`-based MP4 output.
pub mod ffmpeg;
/// Frame sink trait and the built-in sinks.
pub mod sink;
