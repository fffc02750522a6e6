use crate::metadata::ParsingError;

/// Convenience result type used across webpfex.
pub type WebpfexResult<T> = Result<T, WebpfexError>;

/// Top-level error taxonomy used by library APIs.
///
/// Contract violations (canvas bounds, zero frame numbers, descriptor count mismatches) are not
/// part of this taxonomy; they panic.
#[derive(thiserror::Error, Debug)]
pub enum WebpfexError {
    /// Malformed `webpmux -info` report.
    #[error("parse error: {0}")]
    Parse(#[from] ParsingError),

    /// Invalid configuration or data handed between pipeline stages.
    #[error("validation error: {0}")]
    Validation(String),

    /// An external tool (`webpmux`, `ffmpeg`) could not be run or failed.
    #[error("tool error: {0}")]
    Tool(String),

    /// Frame bytes could not be decoded into a canvas.
    #[error("decode error: {0}")]
    Decode(String),

    /// A canvas could not be written out.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WebpfexError {
    /// Build a [`WebpfexError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WebpfexError::Tool`] value.
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::Tool(msg.into())
    }

    /// Build a [`WebpfexError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`WebpfexError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
