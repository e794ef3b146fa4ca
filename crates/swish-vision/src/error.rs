//! Error types for vision pipeline operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vision pipeline operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur during shot standardization.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Could not open video source: {message}")]
    SourceUnavailable {
        message: String,
        stderr: Option<String>,
    },

    #[error("Frame decode failed: {0}")]
    DecodeFailed(String),

    #[error("Frame encode failed: {0}")]
    EncodeFailed(String),

    #[error("Landmark estimation failed: {0}")]
    EstimatorFailed(String),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl VisionError {
    /// Create a source-unavailable error.
    pub fn source_unavailable(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            stderr,
        }
    }

    /// Create a decode failure error.
    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::DecodeFailed(message.into())
    }

    /// Create an encode failure error.
    pub fn encode_failed(message: impl Into<String>) -> Self {
        Self::EncodeFailed(message.into())
    }

    /// Create an invalid-video error.
    pub fn invalid_video(message: impl Into<String>) -> Self {
        Self::InvalidVideo(message.into())
    }

    /// True if this error must abort the whole run rather than one shot.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::FfmpegNotFound | Self::FfprobeNotFound
        )
    }
}
