//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while fetching or processing media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("Whisper not found in PATH")]
    WhisperNotFound,

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Extraction failed: {message}")]
    ExtractionFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Timed out after {0} seconds waiting for an in-progress download")]
    WaitTimeout(u64),

    #[error("Integrity failure: {0}")]
    Integrity(String),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Create an extraction failure error carrying transcoder diagnostics.
    pub fn extraction_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ExtractionFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Create a transcription failure error.
    pub fn transcription_failed(message: impl Into<String>) -> Self {
        Self::TranscriptionFailed(message.into())
    }

    /// Create an integrity failure error.
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }
}
