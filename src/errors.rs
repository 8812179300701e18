use crate::core::settings::SettingsError;
use crate::shared::errors::StorageError;
use thiserror::Error;

/// Errors from the frame capture stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("No camera available to capture from")]
    NoCamera,
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface size mismatch: expected {expected:?}, got {actual:?}")]
    SurfaceSizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Errors reported by a video encoder backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("FFmpeg not found. Please install ffmpeg.")]
    FfmpegNotFound,
    #[error("Encoder is not initialized")]
    NotInitialized,
    #[error("Encoder initialization failed: {0}")]
    InitFailed(String),
    #[error("Failed to encode frame {frame_index}: {reason}")]
    EncodeFailed { frame_index: u32, reason: String },
    #[error("Failed to finalize video: {0}")]
    FinalizeFailed(String),
    #[error("FFmpeg process failed with exit code {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },
}

/// Top-level error type for recording operations.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("No recording in progress")]
    NotRecording,
    #[error("Encoder is owned by a worker that did not return it")]
    EncoderUnavailable,
    #[error("Encoder worker thread panicked")]
    WorkerPanicked,
}
