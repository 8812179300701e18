//! Screen capture for the headset: video recording with background encoding,
//! screenshots and the gallery they are stored in.

pub mod capture;
pub mod core;
pub mod errors;
pub mod gallery;
pub mod recorder;
pub mod shared;
pub mod types;

pub use capture::{CameraRig, RenderSource};
pub use crate::core::settings::{load_settings, save_settings, RecorderSettings};
pub use errors::{CaptureError, EncodingError, RecorderError};
pub use gallery::{thumbnail_title_name, Gallery};
pub use recorder::{FfmpegEncoder, RecordingSummary, TickOutcome, VideoEncoder, VideoRecorder};
pub use types::{CapturedFrame, FrameFormat, Resolution};
