pub mod encoder;
pub mod ffmpeg;
#[cfg(target_os = "android")]
pub mod native;
pub mod pacing;
pub mod queue;
pub mod session;
pub mod worker;
pub mod yuv;

pub use encoder::VideoEncoder;
pub use ffmpeg::FfmpegEncoder;
#[cfg(target_os = "android")]
pub use native::NativeEncoder;
pub use session::{RecordingSummary, TickOutcome, VideoRecorder};
