//! Desktop encoder backend: pipes raw NV21 frames into an `ffmpeg` child process.

use super::encoder::VideoEncoder;
use super::yuv::{rgba_to_yuv420sp, yuv420sp_len};
use crate::errors::EncodingError;
use crate::types::Resolution;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

pub const ENCODING_CRF: &str = "23";
pub const ENCODING_PRESET: &str = "veryfast";

pub fn check_ffmpeg() -> Result<(), EncodingError> {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|_| EncodingError::FfmpegNotFound)?;
    Ok(())
}

/// Arguments for encoding NV21 frames read from stdin into an H.264 MP4.
pub fn encoder_args(path: &Path, fps: u32, resolution: Resolution) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(), "error".to_string(),
        "-f".to_string(), "rawvideo".to_string(),
        "-pixel_format".to_string(), "nv21".to_string(),
        "-video_size".to_string(), resolution.to_string(),
        "-framerate".to_string(), fps.to_string(),
        "-i".to_string(), "pipe:0".to_string(),
        "-c:v".to_string(), "libx264".to_string(),
        "-pix_fmt".to_string(), "yuv420p".to_string(),
        "-crf".to_string(), ENCODING_CRF.to_string(),
        "-preset".to_string(), ENCODING_PRESET.to_string(),
        "-movflags".to_string(), "+faststart".to_string(),
        "-y".to_string(),
        path.to_string_lossy().to_string(),
    ]
}

/// RAII guard ensuring FFmpeg process cleanup and partial file deletion on abnormal exit.
///
/// On drop, if not marked as completed:
/// 1. Kills the FFmpeg process
/// 2. Deletes the partial output file
struct WriterGuard {
    child: Option<Child>,
    output_path: PathBuf,
    completed: bool,
}

impl WriterGuard {
    fn new(child: Child, output_path: PathBuf) -> Self {
        Self {
            child: Some(child),
            output_path,
            completed: false,
        }
    }

    fn mark_completed(&mut self) {
        self.completed = true;
    }

    fn take_child(&mut self) -> Option<Child> {
        self.child.take()
    }

    fn child_mut(&mut self) -> Option<&mut Child> {
        self.child.as_mut()
    }
}

impl Drop for WriterGuard {
    fn drop(&mut self) {
        if self.completed {
            return;
        }

        tracing::warn!(target: "recorder", "[FFMPEG] WriterGuard dropping without completion, cleaning up...");

        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::warn!(target: "recorder", "[FFMPEG] Failed to kill FFmpeg: {}", e);
            }
            let _ = child.wait();
        }

        if self.output_path.exists() {
            tracing::info!(target: "recorder", "[FFMPEG] Deleting partial file: {:?}", self.output_path);
            if let Err(e) = std::fs::remove_file(&self.output_path) {
                tracing::warn!(target: "recorder", "[FFMPEG] Failed to delete partial file: {}", e);
            }
        }
    }
}

struct ActiveEncode {
    guard: WriterGuard,
    stdin: ChildStdin,
    resolution: Resolution,
    frames_written: u32,
}

/// [`VideoEncoder`] backed by an `ffmpeg` child process.
#[derive(Default)]
pub struct FfmpegEncoder {
    active: Option<ActiveEncode>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn write_frame(&mut self, yuv: &[u8], frame_index: u32) -> Result<(), EncodingError> {
        let active = self.active.as_mut().ok_or(EncodingError::NotInitialized)?;

        active.stdin.write_all(yuv).map_err(|e| EncodingError::EncodeFailed {
            frame_index,
            reason: e.to_string(),
        })?;
        active.frames_written += 1;
        Ok(())
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn init(&mut self, path: &Path, fps: u32, width: u32, height: u32) -> Result<(), EncodingError> {
        if self.active.is_some() {
            return Err(EncodingError::InitFailed("encoder already running".to_string()));
        }
        check_ffmpeg()?;

        let resolution = Resolution::new(width, height);
        let args = encoder_args(path, fps, resolution);

        tracing::info!(target: "recorder",
            "[FFMPEG] Starting FFmpeg: {} @ {}fps, preset={}, crf={} -> {:?}",
            resolution, fps, ENCODING_PRESET, ENCODING_CRF, path);
        tracing::debug!(target: "recorder", "[FFMPEG] FFmpeg args: {:?}", args);

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EncodingError::InitFailed(format!("Failed to spawn FFmpeg: {}", e)))?;

        let mut guard = WriterGuard::new(child, path.to_path_buf());
        let stdin = guard
            .child_mut()
            .and_then(|c| c.stdin.take())
            .ok_or_else(|| EncodingError::InitFailed("Failed to capture FFmpeg stdin".to_string()))?;

        self.scratch = vec![0u8; yuv420sp_len(width, height)];
        self.active = Some(ActiveEncode {
            guard,
            stdin,
            resolution,
            frames_written: 0,
        });
        Ok(())
    }

    fn encode_frame(&mut self, yuv: &[u8], frame_index: u32) -> Result<(), EncodingError> {
        self.write_frame(yuv, frame_index)
    }

    fn encode_rgba_frame(&mut self, rgba: &[u8], frame_index: u32) -> Result<(), EncodingError> {
        let resolution = self
            .active
            .as_ref()
            .map(|a| a.resolution)
            .ok_or(EncodingError::NotInitialized)?;

        if rgba.len() != resolution.rgba_len() {
            return Err(EncodingError::EncodeFailed {
                frame_index,
                reason: format!("expected {} RGBA bytes, got {}", resolution.rgba_len(), rgba.len()),
            });
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        rgba_to_yuv420sp(rgba, resolution.width, resolution.height, &mut scratch);
        let result = self.write_frame(&scratch, frame_index);
        self.scratch = scratch;
        result
    }

    fn end_encoding(&mut self) -> Result<(), EncodingError> {
        let ActiveEncode {
            mut guard,
            stdin,
            frames_written,
            ..
        } = self.active.take().ok_or(EncodingError::NotInitialized)?;

        drop(stdin);

        tracing::debug!(target: "recorder", "[FFMPEG] Waiting for FFmpeg to finish...");

        let child = guard
            .take_child()
            .ok_or_else(|| EncodingError::FinalizeFailed("FFmpeg child already taken".to_string()))?;

        let output = child
            .wait_with_output()
            .map_err(|e| EncodingError::FinalizeFailed(format!("FFmpeg wait failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(target: "recorder", "[FFMPEG] FFmpeg failed: {}", stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            return Err(EncodingError::ProcessFailed {
                exit_code,
                stderr: stderr.to_string(),
            });
        }

        guard.mark_completed();

        tracing::info!(target: "recorder", "[FFMPEG] FFmpeg complete, {} frames written", frames_written);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_describe_nv21_input() {
        let args = encoder_args(Path::new("/tmp/video_2024.mp4"), 10, Resolution::new(768, 702));

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-pixel_format") + 1], "nv21");
        assert_eq!(args[pos("-video_size") + 1], "768x702");
        assert_eq!(args[pos("-framerate") + 1], "10");
        assert_eq!(args[pos("-i") + 1], "pipe:0");
        assert_eq!(args.last().unwrap(), "/tmp/video_2024.mp4");
    }

    #[test]
    fn test_calls_before_init_fail() {
        let mut encoder = FfmpegEncoder::new();

        assert!(!encoder.is_active());
        assert_eq!(encoder.encode_frame(&[0; 6], 0), Err(EncodingError::NotInitialized));
        assert_eq!(encoder.encode_rgba_frame(&[0; 16], 0), Err(EncodingError::NotInitialized));
        assert_eq!(encoder.end_encoding(), Err(EncodingError::NotInitialized));
    }
}
