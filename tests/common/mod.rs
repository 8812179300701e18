//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use image::RgbaImage;
use lynx_capture::{CaptureError, EncodingError, RecorderSettings, RenderSource, VideoEncoder};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum EncoderCall {
    Init {
        path: PathBuf,
        fps: u32,
        width: u32,
        height: u32,
    },
    Frame {
        index: u32,
        len: usize,
    },
    RgbaFrame {
        index: u32,
        len: usize,
    },
    End,
}

/// Encoder that records every call. On `end_encoding` it writes one byte per
/// encoded frame to the output path, unless `write_output` is off.
#[derive(Clone)]
pub struct FakeEncoder {
    pub calls: Arc<Mutex<Vec<EncoderCall>>>,
    pub fail_at: Option<u32>,
    pub write_output: bool,
    pub frame_delay: Option<Duration>,
    output: Option<PathBuf>,
    frames: u32,
}

impl FakeEncoder {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_at: None,
            write_output: true,
            frame_delay: None,
            output: None,
            frames: 0,
        }
    }

    pub fn failing_at(index: u32) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::new()
        }
    }

    pub fn without_output() -> Self {
        Self {
            write_output: false,
            ..Self::new()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            frame_delay: Some(delay),
            ..Self::new()
        }
    }

    fn record_frame(&mut self, call: EncoderCall, index: u32) -> Result<(), EncodingError> {
        if let Some(delay) = self.frame_delay {
            std::thread::sleep(delay);
        }
        if self.fail_at == Some(index) {
            return Err(EncodingError::EncodeFailed {
                frame_index: index,
                reason: "fake failure".to_string(),
            });
        }
        self.calls.lock().unwrap().push(call);
        self.frames += 1;
        Ok(())
    }
}

impl VideoEncoder for FakeEncoder {
    fn init(&mut self, path: &Path, fps: u32, width: u32, height: u32) -> Result<(), EncodingError> {
        self.calls.lock().unwrap().push(EncoderCall::Init {
            path: path.to_path_buf(),
            fps,
            width,
            height,
        });
        self.output = Some(path.to_path_buf());
        self.frames = 0;
        Ok(())
    }

    fn encode_frame(&mut self, yuv: &[u8], frame_index: u32) -> Result<(), EncodingError> {
        self.record_frame(
            EncoderCall::Frame {
                index: frame_index,
                len: yuv.len(),
            },
            frame_index,
        )
    }

    fn encode_rgba_frame(&mut self, rgba: &[u8], frame_index: u32) -> Result<(), EncodingError> {
        self.record_frame(
            EncoderCall::RgbaFrame {
                index: frame_index,
                len: rgba.len(),
            },
            frame_index,
        )
    }

    fn end_encoding(&mut self) -> Result<(), EncodingError> {
        self.calls.lock().unwrap().push(EncoderCall::End);
        let path = self.output.take().ok_or(EncodingError::NotInitialized)?;

        if self.write_output && self.frames > 0 {
            std::fs::write(&path, vec![0u8; self.frames as usize])
                .map_err(|e| EncodingError::FinalizeFailed(e.to_string()))?;
        }
        Ok(())
    }
}

/// Camera painting a flat color. Fails every render after `fail_after` renders.
#[derive(Clone, Default)]
pub struct FakeCamera {
    pub renders: Arc<AtomicU32>,
    pub fail_after: Option<u32>,
}

impl FakeCamera {
    pub fn failing_after(renders: u32) -> Self {
        Self {
            fail_after: Some(renders),
            ..Default::default()
        }
    }
}

impl RenderSource for FakeCamera {
    fn name(&self) -> &str {
        "fake"
    }

    fn render(&mut self, target: &mut RgbaImage) -> Result<(), CaptureError> {
        let done = self.renders.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| done >= limit) {
            return Err(CaptureError::RenderFailed("camera lost".to_string()));
        }

        for pixel in target.pixels_mut() {
            pixel.0 = [30, 60, 90, 255];
        }
        Ok(())
    }
}

/// Settings with a tiny 8x6 eye, so frames are captured at 4x3.
pub fn small_settings(max_duration_secs: u32, frame_rate: u32) -> RecorderSettings {
    RecorderSettings {
        max_duration_secs,
        frame_rate,
        eye_width: 8,
        eye_height: 6,
        ..Default::default()
    }
}

pub fn timestamp(minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(10, minute, 0)
        .unwrap()
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
