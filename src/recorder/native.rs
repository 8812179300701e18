//! Headset encoder backend provided by the `AndroidNativeVideoEncoder` shared library.
//!
//! The library keeps a single global encoder, so only one `NativeEncoder` may be
//! active at a time.

use super::encoder::VideoEncoder;
use super::yuv::yuv420sp_len;
use crate::errors::EncodingError;
use crate::types::Resolution;
use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::path::Path;

#[link(name = "AndroidNativeVideoEncoder")]
extern "C" {
    fn InitEncoder(video_file_name: *const c_char, fps: c_int, width: c_int, height: c_int);
    fn EncodeFrame(data: *const u8, frame_index: c_int);
    fn EncodeRGBAFrame(data: *const u8, frame_index: c_int);
    fn EndEncoding();
}

fn to_c_int(value: u32, what: &str) -> Result<c_int, EncodingError> {
    c_int::try_from(value).map_err(|_| EncodingError::InitFailed(format!("{} {} out of range", what, value)))
}

#[derive(Debug, Default)]
pub struct NativeEncoder {
    resolution: Option<Resolution>,
}

impl NativeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_frame(&self, len: usize, expected: fn(Resolution) -> usize, frame_index: u32) -> Result<c_int, EncodingError> {
        let resolution = self.resolution.ok_or(EncodingError::NotInitialized)?;

        if len < expected(resolution) {
            return Err(EncodingError::EncodeFailed {
                frame_index,
                reason: format!("buffer of {} bytes is smaller than {}", len, expected(resolution)),
            });
        }

        c_int::try_from(frame_index).map_err(|_| EncodingError::EncodeFailed {
            frame_index,
            reason: "frame index out of range".to_string(),
        })
    }
}

impl VideoEncoder for NativeEncoder {
    fn init(&mut self, path: &Path, fps: u32, width: u32, height: u32) -> Result<(), EncodingError> {
        let file_name = CString::new(path.to_string_lossy().as_bytes())
            .map_err(|e| EncodingError::InitFailed(e.to_string()))?;
        let fps = to_c_int(fps, "fps")?;
        let c_width = to_c_int(width, "width")?;
        let c_height = to_c_int(height, "height")?;

        tracing::info!(target: "recorder", "[NATIVE] InitEncoder {:?} {}x{} @ {}fps", path, width, height, fps);

        // SAFETY: `file_name` is a valid NUL-terminated string that outlives the call.
        unsafe { InitEncoder(file_name.as_ptr(), fps, c_width, c_height) };

        self.resolution = Some(Resolution::new(width, height));
        Ok(())
    }

    fn encode_frame(&mut self, yuv: &[u8], frame_index: u32) -> Result<(), EncodingError> {
        let index = self.check_frame(yuv.len(), |r| yuv420sp_len(r.width, r.height), frame_index)?;

        // SAFETY: the library reads exactly one YUV420SP frame, which `check_frame` verified fits in `yuv`.
        unsafe { EncodeFrame(yuv.as_ptr(), index) };
        Ok(())
    }

    fn encode_rgba_frame(&mut self, rgba: &[u8], frame_index: u32) -> Result<(), EncodingError> {
        let index = self.check_frame(rgba.len(), |r| r.rgba_len(), frame_index)?;

        // SAFETY: the library reads exactly one RGBA frame, which `check_frame` verified fits in `rgba`.
        unsafe { EncodeRGBAFrame(rgba.as_ptr(), index) };
        Ok(())
    }

    fn end_encoding(&mut self) -> Result<(), EncodingError> {
        if self.resolution.take().is_none() {
            return Err(EncodingError::NotInitialized);
        }

        tracing::info!(target: "recorder", "[NATIVE] EndEncoding");

        // SAFETY: no arguments; the encoder was initialized by `init`.
        unsafe { EndEncoding() };
        Ok(())
    }
}
