use serde::{Deserialize, Serialize};

/// Bytes per RGBA8 pixel.
pub const RGBA_BYTES_PER_PIXEL: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn halved(&self) -> Self {
        Self::new(self.width / 2, self.height / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size of one RGBA8 frame at this resolution.
    pub fn rgba_len(&self) -> usize {
        self.pixel_count() * RGBA_BYTES_PER_PIXEL
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel layout handed to the encoder for each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    /// Converted to YUV 4:2:0 semi-planar (VU interleaved) before encoding.
    #[default]
    Yuv420sp,
    /// Raw RGBA8 forwarded as captured.
    Rgba,
}

/// One captured RGBA8 frame, tagged with its position in the recording.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pub index: u32,
    pub data: Vec<u8>,
}
