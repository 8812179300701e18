use crate::errors::EncodingError;
use std::path::Path;

/// Boundary to a video encoder backend.
///
/// A session calls `init` once, then one `encode_*` call per frame with
/// strictly increasing indices, then `end_encoding` once after the last frame.
/// Implementations are moved onto the encoder worker thread for the duration
/// of a session, hence the `Send` bound.
pub trait VideoEncoder: Send + 'static {
    fn init(&mut self, path: &Path, fps: u32, width: u32, height: u32) -> Result<(), EncodingError>;

    /// Encodes one YUV420SP (VU interleaved) frame.
    fn encode_frame(&mut self, yuv: &[u8], frame_index: u32) -> Result<(), EncodingError>;

    /// Encodes one RGBA8 frame without prior conversion.
    fn encode_rgba_frame(&mut self, rgba: &[u8], frame_index: u32) -> Result<(), EncodingError>;

    /// Finalizes and flushes the output file.
    fn end_encoding(&mut self) -> Result<(), EncodingError>;
}

impl<E: VideoEncoder + ?Sized> VideoEncoder for Box<E> {
    fn init(&mut self, path: &Path, fps: u32, width: u32, height: u32) -> Result<(), EncodingError> {
        (**self).init(path, fps, width, height)
    }

    fn encode_frame(&mut self, yuv: &[u8], frame_index: u32) -> Result<(), EncodingError> {
        (**self).encode_frame(yuv, frame_index)
    }

    fn encode_rgba_frame(&mut self, rgba: &[u8], frame_index: u32) -> Result<(), EncodingError> {
        (**self).encode_rgba_frame(rgba, frame_index)
    }

    fn end_encoding(&mut self) -> Result<(), EncodingError> {
        (**self).end_encoding()
    }
}
