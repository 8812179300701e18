use super::encoder::VideoEncoder;
use super::queue::{frame_queue, FrameQueue, FrameQueueReader, QueueMessage};
use super::yuv::{rgba_to_yuv420sp, yuv420sp_len};
use crate::errors::{EncodingError, RecorderError};
use crate::types::{CapturedFrame, FrameFormat, Resolution};
use std::thread::JoinHandle;

/// Counters reported by the encoder worker when it exits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerStats {
    pub frames_encoded: u32,
    pub frames_skipped: u32,
    pub last_frame_index: Option<u32>,
}

/// What the worker thread hands back on join.
///
/// The encoder is always returned, even when encoding failed, so the session
/// can still be finalized.
pub struct WorkerExit<E> {
    pub encoder: E,
    pub result: Result<WorkerStats, EncodingError>,
}

/// Handle to the background thread that drains the frame queue into an encoder.
pub struct EncoderWorker<E> {
    queue: FrameQueue,
    handle: JoinHandle<WorkerExit<E>>,
}

impl<E: VideoEncoder> EncoderWorker<E> {
    /// Moves `encoder` onto a new worker thread and returns the producer handle.
    ///
    /// The encoder must already be initialized.
    pub fn spawn(encoder: E, resolution: Resolution, format: FrameFormat) -> Self {
        let (queue, reader) = frame_queue();

        let handle = std::thread::spawn(move || {
            let mut encoder = encoder;
            let result = run_encoder_loop(&reader, &mut encoder, resolution, format);

            let dropped = reader.clear();
            if dropped > 0 {
                tracing::warn!(target: "recorder", "[WORKER] Dropped {} queued messages on exit", dropped);
            }

            match &result {
                Ok(stats) => {
                    tracing::info!(target: "recorder",
                        "[WORKER] Finished, {} frames encoded, {} skipped",
                        stats.frames_encoded, stats.frames_skipped);
                }
                Err(e) => {
                    tracing::error!(target: "recorder", "[WORKER] Stopped on encoder error: {}", e);
                }
            }

            WorkerExit { encoder, result }
        });

        Self { queue, handle }
    }

    /// Appends a frame for encoding. Returns false if the worker has already exited.
    pub fn push(&self, frame: CapturedFrame) -> bool {
        self.queue.push(frame)
    }

    /// Frames waiting to be encoded.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Lets the worker drain everything already queued, then joins it.
    pub fn finish(self) -> Result<WorkerExit<E>, RecorderError> {
        tracing::debug!(target: "recorder", "[WORKER] Draining {} pending frames...", self.queue.len());
        self.queue.finish();
        self.handle.join().map_err(|_| RecorderError::WorkerPanicked)
    }
}

/// Pops frames until end of stream, converting and forwarding each one.
pub fn run_encoder_loop<E: VideoEncoder + ?Sized>(
    reader: &FrameQueueReader,
    encoder: &mut E,
    resolution: Resolution,
    format: FrameFormat,
) -> Result<WorkerStats, EncodingError> {
    let expected_size = resolution.rgba_len();
    let mut scratch = match format {
        FrameFormat::Yuv420sp => vec![0u8; yuv420sp_len(resolution.width, resolution.height)],
        FrameFormat::Rgba => Vec::new(),
    };
    let mut stats = WorkerStats::default();

    tracing::debug!(target: "recorder", "[WORKER] Encoding {} frames as {:?}", resolution, format);

    loop {
        match reader.pop() {
            Some(QueueMessage::Frame(frame)) => {
                if frame.data.len() != expected_size {
                    tracing::warn!(target: "recorder",
                        "[WORKER] Frame {} size mismatch: expected {}, got {}",
                        frame.index, expected_size, frame.data.len());
                    stats.frames_skipped += 1;
                    continue;
                }

                match format {
                    FrameFormat::Yuv420sp => {
                        rgba_to_yuv420sp(&frame.data, resolution.width, resolution.height, &mut scratch);
                        encoder.encode_frame(&scratch, frame.index)?;
                    }
                    FrameFormat::Rgba => {
                        encoder.encode_rgba_frame(&frame.data, frame.index)?;
                    }
                }

                stats.frames_encoded += 1;
                stats.last_frame_index = Some(frame.index);

                if stats.frames_encoded % 60 == 0 {
                    tracing::debug!(target: "recorder", "[WORKER] Encoded {} frames", stats.frames_encoded);
                }
            }
            Some(QueueMessage::EndOfStream) => {
                tracing::info!(target: "recorder", "[WORKER] EndOfStream received");
                break;
            }
            None => {
                tracing::warn!(target: "recorder", "[WORKER] Queue closed without EndOfStream");
                break;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Yuv { index: u32, len: usize },
        Rgba { index: u32, len: usize },
    }

    #[derive(Default, Clone)]
    struct SpyEncoder {
        calls: Arc<Mutex<Vec<Call>>>,
        fail_at: Option<u32>,
    }

    impl VideoEncoder for SpyEncoder {
        fn init(&mut self, _: &Path, _: u32, _: u32, _: u32) -> Result<(), EncodingError> {
            Ok(())
        }

        fn encode_frame(&mut self, yuv: &[u8], index: u32) -> Result<(), EncodingError> {
            if self.fail_at == Some(index) {
                return Err(EncodingError::EncodeFailed {
                    frame_index: index,
                    reason: "boom".to_string(),
                });
            }
            self.calls.lock().unwrap().push(Call::Yuv { index, len: yuv.len() });
            Ok(())
        }

        fn encode_rgba_frame(&mut self, rgba: &[u8], index: u32) -> Result<(), EncodingError> {
            self.calls.lock().unwrap().push(Call::Rgba { index, len: rgba.len() });
            Ok(())
        }

        fn end_encoding(&mut self) -> Result<(), EncodingError> {
            Ok(())
        }
    }

    fn frame(index: u32, resolution: Resolution) -> CapturedFrame {
        CapturedFrame {
            index,
            data: vec![0x80; resolution.rgba_len()],
        }
    }

    #[test]
    fn test_worker_drains_all_frames_in_order() {
        let resolution = Resolution::new(4, 2);
        let encoder = SpyEncoder::default();
        let calls = encoder.calls.clone();

        let worker = EncoderWorker::spawn(encoder, resolution, FrameFormat::Yuv420sp);
        for i in 0..20 {
            assert!(worker.push(frame(i, resolution)));
        }

        let exit = worker.finish().unwrap();
        let stats = exit.result.unwrap();
        assert_eq!(stats.frames_encoded, 20);
        assert_eq!(stats.last_frame_index, Some(19));

        let calls = calls.lock().unwrap();
        let expected: Vec<Call> = (0..20).map(|index| Call::Yuv { index, len: 12 }).collect();
        assert_eq!(*calls, expected);
    }

    #[test]
    fn test_rgba_format_skips_conversion() {
        let resolution = Resolution::new(2, 2);
        let encoder = SpyEncoder::default();
        let calls = encoder.calls.clone();

        let worker = EncoderWorker::spawn(encoder, resolution, FrameFormat::Rgba);
        worker.push(frame(0, resolution));
        worker.finish().unwrap().result.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![Call::Rgba { index: 0, len: 16 }]);
    }

    #[test]
    fn test_mismatched_frame_is_skipped() {
        let resolution = Resolution::new(2, 2);
        let worker = EncoderWorker::spawn(SpyEncoder::default(), resolution, FrameFormat::Yuv420sp);

        worker.push(CapturedFrame { index: 0, data: vec![0; 3] });
        worker.push(frame(1, resolution));

        let stats = worker.finish().unwrap().result.unwrap();
        assert_eq!(stats.frames_skipped, 1);
        assert_eq!(stats.frames_encoded, 1);
    }

    #[test]
    fn test_encoder_error_stops_worker_and_returns_encoder() {
        let resolution = Resolution::new(2, 2);
        let encoder = SpyEncoder {
            fail_at: Some(2),
            ..Default::default()
        };
        let calls = encoder.calls.clone();

        let worker = EncoderWorker::spawn(encoder, resolution, FrameFormat::Yuv420sp);
        for i in 0..5 {
            worker.push(frame(i, resolution));
        }

        let exit = worker.finish().unwrap();
        assert!(matches!(
            exit.result,
            Err(EncodingError::EncodeFailed { frame_index: 2, .. })
        ));
        assert_eq!(exit.encoder.fail_at, Some(2));
        assert_eq!(calls.lock().unwrap().len(), 2);
    }
}
