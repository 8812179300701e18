//! VideoRecorder - owns the recording lifecycle on the engine tick thread.
//!
//! The recorder admits at most one frame per tick, pushes it to the encoder
//! worker and finalizes the encoder once the worker has drained. Only one
//! session, and therefore one worker thread, exists at a time.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};

use super::encoder::VideoEncoder;
use super::pacing::FramePacer;
use super::worker::{EncoderWorker, WorkerExit};
use crate::capture::screenshot::{take_screenshot, ScreenshotResult};
use crate::capture::{save_jpeg, CameraRig, CaptureSurfaces};
use crate::core::settings::RecorderSettings;
use crate::errors::{CaptureError, EncodingError, RecorderError};
use crate::gallery::Gallery;
use crate::types::CapturedFrame;

/// Outcome of one engine tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No recording in progress.
    Idle,
    /// Recording, but the tick fell in the same frame slot as the previous one.
    Waiting,
    /// One frame was captured and queued.
    Captured { index: u32, thumbnail: bool },
    /// The frame limit was reached and the recording was finalized.
    AutoStopped(RecordingSummary),
}

/// Summary of a finished recording.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub video_path: PathBuf,
    /// Set only when a thumbnail file was written.
    pub thumbnail_path: Option<PathBuf>,
    pub frames_captured: u32,
    pub frames_encoded: u32,
    pub video_size: u64,
    pub elapsed: Duration,
}

/// Session data for an active recording.
struct RecordingSession {
    video_path: PathBuf,
    thumbnail_path: Option<PathBuf>,
    pacer: FramePacer,
    frame_index: u32,
    max_frames: u32,
    thumbnail_frame_index: u32,
    thumbnail_recorded: bool,
    surfaces: CaptureSurfaces,
    started_at: Instant,
}

pub struct VideoRecorder<E: VideoEncoder> {
    settings: RecorderSettings,
    gallery: Gallery,
    rig: CameraRig,
    /// Held here between sessions, moved into the worker during one.
    encoder: Option<E>,
    worker: Option<EncoderWorker<E>>,
    session: Option<RecordingSession>,
}

impl<E: VideoEncoder> VideoRecorder<E> {
    pub fn new(
        settings: RecorderSettings,
        gallery: Gallery,
        rig: CameraRig,
        encoder: E,
    ) -> Result<Self, RecorderError> {
        settings.validate()?;

        Ok(Self {
            settings,
            gallery,
            rig,
            encoder: Some(encoder),
            worker: None,
            session: None,
        })
    }

    pub fn settings(&self) -> &RecorderSettings {
        &self.settings
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn rig_mut(&mut self) -> &mut CameraRig {
        &mut self.rig
    }

    /// The encoder, when no session is using it.
    pub fn encoder(&self) -> Option<&E> {
        self.encoder.as_ref()
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn worker_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.is_alive())
    }

    /// Index the next captured frame will get.
    pub fn frame_index(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.frame_index)
    }

    /// Frames captured but not yet encoded.
    pub fn pending_frames(&self) -> usize {
        self.worker.as_ref().map_or(0, |w| w.pending())
    }

    pub fn video_path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.video_path.as_path())
    }

    /// Starts a recording named after the current local time.
    ///
    /// `now` is the engine time used for frame pacing.
    pub fn record_video(&mut self, now: Duration) -> Result<PathBuf, RecorderError> {
        self.record_video_at(now, Local::now().naive_local())
    }

    /// Starts a recording whose file name carries `timestamp`.
    ///
    /// A session that is still running is drained, joined and finalized first.
    pub fn record_video_at(
        &mut self,
        now: Duration,
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf, RecorderError> {
        if self.session.is_some() {
            tracing::warn!(target: "recorder", "[SESSION] Previous recording still running, finishing it first");
            if let Err(e) = self.stop_record() {
                tracing::warn!(target: "recorder", "[SESSION] Previous recording ended with error: {}", e);
            }
        }

        if !self.rig.has_camera() {
            tracing::error!(target: "recorder", "[SESSION] Cannot record without a camera");
            return Err(CaptureError::NoCamera.into());
        }

        self.gallery.ensure()?;
        let video_path = self.gallery.video_path(timestamp);
        let thumbnail_path = self.gallery.thumbnail_path_for(&video_path);

        tracing::info!(target: "recorder", "[SESSION] RecordVideo with video file path: {:?}", video_path);

        let mut encoder = self.encoder.take().ok_or(RecorderError::EncoderUnavailable)?;

        let resolution = self.settings.capture_resolution();
        let frame_rate = self.settings.frame_rate;

        if let Err(e) = encoder.init(&video_path, frame_rate, resolution.width, resolution.height) {
            tracing::error!(target: "recorder", "[SESSION] Encoder init failed: {}", e);
            self.encoder = Some(encoder);
            return Err(e.into());
        }

        let surfaces = CaptureSurfaces::allocate(resolution);
        self.worker = Some(EncoderWorker::spawn(encoder, resolution, self.settings.frame_format));

        self.session = Some(RecordingSession {
            video_path: video_path.clone(),
            thumbnail_path,
            pacer: FramePacer::new(frame_rate, now),
            frame_index: 0,
            max_frames: self.settings.max_frames(),
            thumbnail_frame_index: self.settings.thumbnail_frame_index,
            thumbnail_recorded: false,
            surfaces,
            started_at: Instant::now(),
        });

        tracing::info!(target: "recorder",
            "[SESSION] Video capture and encoding START: {} @ {}fps, max {} frames",
            resolution, frame_rate, self.settings.max_frames());

        Ok(video_path)
    }

    /// Per-frame admission. Call once per engine tick with the engine time.
    ///
    /// Captures at most one frame per tick, however many frame slots elapsed
    /// since the previous tick.
    pub fn tick(&mut self, now: Duration) -> Result<TickOutcome, RecorderError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(TickOutcome::Idle);
        };

        if session.pacer.advance(now) == 0 {
            return Ok(TickOutcome::Waiting);
        }

        let index = session.frame_index;
        let data = match session.surfaces.capture_frame(&mut self.rig) {
            Ok(data) => data,
            Err(e) => return Err(self.abort_session(e.into())),
        };

        let Some(worker) = self.worker.as_ref() else {
            return Err(RecorderError::EncoderUnavailable);
        };

        if !worker.push(CapturedFrame { index, data }) {
            tracing::error!(target: "recorder", "[SESSION] Encoder worker exited early at frame {}", index);
            let error = match self.stop_record() {
                Err(e) => e,
                Ok(_) => EncodingError::EncodeFailed {
                    frame_index: index,
                    reason: "encoder worker exited".to_string(),
                }
                .into(),
            };
            return Err(error);
        }

        let mut thumbnail = false;
        if index == session.thumbnail_frame_index && !session.thumbnail_recorded {
            match session.surfaces.capture_thumbnail(&mut self.rig) {
                Ok(()) => {
                    session.thumbnail_recorded = true;
                    thumbnail = true;
                    tracing::debug!(target: "recorder", "[SESSION] Thumbnail captured at frame {}", index);
                }
                Err(e) => {
                    tracing::warn!(target: "recorder", "[SESSION] Thumbnail capture failed: {}", e);
                }
            }
        }

        session.frame_index += 1;

        if session.frame_index >= session.max_frames {
            tracing::info!(target: "recorder",
                "[SESSION] End of capture, frame limit {} reached", session.max_frames);
            let summary = self.stop_record()?;
            return Ok(TickOutcome::AutoStopped(summary));
        }

        Ok(TickOutcome::Captured { index, thumbnail })
    }

    /// Stops the recording: drains and joins the worker, finalizes the encoder,
    /// writes the thumbnail and releases the capture surfaces.
    pub fn stop_record(&mut self) -> Result<RecordingSummary, RecorderError> {
        let Some(session) = self.session.take() else {
            return Err(RecorderError::NotRecording);
        };

        tracing::info!(target: "recorder", "[SESSION] Stop video record called");

        let worker = self.worker.take().ok_or(RecorderError::EncoderUnavailable)?;
        let WorkerExit {
            mut encoder,
            result: worker_result,
        } = worker.finish()?;

        let end_result = encoder.end_encoding();
        self.encoder = Some(encoder);

        let stats = worker_result?;
        end_result?;

        let video_size = std::fs::metadata(&session.video_path)
            .map(|m| m.len())
            .unwrap_or(0);
        tracing::info!(target: "recorder", "[SESSION] Video file final length: {}", video_size);

        let thumbnail_path = self.save_thumbnail(&session, video_size);

        Ok(RecordingSummary {
            video_path: session.video_path,
            thumbnail_path,
            frames_captured: session.frame_index,
            frames_encoded: stats.frames_encoded,
            video_size,
            elapsed: session.started_at.elapsed(),
        })
    }

    /// Saves a still of the active camera into the gallery.
    pub fn take_screenshot(&mut self) -> Result<ScreenshotResult, RecorderError> {
        take_screenshot(
            &mut self.rig,
            &self.gallery,
            self.settings.screenshot_resolution(),
            self.settings.jpeg_quality,
            Local::now().naive_local(),
        )
    }

    fn save_thumbnail(&self, session: &RecordingSession, video_size: u64) -> Option<PathBuf> {
        let path = session.thumbnail_path.as_ref()?;

        if !session.thumbnail_recorded || video_size == 0 {
            tracing::debug!(target: "recorder",
                "[SESSION] Skipping thumbnail (recorded={}, video size={})",
                session.thumbnail_recorded, video_size);
            return None;
        }

        match save_jpeg(path, session.surfaces.thumbnail(), self.settings.jpeg_quality) {
            Ok(()) => {
                tracing::info!(target: "recorder", "[SESSION] Video thumbnail saved: {:?}", path);
                Some(path.clone())
            }
            Err(e) => {
                tracing::error!(target: "recorder", "[SESSION] Video thumbnail NOT saved: {}", e);
                None
            }
        }
    }

    /// Finalizes the session after a capture failure and hands back the failure.
    fn abort_session(&mut self, error: RecorderError) -> RecorderError {
        tracing::error!(target: "recorder", "[SESSION] Capture failed, stopping recording: {}", error);
        if let Err(e) = self.stop_record() {
            tracing::warn!(target: "recorder", "[SESSION] Finalizing aborted recording failed: {}", e);
        }
        error
    }
}

impl<E: VideoEncoder> Drop for VideoRecorder<E> {
    fn drop(&mut self) {
        if self.session.is_none() {
            return;
        }

        tracing::warn!(target: "recorder", "[SESSION] Recorder dropped while recording, finalizing...");
        if let Err(e) = self.stop_record() {
            tracing::warn!(target: "recorder", "[SESSION] Finalize on drop failed: {}", e);
        }
    }
}
