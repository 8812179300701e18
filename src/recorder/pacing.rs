use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Decides on each engine tick whether a new video frame is due.
///
/// Time is split into slots of `1 / frame_rate` seconds. A frame is due when
/// the current tick lands in a later slot than the previous tick. Slot numbers
/// are computed with integer nanoseconds so that ticks falling exactly on a
/// slot boundary are not lost to rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePacer {
    frame_rate: u32,
    last_frame_time: Duration,
}

impl FramePacer {
    pub fn new(frame_rate: u32, start: Duration) -> Self {
        Self {
            frame_rate,
            last_frame_time: start,
        }
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Length of one frame slot.
    pub fn capture_frame_time(&self) -> Duration {
        Duration::from_nanos((NANOS_PER_SEC / self.frame_rate.max(1) as u128) as u64)
    }

    fn slot(&self, time: Duration) -> u128 {
        time.as_nanos() * self.frame_rate as u128 / NANOS_PER_SEC
    }

    /// Number of frame slots elapsed between the previous tick and `now`.
    pub fn frames_due(&self, now: Duration) -> u64 {
        self.slot(now).saturating_sub(self.slot(self.last_frame_time)) as u64
    }

    /// Records `now` as the latest tick and returns how many slots it covered.
    pub fn advance(&mut self, now: Duration) -> u64 {
        let due = self.frames_due(now);
        self.last_frame_time = now;
        due
    }
}
