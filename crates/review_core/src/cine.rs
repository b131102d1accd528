//! Cine playback over the frames of the current series.
//!
//! At most one advance is ever scheduled. The owner polls with the current
//! time (or calls [`CineController::fire`] from its own timer) and repaints
//! whenever a new frame index comes back.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CineState {
    Stopped,
    Playing { next_due: Instant, delay: Duration },
}

#[derive(Debug, Clone)]
pub struct CineController {
    state: CineState,
    frame_index: usize,
    frame_count: usize,
    period: Duration,
}

impl CineController {
    /// `period` is the length of one full loop over the series.
    pub fn new(period: Duration) -> Self {
        Self {
            state: CineState::Stopped,
            frame_index: 0,
            frame_count: 0,
            period,
        }
    }

    /// Per-frame delay for a series of `frame_count` frames, whole milliseconds, at least 1 ms.
    pub fn frame_delay(&self, frame_count: usize) -> Duration {
        let count = frame_count.max(1) as u128;
        let millis = (self.period.as_millis() / count).max(1);
        Duration::from_millis(millis as u64)
    }

    /// Begin playback from frame 0. Returns false when already playing or
    /// there is nothing to play.
    pub fn start(&mut self, frame_count: usize, now: Instant) -> bool {
        if self.is_playing() || frame_count == 0 {
            return false;
        }
        let delay = self.frame_delay(frame_count);
        self.frame_count = frame_count;
        self.frame_index = 0;
        self.state = CineState::Playing {
            next_due: now + delay,
            delay,
        };
        tracing::debug!("Cine started: {frame_count} frames, {delay:?} per frame");
        true
    }

    /// Cancel the pending advance. Safe to call when stopped.
    pub fn stop(&mut self) {
        if self.is_playing() {
            tracing::debug!("Cine stopped at frame {}", self.frame_index);
        }
        self.state = CineState::Stopped;
    }

    /// Stop and rewind. Used before the frame buffer is replaced.
    pub fn reset(&mut self) {
        self.stop();
        self.frame_index = 0;
        self.frame_count = 0;
    }

    /// The scheduled advance: move to the next frame and schedule the one after.
    pub fn fire(&mut self, now: Instant) -> Option<usize> {
        let CineState::Playing { delay, .. } = self.state else {
            return None;
        };
        self.frame_index = (self.frame_index + 1) % self.frame_count.max(1);
        self.state = CineState::Playing {
            next_due: now + delay,
            delay,
        };
        Some(self.frame_index)
    }

    /// Fire if the pending advance is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        match self.state {
            CineState::Playing { next_due, .. } if now >= next_due => self.fire(now),
            _ => None,
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        match self.state {
            CineState::Playing { next_due, .. } => Some(next_due),
            CineState::Stopped => None,
        }
    }

    pub fn state(&self) -> CineState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, CineState::Playing { .. })
    }

    /// Index of the frame currently on screen.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }
}

impl Default for CineController {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}
