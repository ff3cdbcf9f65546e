//! Frame pacing for a lesson that shows a fixed number of frames.
//!
//! Each presented frame is held on screen for `frame_delay` before the next one
//! is drawn; after the last frame the delay still runs out before the lesson
//! counts as finished. With vsync the swapchain adds its own wait on top.

use std::time::{Duration, Instant};

pub struct FramePacer {
    total_frames: u32,
    frame_delay: Duration,
    frames_presented: u32,
    next_due: Option<Instant>,
}

impl FramePacer {
    pub fn new(total_frames: u32, frame_delay: Duration) -> Self {
        Self {
            total_frames,
            frame_delay,
            frames_presented: 0,
            next_due: None,
        }
    }

    pub fn frames_presented(&self) -> u32 {
        self.frames_presented
    }

    pub fn all_frames_presented(&self) -> bool {
        self.frames_presented >= self.total_frames
    }

    /// True when another frame is owed and its hold time has elapsed.
    pub fn should_draw(&self, now: Instant) -> bool {
        !self.all_frames_presented() && self.delay_elapsed(now)
    }

    pub fn frame_presented(&mut self, now: Instant) {
        self.frames_presented += 1;
        self.next_due = Some(now + self.frame_delay);
        log::debug!(
            "Frame {}/{} presented",
            self.frames_presented,
            self.total_frames
        );
    }

    /// Count a frame only if it reached the screen. Returns false when the
    /// frame failed and is still owed, so the caller should redraw.
    pub fn record_frame<T, E: std::fmt::Display>(
        &mut self,
        outcome: &Result<T, E>,
        now: Instant,
    ) -> bool {
        match outcome {
            Ok(_) => {
                self.frame_presented(now);
                true
            }
            Err(err) => {
                log::warn!(
                    "Frame {}/{} not presented, retrying: {err}",
                    self.frames_presented + 1,
                    self.total_frames
                );
                false
            }
        }
    }

    /// True once every frame was shown and the last one was held long enough.
    pub fn is_finished(&self, now: Instant) -> bool {
        self.all_frames_presented() && self.delay_elapsed(now)
    }

    /// When the event loop should wake up next, if a hold is in progress.
    pub fn next_wake(&self) -> Option<Instant> {
        self.next_due
    }

    fn delay_elapsed(&self, now: Instant) -> bool {
        self.next_due.map_or(true, |due| now >= due)
    }
}
