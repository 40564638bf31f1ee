//! Frame pacing.
//!
//! The pacer bounds the frame rate by sleeping out the unused part of each
//! frame's budget between clearing and presenting. Sleeping is best-effort;
//! the OS scheduler governs the actual precision, and over- or undersleep is
//! never treated as an error.

use std::thread;
use std::time::{Duration, Instant};

/// Default frame budget: one 60 Hz frame, rounded up to whole nanoseconds.
pub const FRAME_BUDGET: Duration = Duration::from_nanos(16_666_667);

/// Caps the frame rate near a target by padding each frame out to a fixed
/// budget with a sleep.
#[derive(Debug)]
pub struct FramePacer {
    budget: Duration,
    last_swap: Instant,
}

impl FramePacer {
    /// Create a pacer with the given frame budget, measuring from now.
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            last_swap: Instant::now(),
        }
    }

    /// Create a pacer targeting the given frame rate.
    pub fn for_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    /// The frame budget this pacer pads frames out to.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time spent on the current frame so far, measured from the last swap.
    pub fn render_time(&self) -> Duration {
        self.last_swap.elapsed()
    }

    /// How long to sleep to pad a frame with the given render time out to
    /// the budget. Saturates at zero when the frame already overran; the
    /// subtraction must never wrap into a huge unsigned delay.
    pub fn padding(&self, render_time: Duration) -> Duration {
        self.budget.saturating_sub(render_time)
    }

    /// Sleeps out the remainder of the current frame's budget and returns
    /// the requested sleep duration (zero when the frame overran).
    pub fn pace(&self) -> Duration {
        let padding = self.padding(self.render_time());
        if padding > Duration::ZERO {
            thread::sleep(padding);
        }
        padding
    }

    /// Records the swap that ends the current frame.
    ///
    /// Call immediately after the present, not before: this instant is the
    /// basis for the next frame's render time.
    pub fn mark_swap(&mut self) {
        self.last_swap = Instant::now();
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(FRAME_BUDGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget_approximates_60hz() {
        let budget = FramePacer::default().budget();
        assert!(budget >= Duration::from_millis(16));
        assert!(budget <= Duration::from_millis(17));
    }

    #[test]
    fn test_for_fps_derives_budget() {
        let pacer = FramePacer::for_fps(60);
        assert!(pacer.budget() >= Duration::from_micros(16_600));
        assert!(pacer.budget() <= Duration::from_micros(16_700));

        // A zero target must not divide by zero.
        let pacer = FramePacer::for_fps(0);
        assert_eq!(pacer.budget(), Duration::from_secs(1));
    }

    #[test]
    fn test_padding_for_fast_frame() {
        // 5 ms of render work against a ~16.6 ms budget leaves ~11.6 ms.
        let pacer = FramePacer::new(FRAME_BUDGET);
        let padding = pacer.padding(Duration::from_millis(5));
        assert_eq!(padding, FRAME_BUDGET - Duration::from_millis(5));
    }

    #[test]
    fn test_padding_clamps_on_overrun() {
        // 20 ms of render work against a ~16.6 ms budget: no sleep, no wrap.
        let pacer = FramePacer::new(FRAME_BUDGET);
        assert_eq!(pacer.padding(Duration::from_millis(20)), Duration::ZERO);
        assert_eq!(pacer.padding(FRAME_BUDGET), Duration::ZERO);
    }

    #[test]
    fn test_pace_skips_sleep_after_overrun() {
        let pacer = FramePacer::new(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(2));
        let before = Instant::now();
        let requested = pacer.pace();
        assert_eq!(requested, Duration::ZERO);
        // No sleep was requested, so pace returns promptly.
        assert!(before.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_pace_sleeps_at_least_the_requested_padding() {
        let pacer = FramePacer::new(Duration::from_millis(20));
        let before = Instant::now();
        let requested = pacer.pace();
        assert!(requested > Duration::ZERO);
        assert!(before.elapsed() >= requested);
    }

    #[test]
    fn test_mark_swap_restarts_render_time() {
        let mut pacer = FramePacer::new(FRAME_BUDGET);
        thread::sleep(Duration::from_millis(5));
        assert!(pacer.render_time() >= Duration::from_millis(5));
        pacer.mark_swap();
        assert!(pacer.render_time() < Duration::from_millis(5));
    }
}
