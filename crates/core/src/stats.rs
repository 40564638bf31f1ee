//! Per-frame and rolling-average frame-time statistics.

use std::time::Duration;

use tracing::debug;

use crate::timer::Timer;

/// Number of frames the rolling average covers.
pub const FRAME_HISTORY_CAPACITY: usize = 300;

/// Fixed-capacity circular buffer of frame times.
///
/// The write position wraps modulo the capacity. The average divides by the
/// number of entries actually written (capped at the capacity), so a
/// half-filled buffer is not biased low by its unwritten slots.
#[derive(Debug)]
pub struct FrameTimeHistory {
    samples: Box<[Duration]>,
    head: usize,
    len: usize,
}

impl FrameTimeHistory {
    /// Create an empty history with the given capacity.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be non-zero");
        Self {
            samples: vec![Duration::ZERO; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Records one frame time, overwriting the oldest entry once full.
    pub fn push(&mut self, frame_time: Duration) {
        self.samples[self.head] = frame_time;
        self.head = (self.head + 1) % self.samples.len();
        self.len = (self.len + 1).min(self.samples.len());
    }

    /// Number of entries written so far, capped at the capacity.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True until the first frame time has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of entries the history can hold.
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Mean of the recorded frame times, or `None` while empty.
    pub fn average(&self) -> Option<Duration> {
        if self.len == 0 {
            return None;
        }
        // Slots beyond `len` have never been written; `len < capacity`
        // implies the head has not wrapped, so the written slots are a
        // prefix of the buffer.
        let sum: Duration = self.samples[..self.len].iter().sum();
        Some(sum / self.len as u32)
    }
}

/// One frame's worth of timing diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct FrameSample {
    /// Time between this frame and the previous one.
    pub frame_time: Duration,
    /// Instantaneous frame rate; `None` when the frame time was zero.
    pub fps: Option<f64>,
    /// Rolling-average frame time over the recorded history.
    pub average: Option<Duration>,
    /// Frame rate implied by the rolling average.
    pub average_fps: Option<f64>,
}

impl FrameSample {
    /// Frame time in milliseconds.
    pub fn frame_time_ms(&self) -> f64 {
        self.frame_time.as_secs_f64() * 1_000.0
    }

    /// Rolling-average frame time in milliseconds.
    pub fn average_ms(&self) -> Option<f64> {
        self.average.map(|avg| avg.as_secs_f64() * 1_000.0)
    }

    /// Emits the per-frame diagnostic lines at debug level.
    ///
    /// An unavailable rate (zero frame time) is rendered as `inf` rather
    /// than skipped, so the line format stays stable for log consumers.
    pub fn log(&self) {
        debug!(
            "Frame time: {:.3} ms ({:.1} fps)",
            self.frame_time_ms(),
            self.fps.unwrap_or(f64::INFINITY)
        );
        if let Some(average_ms) = self.average_ms() {
            debug!(
                "Rolling average: {:.3} ms ({:.1} fps)",
                average_ms,
                self.average_fps.unwrap_or(f64::INFINITY)
            );
        }
    }
}

/// Measures per-frame timing and keeps the rolling history.
///
/// Diagnostic-only: nothing here feeds back into rendering or pacing.
#[derive(Debug)]
pub struct TimingTracker {
    timer: Timer,
    history: FrameTimeHistory,
    frame_count: u64,
}

impl TimingTracker {
    /// Create a tracker with the default history capacity, with the frame
    /// timing baseline set to now.
    pub fn new() -> Self {
        Self::with_capacity(FRAME_HISTORY_CAPACITY)
    }

    /// Create a tracker whose rolling average covers `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            timer: Timer::new(),
            history: FrameTimeHistory::new(capacity),
            frame_count: 0,
        }
    }

    /// Measures the time since the previous frame and records it.
    ///
    /// Call once per frame, after the present.
    pub fn tick(&mut self) -> FrameSample {
        let frame_time = self.timer.tick();
        self.record(frame_time)
    }

    /// Records an externally measured frame time.
    pub fn record(&mut self, frame_time: Duration) -> FrameSample {
        self.history.push(frame_time);
        // Monotonic; wrapping is irrelevant since the history tracks its own
        // write position.
        self.frame_count = self.frame_count.wrapping_add(1);

        let average = self.history.average();
        FrameSample {
            frame_time,
            fps: rate(frame_time),
            average,
            average_fps: average.and_then(rate),
        }
    }

    /// Total frames recorded since the tracker was created.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for TimingTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames per second implied by one frame time, or `None` when the frame
/// time is zero and the rate is undefined.
fn rate(frame_time: Duration) -> Option<f64> {
    if frame_time.is_zero() {
        None
    } else {
        Some(1.0 / frame_time.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_constant_full_history_is_exact() {
        let mut tracker = TimingTracker::new();
        let frame = Duration::from_millis(5);
        let mut last = None;
        for _ in 0..FRAME_HISTORY_CAPACITY {
            last = Some(tracker.record(frame));
        }
        let sample = last.unwrap();
        assert_eq!(sample.average, Some(frame));
        assert!((sample.average_fps.unwrap() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_is_idempotent_after_full_wrap() {
        let mut tracker = TimingTracker::with_capacity(FRAME_HISTORY_CAPACITY);
        // Arbitrary starting content.
        for i in 0..123u64 {
            tracker.record(Duration::from_micros(100 + i));
        }
        // One full wrap of identical entries displaces everything else.
        let frame = Duration::from_millis(16);
        let mut last = None;
        for _ in 0..FRAME_HISTORY_CAPACITY {
            last = Some(tracker.record(frame));
        }
        assert_eq!(last.unwrap().average, Some(frame));
    }

    #[test]
    fn test_partial_history_divides_by_fill_count() {
        let mut tracker = TimingTracker::new();
        tracker.record(Duration::from_millis(10));
        let sample = tracker.record(Duration::from_millis(20));
        // Two entries: mean is 15 ms, not (10+20)/300.
        assert_eq!(sample.average, Some(Duration::from_millis(15)));
    }

    #[test]
    fn test_empty_history_has_no_average() {
        let history = FrameTimeHistory::new(FRAME_HISTORY_CAPACITY);
        assert!(history.is_empty());
        assert_eq!(history.average(), None);
    }

    #[test]
    fn test_zero_frame_time_yields_no_rate() {
        let mut tracker = TimingTracker::new();
        let sample = tracker.record(Duration::ZERO);
        assert_eq!(sample.fps, None);
        assert_eq!(sample.average, Some(Duration::ZERO));
        assert_eq!(sample.average_fps, None);
    }

    #[test]
    fn test_history_length_caps_at_capacity() {
        let mut history = FrameTimeHistory::new(4);
        for i in 0..10u64 {
            history.push(Duration::from_millis(i));
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.capacity(), 4);
        // The last four entries survive: 6, 7, 8, 9 ms -> mean 7.5 ms.
        assert_eq!(history.average(), Some(Duration::from_micros(7_500)));
    }

    #[test]
    fn test_frame_count_is_monotonic() {
        let mut tracker = TimingTracker::with_capacity(2);
        for _ in 0..5 {
            tracker.record(Duration::from_millis(1));
        }
        assert_eq!(tracker.frame_count(), 5);
    }

    #[test]
    fn test_sample_millisecond_conversions() {
        let mut tracker = TimingTracker::new();
        let sample = tracker.record(Duration::from_micros(16_500));
        assert!((sample.frame_time_ms() - 16.5).abs() < 1e-9);
        assert!((sample.average_ms().unwrap() - 16.5).abs() < 1e-9);
    }

    #[test]
    fn test_tick_measures_real_time() {
        let mut tracker = TimingTracker::new();
        std::thread::sleep(Duration::from_millis(5));
        let sample = tracker.tick();
        assert!(sample.frame_time >= Duration::from_millis(5));
        assert!(sample.fps.is_some());
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn test_zero_capacity_rejected() {
        FrameTimeHistory::new(0);
    }

    #[test]
    fn test_log_handles_unavailable_rates() {
        let mut tracker = TimingTracker::new();
        // A zero frame time has no defined rate; logging it must not panic.
        tracker.record(Duration::ZERO).log();
        tracker.record(Duration::from_millis(16)).log();
    }
}
