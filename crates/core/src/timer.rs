//! Frame clock used to drive per-frame simulation steps.

use std::time::{Duration, Instant};

/// Measures wall time between frames.
///
/// The delta returned by [`FrameClock::tick`] is clamped so that a long stall
/// (window drag, debugger pause) produces at most `max_delta` of movement.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_tick: Instant,
    max_delta: Duration,
    frames: u64,
}

impl FrameClock {
    /// Default clamp for a single frame step.
    pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(250);

    /// Create a new clock, starting from now.
    pub fn new() -> Self {
        Self::with_max_delta(Self::DEFAULT_MAX_DELTA)
    }

    /// Create a clock with a custom clamp for the per-frame delta.
    pub fn with_max_delta(max_delta: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            max_delta,
            frames: 0,
        }
    }

    /// Total elapsed time since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Advance the clock and return the clamped delta in seconds.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Number of ticks so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.frames += 1;
        delta.min(self.max_delta).as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_reports_elapsed_delta() {
        let mut clock = FrameClock::new();
        let start = clock.last_tick;
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
        assert_eq!(clock.frames(), 1);
    }

    #[test]
    fn test_tick_clamps_long_stall() {
        let mut clock = FrameClock::with_max_delta(Duration::from_millis(100));
        let start = clock.last_tick;
        let dt = clock.tick_at(start + Duration::from_secs(5));
        assert!((dt - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_tick_never_negative() {
        let mut clock = FrameClock::new();
        let start = clock.last_tick;
        clock.tick_at(start + Duration::from_millis(10));
        let dt = clock.tick_at(start);
        assert_eq!(dt, 0.0);
    }
}
