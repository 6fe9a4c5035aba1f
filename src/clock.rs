//! Time sources and frame pacing

use std::thread;
use std::time::{Duration, Instant};

/// Elapsed wall-clock time since construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Caps a render loop at a target rate by sleeping out the remainder of
/// each frame budget.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl FramePacer {
    pub fn new(frame_rate: u32) -> Self {
        Self::with_interval(Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left before the current frame's deadline
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.next_deadline {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Sleep until the next frame boundary.
    ///
    /// A frame that overran its budget resets the schedule instead of
    /// trying to catch up with back-to-back frames.
    pub fn wait(&mut self) {
        let now = Instant::now();
        let remaining = self.remaining(now);
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
        let base = match self.next_deadline {
            Some(deadline) if deadline > now => deadline,
            _ => now,
        };
        self.next_deadline = Some(base + self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        thread::sleep(Duration::from_millis(2));
        assert!(clock.now() > a);
    }

    #[test]
    fn test_pacer_interval_from_rate() {
        let pacer = FramePacer::new(50);
        assert_eq!(pacer.interval(), Duration::from_millis(20));
        assert_eq!(pacer.remaining(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_pacer_holds_loop_to_rate() {
        let mut pacer = FramePacer::with_interval(Duration::from_millis(5));
        let start = Instant::now();
        for _ in 0..4 {
            pacer.wait();
        }
        // first wait returns immediately, the following three each sleep out a frame
        assert!(start.elapsed() >= Duration::from_millis(14));
    }
}
