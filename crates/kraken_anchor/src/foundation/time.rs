//! Time management utilities

use std::time::{Duration, Instant};

/// Monotonic clock for event timestamps
///
/// Reports seconds since the clock was started as `f64`, the unit carried
/// by every Anchor event.
#[derive(Debug, Clone, Copy)]
pub struct EventClock {
    origin: Instant,
}

impl EventClock {
    /// Start a clock at zero
    pub fn start() -> Self {
        Self { origin: Instant::now() }
    }

    /// Seconds elapsed since [`EventClock::start`]
    pub fn seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    /// Elapsed time as a [`Duration`]
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for EventClock {
    fn default() -> Self {
        Self::start()
    }
}

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance by one event loop iteration
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Seconds since the previous update
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Seconds accumulated over all updates
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of updates so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_clock_is_monotonic() {
        let clock = EventClock::start();
        let first = clock.seconds();
        let second = clock.seconds();
        assert!(first >= 0.0);
        assert!(second >= first);
    }

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.total_time() >= timer.delta_time());
    }
}
