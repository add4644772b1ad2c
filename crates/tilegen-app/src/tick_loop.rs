//! Fixed-rate tick loop for the result consumer.
//!
//! Measures wall-clock time into an accumulator and runs the update callback
//! once per elapsed tick, so `MapGenerator::drain` is called at a steady rate
//! no matter how long each pass through the outer loop takes.

use std::time::{Duration, Instant};
use tracing::warn;

/// Upper bound on the time credited to a single frame. Longer stalls are
/// clamped so the loop never has to catch up on dozens of ticks at once.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Fixed-rate tick scheduler.
pub struct TickLoop {
    tick_dt: f64,
    previous_time: Instant,
    accumulator: f64,
    tick_count: u64,
}

impl TickLoop {
    /// A loop ticking `rate_hz` times per second. A zero rate is treated as 1 Hz.
    pub fn new(rate_hz: u32) -> Self {
        Self {
            tick_dt: 1.0 / f64::from(rate_hz.max(1)),
            previous_time: Instant::now(),
            accumulator: 0.0,
            tick_count: 0,
        }
    }

    /// Measure the time since the last call and run `update_fn` once per
    /// whole tick elapsed. Returns the number of ticks run.
    pub fn tick(&mut self, update_fn: impl FnMut(u64)) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance(frame_time, update_fn)
    }

    /// Credit `frame_time` seconds and run the ticks that became due.
    ///
    /// `update_fn` receives the index of the tick being run.
    pub fn advance(&mut self, frame_time: f64, mut update_fn: impl FnMut(u64)) -> u32 {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;

        let mut ran = 0;
        while self.accumulator >= self.tick_dt {
            update_fn(self.tick_count);
            self.accumulator -= self.tick_dt;
            self.tick_count += 1;
            ran += 1;
        }
        ran
    }

    /// Time left until the next tick is due.
    pub fn time_until_next_tick(&self) -> Duration {
        Duration::from_secs_f64((self.tick_dt - self.accumulator).max(0.0))
    }

    /// Seconds per tick.
    pub fn tick_dt(&self) -> f64 {
        self.tick_dt
    }

    /// Total ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
