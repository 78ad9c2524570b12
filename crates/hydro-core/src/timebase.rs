use std::time::{Duration, Instant};

/// Maps monotonic wall-clock time onto simulation time.
///
/// A `scale` of 2.0 runs the simulation twice as fast as the wall clock.
#[derive(Debug, Clone, Copy)]
pub struct TimeBase {
    start: Instant,
    scale: f64,
}

impl TimeBase {
    pub fn new() -> Self {
        Self::with_scale(1.0)
    }

    pub fn with_scale(scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self {
            start: Instant::now(),
            scale,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Simulation time elapsed since start.
    pub fn now(&self) -> Duration {
        self.to_sim(self.start.elapsed())
    }

    /// Monotonic microseconds of simulation time since start.
    pub fn now_us(&self) -> u64 {
        self.now().as_micros() as u64
    }

    /// Wall-clock instant at which simulation time `sim` is reached.
    pub fn instant_at(&self, sim: Duration) -> Instant {
        self.start + sim.div_f64(self.scale)
    }

    fn to_sim(&self, wall: Duration) -> Duration {
        wall.mul_f64(self.scale)
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}
