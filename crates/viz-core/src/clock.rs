use instant::Instant;
use std::time::Duration;

/// Monotonic elapsed-time source advanced once per frame.
///
/// The clock is never reset while its scene is alive; it only moves forward.
/// `tick` samples wall time, `advance` steps by an explicit delta (tests and
/// hosts with their own timestamps use it).
#[derive(Clone, Debug)]
pub struct AnimationClock {
    elapsed: f32,
    last_delta: f32,
    last_instant: Option<Instant>,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            last_delta: 0.0,
            last_instant: None,
        }
    }

    /// Sample wall time and advance by the delta since the previous sample.
    /// The first call only anchors the clock.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = match self.last_instant {
            Some(prev) => now - prev,
            None => Duration::ZERO,
        };
        self.last_instant = Some(now);
        self.advance(dt)
    }

    /// Advance by `dt` and return the new elapsed time in seconds.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        let dt_sec = dt.as_secs_f32();
        self.last_delta = dt_sec;
        self.elapsed += dt_sec;
        self.elapsed
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn last_delta(&self) -> f32 {
        self.last_delta
    }
}
