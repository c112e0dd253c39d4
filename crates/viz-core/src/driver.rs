//! Per-scene animation state machine: `Idle -> Running -> Stopped`.
//!
//! `Stopped` is terminal. Restarting requires building a fresh scene.

use crate::clock::AnimationClock;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
}

#[derive(Clone, Debug)]
pub struct AnimationDriver {
    state: DriverState,
    clock: AnimationClock,
    frames: u64,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Idle,
            clock: AnimationClock::new(),
            frames: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// `Idle -> Running`. Any other state is left alone and reported as `false`.
    pub fn start(&mut self) -> bool {
        if self.state != DriverState::Idle {
            return false;
        }
        self.state = DriverState::Running;
        true
    }

    /// Move to `Stopped`. Returns `true` only on the first call.
    pub fn stop(&mut self) -> bool {
        if self.state == DriverState::Stopped {
            return false;
        }
        self.state = DriverState::Stopped;
        true
    }

    /// Advance the clock for one frame. `None` unless running.
    pub fn begin_frame(&mut self, dt: Duration) -> Option<f32> {
        if !self.is_running() {
            return None;
        }
        self.frames += 1;
        Some(self.clock.advance(dt))
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
