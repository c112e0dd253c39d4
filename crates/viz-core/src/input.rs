//! Pointer and viewport state shared between window listeners and the frame loop.
//!
//! Writers replace the whole record; the frame loop copies the latest snapshot
//! once per frame and never writes back.

use glam::Vec2;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputState {
    /// Pointer position in normalized device coordinates, both axes in [-1, 1],
    /// +Y up.
    pub pointer: Vec2,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pointer: Vec2::ZERO,
            aspect: 1.0,
        }
    }
}

/// Map a client-space pointer position to [-1, 1] on both axes.
///
/// A zero-sized viewport maps to the center.
#[inline]
pub fn normalize_pointer(client_x: f32, client_y: f32, width: f32, height: f32) -> Vec2 {
    if !(width > 0.0 && height > 0.0) {
        return Vec2::ZERO;
    }
    let x = (client_x / width) * 2.0 - 1.0;
    let y = -(client_y / height) * 2.0 + 1.0;
    Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0))
}

#[inline]
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    if width > 0.0 && height > 0.0 {
        width / height
    } else {
        1.0
    }
}

/// Cheaply clonable handle to the latest [`InputState`].
#[derive(Clone, Debug, Default)]
pub struct SharedInput(Rc<Cell<InputState>>);

impl SharedInput {
    pub fn new(initial: InputState) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }

    #[inline]
    pub fn snapshot(&self) -> InputState {
        self.0.get()
    }

    #[inline]
    pub fn replace(&self, state: InputState) {
        self.0.set(state);
    }

    pub fn on_pointer_move(&self, client_x: f32, client_y: f32, width: f32, height: f32) {
        let prev = self.snapshot();
        self.replace(InputState {
            pointer: normalize_pointer(client_x, client_y, width, height),
            ..prev
        });
    }

    pub fn on_resize(&self, width: f32, height: f32) {
        let prev = self.snapshot();
        self.replace(InputState {
            aspect: aspect_ratio(width, height),
            ..prev
        });
    }
}
