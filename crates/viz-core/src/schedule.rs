//! Platform seams sequenced by the mount controller.

use std::cell::Cell;
use std::rc::Rc;

/// Shared cancellation flag checked before every frame iteration.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// A cancellable repeating per-frame task.
pub trait FrameTask {
    /// Cancel the pending frame; no further iteration may run afterwards.
    fn cancel(&mut self);
    /// Number of frame callbacks currently scheduled (0 or 1).
    fn pending_frames(&self) -> usize;
}

/// Listener registration returned by the input bridge.
pub trait ListenerGuard {
    /// Remove every registered listener. Later calls do nothing.
    fn detach(&mut self);
}

/// Renderer output surface placed into a host container.
pub trait SurfaceMount {
    /// Whether the surface is still inside its container. The host page may
    /// remove the container independently.
    fn is_attached(&self) -> bool;
    fn detach(&mut self);
}
