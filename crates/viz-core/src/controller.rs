//! Mount/Unmount Controller.
//!
//! Mounting is two-phase because renderer creation is asynchronous on the web:
//! `begin_mount` hands out a ticket, `finish_mount` installs the parts if the
//! ticket is still current. An `unmount` in between invalidates the ticket and
//! the late parts are torn down on arrival.
//!
//! Teardown order: cancel the frame task, detach input listeners, dispose the
//! scene's GPU resources, then detach the surface if it is still attached.

use crate::instance::SceneInstance;
use crate::renderer::Renderer;
use crate::schedule::{FrameTask, ListenerGuard, SurfaceMount};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountPhase {
    Unmounted,
    Mounting,
    Mounted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MountTicket(u64);

pub type SharedScene<R> = Rc<RefCell<SceneInstance<R>>>;

/// Everything created for one mount except the frame task.
pub struct MountParts<R: Renderer> {
    pub scene: SharedScene<R>,
    pub surface: Box<dyn SurfaceMount>,
    /// `None` when input comes from an externally owned source.
    pub listeners: Option<Box<dyn ListenerGuard>>,
}

struct Live<R: Renderer> {
    parts: MountParts<R>,
    frames: Box<dyn FrameTask>,
}

pub struct MountController<R: Renderer> {
    phase: MountPhase,
    generation: u64,
    live: Option<Live<R>>,
}

impl<R: Renderer> Default for MountController<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Renderer> MountController<R> {
    pub fn new() -> Self {
        Self {
            phase: MountPhase::Unmounted,
            generation: 0,
            live: None,
        }
    }

    pub fn phase(&self) -> MountPhase {
        self.phase
    }

    pub fn scene(&self) -> Option<SharedScene<R>> {
        self.live.as_ref().map(|l| l.parts.scene.clone())
    }

    /// Start a mount. `None` if one is already mounted or in progress.
    pub fn begin_mount(&mut self) -> Option<MountTicket> {
        if self.phase != MountPhase::Unmounted {
            log::warn!("[mount] already {:?}; ignoring mount", self.phase);
            return None;
        }
        self.generation += 1;
        self.phase = MountPhase::Mounting;
        Some(MountTicket(self.generation))
    }

    /// Start a mount into `container`. A missing host container (already
    /// removed by the page) is a no-op, like a mount that is already live.
    pub fn begin_mount_into<T>(&mut self, container: Option<T>) -> Option<(MountTicket, T)> {
        let Some(container) = container else {
            log::warn!("[mount] no live container; ignoring mount");
            return None;
        };
        self.begin_mount().map(|ticket| (ticket, container))
    }

    /// Install the parts for `ticket` and start the frame task. If the ticket
    /// was invalidated by an `unmount`, the parts are torn down instead and
    /// `start_frames` is never called.
    pub fn finish_mount<F>(&mut self, ticket: MountTicket, parts: MountParts<R>, start_frames: F) -> bool
    where
        F: FnOnce(&SharedScene<R>) -> Box<dyn FrameTask>,
    {
        if self.phase != MountPhase::Mounting || ticket.0 != self.generation {
            log::info!("[mount] unmounted while mounting; releasing late parts");
            teardown(None, parts);
            return false;
        }
        parts.scene.borrow_mut().start();
        let frames = start_frames(&parts.scene);
        self.live = Some(Live { parts, frames });
        self.phase = MountPhase::Mounted;
        true
    }

    /// Give up a mount whose asynchronous setup failed.
    pub fn abandon_mount(&mut self, ticket: MountTicket) {
        if self.phase == MountPhase::Mounting && ticket.0 == self.generation {
            self.phase = MountPhase::Unmounted;
        }
    }

    /// Tear down the current mount. Safe to call any number of times; returns
    /// `true` only when something was torn down or a pending mount cancelled.
    pub fn unmount(&mut self) -> bool {
        match self.phase {
            MountPhase::Unmounted => false,
            MountPhase::Mounting => {
                // Invalidate the outstanding ticket.
                self.generation += 1;
                self.phase = MountPhase::Unmounted;
                true
            }
            MountPhase::Mounted => {
                self.phase = MountPhase::Unmounted;
                if let Some(live) = self.live.take() {
                    teardown(Some(live.frames), live.parts);
                }
                true
            }
        }
    }
}

impl<R: Renderer> Drop for MountController<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn teardown<R: Renderer>(frames: Option<Box<dyn FrameTask>>, parts: MountParts<R>) {
    let MountParts {
        scene,
        mut surface,
        listeners,
    } = parts;
    if let Some(mut f) = frames {
        f.cancel();
    }
    if let Some(mut l) = listeners {
        l.detach();
    }
    scene.borrow_mut().stop();
    if surface.is_attached() {
        surface.detach();
    } else {
        log::debug!("[mount] surface already detached by host");
    }
}
