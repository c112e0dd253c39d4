use crate::dom;
use crate::render::GpuRenderer;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use viz_core::{CancelToken, FrameTask, InputState, SharedInput, SharedScene, SurfaceSize};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Default)]
struct LoopState {
    raf_id: Cell<Option<i32>>,
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl LoopState {
    fn schedule(&self) {
        let Some(window) = web::window() else {
            return;
        };
        if let Some(tick) = self.tick.borrow().as_ref() {
            match window.request_animation_frame(tick.as_ref().unchecked_ref()) {
                Ok(id) => self.raf_id.set(Some(id)),
                Err(e) => log::error!("[frame] requestAnimationFrame failed: {:?}", e),
            }
        }
    }
}

/// requestAnimationFrame loop driving one scene.
///
/// Holds the scene weakly; the mount controller owns it. Each tick syncs the
/// canvas backing size, advances the scene and schedules the next tick unless
/// cancelled.
pub struct FrameLoop {
    token: CancelToken,
    state: Rc<LoopState>,
}

impl FrameLoop {
    pub fn start(
        scene: &SharedScene<GpuRenderer>,
        canvas: web::HtmlCanvasElement,
        input: SharedInput,
    ) -> Self {
        let token = CancelToken::new();
        let state = Rc::new(LoopState::default());

        let weak_scene: Weak<_> = Rc::downgrade(scene);
        let weak_state = Rc::downgrade(&state);
        let tick_token = token.clone();
        let mut last_instant = Instant::now();
        let mut size = SurfaceSize::new(canvas.width(), canvas.height());

        let tick = Closure::wrap(Box::new(move || {
            let Some(state) = weak_state.upgrade() else {
                return;
            };
            state.raf_id.set(None);
            if tick_token.is_cancelled() {
                return;
            }
            let Some(scene) = weak_scene.upgrade() else {
                return;
            };
            let now = Instant::now();
            let dt = now - last_instant;
            last_instant = now;

            let current = dom::sync_canvas_backing_size(&canvas);
            if let Ok(mut scene) = scene.try_borrow_mut() {
                if current != size {
                    size = current;
                    scene.resize(size);
                }
                let snapshot = input.snapshot();
                scene.frame(
                    dt,
                    InputState {
                        aspect: size.aspect(),
                        ..snapshot
                    },
                );
            }
            if !tick_token.is_cancelled() {
                state.schedule();
            }
        }) as Box<dyn FnMut()>);
        *state.tick.borrow_mut() = Some(tick);
        state.schedule();

        Self { token, state }
    }
}

impl FrameTask for FrameLoop {
    fn cancel(&mut self) {
        self.token.cancel();
        if let Some(id) = self.state.raf_id.take() {
            if let Some(window) = web::window() {
                _ = window.cancel_animation_frame(id);
            }
        }
        self.state.tick.borrow_mut().take();
    }

    fn pending_frames(&self) -> usize {
        usize::from(self.state.raf_id.get().is_some())
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}
