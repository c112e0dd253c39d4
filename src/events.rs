use anyhow::anyhow;
use viz_core::{InputState, ListenerGuard, SharedInput};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

fn viewport(window: &web::Window) -> (f32, f32) {
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    (dim(window.inner_width()), dim(window.inner_height()))
}

/// Window listeners feeding one [`SharedInput`]. Removed on `detach` or drop.
pub struct InputListeners {
    window: web::Window,
    pointermove: Option<Closure<dyn FnMut(web::PointerEvent)>>,
    resize: Option<Closure<dyn FnMut()>>,
}

impl InputListeners {
    pub fn attach(input: SharedInput) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow!("no window"))?;
        let (w, h) = viewport(&window);
        input.replace(InputState {
            aspect: viz_core::input::aspect_ratio(w, h),
            ..input.snapshot()
        });

        let win = window.clone();
        let pointer_input = input.clone();
        let pointermove = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let (w, h) = viewport(&win);
            pointer_input.on_pointer_move(ev.client_x() as f32, ev.client_y() as f32, w, h);
        }) as Box<dyn FnMut(web::PointerEvent)>);

        let win = window.clone();
        let resize = Closure::wrap(Box::new(move || {
            let (w, h) = viewport(&win);
            input.on_resize(w, h);
        }) as Box<dyn FnMut()>);

        window
            .add_event_listener_with_callback("pointermove", pointermove.as_ref().unchecked_ref())
            .map_err(|e| anyhow!("pointermove listener: {:?}", e))?;
        if let Err(e) =
            window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())
        {
            _ = window.remove_event_listener_with_callback(
                "pointermove",
                pointermove.as_ref().unchecked_ref(),
            );
            return Err(anyhow!("resize listener: {:?}", e));
        }

        Ok(Self {
            window,
            pointermove: Some(pointermove),
            resize: Some(resize),
        })
    }
}

impl ListenerGuard for InputListeners {
    fn detach(&mut self) {
        if let Some(c) = self.pointermove.take() {
            _ = self
                .window
                .remove_event_listener_with_callback("pointermove", c.as_ref().unchecked_ref());
        }
        if let Some(c) = self.resize.take() {
            _ = self
                .window
                .remove_event_listener_with_callback("resize", c.as_ref().unchecked_ref());
        }
    }
}

impl Drop for InputListeners {
    fn drop(&mut self) {
        self.detach();
    }
}
