#![cfg(target_arch = "wasm32")]
//! Browser bindings for the portfolio 3D widgets.
//!
//! A [`SceneWidget`] mounts one scene into a host container element and tears
//! it down again on `unmount`. Scene semantics live in `viz-core`; this crate
//! supplies the WebGPU renderer, the canvas, window listeners and the
//! requestAnimationFrame loop.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use viz_core::{
    FrameTask, ListenerGuard, MountController, MountParts, MountTicket, ResourceRegistry,
    SceneConfig, SharedInput, SharedScene, SurfaceMount, SurfaceSize,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod frame;
mod render;
mod surface;
mod texture;

use events::InputListeners;
use frame::FrameLoop;
use render::GpuRenderer;
use surface::CanvasSurface;

thread_local! {
    static REGISTRY: ResourceRegistry = ResourceRegistry::new();
}

fn registry() -> ResourceRegistry {
    REGISTRY.with(|r| r.clone())
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("viz-web loaded");
    Ok(())
}

/// Number of scenes currently holding GPU resources.
#[wasm_bindgen(js_name = liveSceneCount)]
pub fn live_scene_count() -> usize {
    registry().live_handles()
}

/// Pointer and viewport listeners shared by several widgets on one page.
#[wasm_bindgen]
pub struct InputHub {
    input: SharedInput,
    listeners: Option<InputListeners>,
}

#[wasm_bindgen]
impl InputHub {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<InputHub, JsValue> {
        let input = SharedInput::default();
        let listeners = InputListeners::attach(input.clone()).map_err(js_error)?;
        Ok(Self {
            input,
            listeners: Some(listeners),
        })
    }

    pub fn dispose(&mut self) {
        if let Some(mut l) = self.listeners.take() {
            l.detach();
        }
    }
}

#[wasm_bindgen]
pub struct SceneWidget {
    controller: Rc<RefCell<MountController<GpuRenderer>>>,
}

impl Default for SceneWidget {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SceneWidget {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SceneWidget {
        Self {
            controller: Rc::new(RefCell::new(MountController::new())),
        }
    }

    /// Mount a scene described by `config` (a JSON string or plain object)
    /// into `container`. Returns `false` if a mount is already live or pending,
    /// or if the container is missing or no longer in the document. Only a
    /// config that cannot be parsed is an error.
    pub fn mount(
        &self,
        container: Option<web::HtmlElement>,
        config: JsValue,
    ) -> Result<bool, JsValue> {
        self.mount_inner(container, config, None)
    }

    /// Like `mount`, but reads pointer and viewport state from `hub` instead of
    /// registering listeners of its own.
    #[wasm_bindgen(js_name = mountWithInput)]
    pub fn mount_with_input(
        &self,
        container: Option<web::HtmlElement>,
        config: JsValue,
        hub: &InputHub,
    ) -> Result<bool, JsValue> {
        self.mount_inner(container, config, Some(hub.input.clone()))
    }

    /// Tear down the current scene. Safe to call repeatedly.
    pub fn unmount(&self) -> bool {
        self.controller.borrow_mut().unmount()
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.controller.borrow().phase() == viz_core::MountPhase::Mounted
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.controller.borrow().phase()).to_lowercase()
    }
}

impl SceneWidget {
    fn mount_inner(
        &self,
        container: Option<web::HtmlElement>,
        config: JsValue,
        shared_input: Option<SharedInput>,
    ) -> Result<bool, JsValue> {
        let config = parse_config(&config)?;
        let container = container.filter(|c| c.is_connected());
        let Some((ticket, container)) = self.controller.borrow_mut().begin_mount_into(container)
        else {
            return Ok(false);
        };
        let canvas = match dom::window_document()
            .ok_or_else(|| anyhow::anyhow!("no document"))
            .and_then(|document| dom::create_canvas(&document, &container))
        {
            Ok(c) => c,
            Err(e) => {
                log::warn!("[mount] canvas unavailable: {:?}", e);
                self.controller.borrow_mut().abandon_mount(ticket);
                return Ok(false);
            }
        };
        let size = dom::sync_canvas_backing_size(&canvas);
        spawn_local(complete_mount(
            Rc::downgrade(&self.controller),
            ticket,
            config,
            CanvasSurface::new(container, canvas.clone()),
            canvas,
            size,
            shared_input,
        ));
        Ok(true)
    }
}

fn parse_config(config: &JsValue) -> Result<SceneConfig, JsValue> {
    let text = match config.as_string() {
        Some(s) => s,
        None => String::from(js_sys::JSON::stringify(config)?),
    };
    SceneConfig::from_json(&text).map_err(js_error)
}

async fn complete_mount(
    controller: Weak<RefCell<MountController<GpuRenderer>>>,
    ticket: MountTicket,
    config: SceneConfig,
    mut surface: CanvasSurface,
    canvas: web::HtmlCanvasElement,
    size: SurfaceSize,
    shared_input: Option<SharedInput>,
) {
    let renderer = match GpuRenderer::new(&canvas, size).await {
        Ok(r) => r,
        Err(e) => {
            log::error!("[mount] WebGPU init error: {:?}", e);
            if let Some(c) = controller.upgrade() {
                c.borrow_mut().abandon_mount(ticket);
            }
            if surface.is_attached() {
                surface.detach();
            }
            return;
        }
    };
    let scene = Rc::new(RefCell::new(viz_core::build(&config, renderer, size, &registry())));
    let texture_request = scene.borrow().texture_request();

    let (input, listeners) = match shared_input {
        Some(input) => (input, None),
        None => {
            let input = SharedInput::default();
            let listeners: Option<Box<dyn ListenerGuard>> =
                match InputListeners::attach(input.clone()) {
                    Ok(l) => Some(Box::new(l)),
                    Err(e) => {
                        log::warn!("[mount] input listeners unavailable: {:?}", e);
                        None
                    }
                };
            (input, listeners)
        }
    };

    let Some(controller) = controller.upgrade() else {
        log::info!("[mount] widget dropped while mounting; releasing scene");
        if let Some(mut l) = listeners {
            l.detach();
        }
        scene.borrow_mut().stop();
        if surface.is_attached() {
            surface.detach();
        }
        return;
    };
    let parts = MountParts {
        scene: scene.clone(),
        surface: Box::new(surface),
        listeners,
    };
    let installed = controller
        .borrow_mut()
        .finish_mount(ticket, parts, |scene: &SharedScene<GpuRenderer>| -> Box<dyn FrameTask> {
            Box::new(FrameLoop::start(scene, canvas, input))
        });
    if installed {
        if let Some(ticket) = texture_request {
            texture::spawn_load(Rc::downgrade(&scene), ticket);
        }
    }
}
