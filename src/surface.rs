use viz_core::SurfaceMount;
use web_sys as web;

/// A widget canvas placed inside its host container.
pub struct CanvasSurface {
    container: web::HtmlElement,
    canvas: web::HtmlCanvasElement,
}

impl CanvasSurface {
    pub fn new(container: web::HtmlElement, canvas: web::HtmlCanvasElement) -> Self {
        Self { container, canvas }
    }
}

impl SurfaceMount for CanvasSurface {
    fn is_attached(&self) -> bool {
        self.canvas
            .parent_node()
            .is_some_and(|p| p.is_same_node(Some(self.container.as_ref())))
    }

    fn detach(&mut self) {
        if let Err(e) = self.container.remove_child(&self.canvas) {
            log::warn!("[mount] canvas removal failed: {:?}", e);
        }
    }
}
