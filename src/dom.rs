use crate::constants::{backing_size, CANVAS_STYLE};
use anyhow::anyhow;
use viz_core::SurfaceSize;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Create a canvas filling `container` and append it.
pub fn create_canvas(
    document: &web::Document,
    container: &web::HtmlElement,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow!("create canvas: {:?}", e))?
        .dyn_into()
        .map_err(|e| anyhow!("{:?}", e))?;
    canvas
        .set_attribute("style", CANVAS_STYLE)
        .map_err(|e| anyhow!("{:?}", e))?;
    container
        .append_child(&canvas)
        .map_err(|e| anyhow!("append canvas: {:?}", e))?;
    Ok(canvas)
}

/// Match the canvas backing store to its CSS box and return the new size.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> SurfaceSize {
    let dpr = web::window().map_or(1.0, |w| w.device_pixel_ratio());
    let rect = canvas.get_bounding_client_rect();
    let (w, h) = backing_size(rect.width(), rect.height(), dpr);
    if canvas.width() != w {
        canvas.set_width(w);
    }
    if canvas.height() != h {
        canvas.set_height(h);
    }
    SurfaceSize::new(w, h)
}
