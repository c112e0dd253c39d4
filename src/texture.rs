use crate::render::GpuRenderer;
use std::cell::RefCell;
use std::rc::Weak;
use viz_core::{SceneInstance, TextureError, TextureOutcome, TextureTicket};
use wasm_bindgen_futures::spawn_local;

/// Resolve `url` against the page location so relative asset paths work.
fn resolve_url(url: &str) -> Result<reqwest::Url, TextureError> {
    let href = web_sys::window()
        .and_then(|w| w.location().href().ok())
        .ok_or_else(|| TextureError::Fetch("no page location".into()))?;
    let base = reqwest::Url::parse(&href).map_err(|e| TextureError::Fetch(e.to_string()))?;
    base.join(url).map_err(|e| TextureError::Fetch(e.to_string()))
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, TextureError> {
    let fetch = |e: reqwest::Error| TextureError::Fetch(e.to_string());
    let url = resolve_url(url)?;
    let bytes = reqwest::get(url)
        .await
        .map_err(fetch)?
        .error_for_status()
        .map_err(fetch)?
        .bytes()
        .await
        .map_err(fetch)?;
    Ok(bytes.to_vec())
}

/// Fetch and decode the texture for `ticket`, then hand it to the scene if the
/// scene is still alive.
pub fn spawn_load(scene: Weak<RefCell<SceneInstance<GpuRenderer>>>, ticket: TextureTicket) {
    spawn_local(async move {
        let result = match fetch_bytes(&ticket.url).await {
            Ok(bytes) => viz_core::texture::decode(&bytes),
            Err(e) => Err(e),
        };
        let Some(scene) = scene.upgrade() else {
            log::debug!("[texture] {} finished after teardown", ticket.url);
            return;
        };
        let outcome = scene.borrow_mut().apply_texture(&ticket, result);
        match outcome {
            TextureOutcome::Applied => log::info!("[texture] {} applied", ticket.url),
            TextureOutcome::Degraded | TextureOutcome::Stale => {}
        }
    });
}
