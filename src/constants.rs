// Browser-side sizing and render-target constants.
//
// Kept free of web and GPU types so the host test suite can include this
// file directly.

// Canvas element created inside the host container
pub const CANVAS_STYLE: &str = "display:block;width:100%;height:100%;";

// Backing store is capped to keep fill-rate sane on high-density screens
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

// Transparent clear so the page shows through around the scene
pub const CLEAR_RGBA: [f64; 4] = [0.0, 0.0, 0.0, 0.0];

// Per-draw uniform slots allocated up front; the buffer grows on demand
pub const INITIAL_DRAW_CAPACITY: usize = 64;

// Bloom targets are rendered at 1/N of the surface size
pub const BLOOM_DOWNSCALE: u32 = 2;

// Vertices emitted per point sprite (two triangles)
pub const POINT_SPRITE_VERTICES: u32 = 6;

/// Canvas backing size for a CSS box at the given device pixel ratio.
/// Never returns a zero dimension.
#[inline]
pub fn backing_size(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> (u32, u32) {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_DEVICE_PIXEL_RATIO)
    } else {
        1.0
    };
    let w = (css_width.max(0.0) * dpr).round() as u32;
    let h = (css_height.max(0.0) * dpr).round() as u32;
    (w.max(1), h.max(1))
}

#[inline]
pub fn bloom_size(width: u32, height: u32) -> (u32, u32) {
    (
        (width.max(1) / BLOOM_DOWNSCALE).max(1),
        (height.max(1) / BLOOM_DOWNSCALE).max(1),
    )
}

/// Round `value` up to a multiple of `alignment` (a power of two).
#[inline]
pub fn align_to(value: u64, alignment: u64) -> u64 {
    let a = alignment.max(1);
    value.div_ceil(a) * a
}
