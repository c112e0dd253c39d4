// Host-side tests for the web crate's pure sizing helpers.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn constants_are_within_reasonable_bounds() {
    assert!(MAX_DEVICE_PIXEL_RATIO >= 1.0);
    assert!(INITIAL_DRAW_CAPACITY > 0);
    assert!(BLOOM_DOWNSCALE >= 1);
    assert_eq!(POINT_SPRITE_VERTICES, 6);
    assert!(CLEAR_RGBA.iter().all(|c| (0.0..=1.0).contains(c)));
}

#[test]
fn backing_size_scales_by_pixel_ratio() {
    assert_eq!(backing_size(400.0, 300.0, 1.0), (400, 300));
    assert_eq!(backing_size(400.0, 300.0, 1.5), (600, 450));
}

#[test]
fn backing_size_caps_pixel_ratio() {
    assert_eq!(backing_size(100.0, 50.0, 3.0), (200, 100));
}

#[test]
fn backing_size_never_collapses_to_zero() {
    assert_eq!(backing_size(0.0, 0.0, 2.0), (1, 1));
    assert_eq!(backing_size(-5.0, 10.0, 1.0), (1, 10));
    assert_eq!(backing_size(10.0, 10.0, f64::NAN), (10, 10));
}

#[test]
fn bloom_targets_are_downscaled_but_non_empty() {
    assert_eq!(bloom_size(800, 600), (400, 300));
    assert_eq!(bloom_size(1, 1), (1, 1));
    assert_eq!(bloom_size(0, 3), (1, 1));
}

#[test]
fn align_rounds_up_to_multiple() {
    assert_eq!(align_to(80, 256), 256);
    assert_eq!(align_to(256, 256), 256);
    assert_eq!(align_to(257, 256), 512);
    assert_eq!(align_to(0, 256), 0);
}
