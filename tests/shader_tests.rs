// Host-side checks on the WGSL sources the renderer embeds.

static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

fn fragment_body<'a>(source: &'a str, name: &str) -> &'a str {
    let start = source
        .find(&format!("fn {name}("))
        .unwrap_or_else(|| panic!("{name} missing"));
    let rest = &source[start..];
    let end = rest.find("\n}").expect("unterminated function");
    &rest[..end]
}

#[test]
fn composite_keeps_colour_within_alpha() {
    let body = fragment_body(POST_WGSL, "fs_composite");
    // The canvas is configured for premultiplied alpha, so rgb <= alpha.
    assert!(body.contains("min(base.rgb + glow, vec3<f32>(alpha))"));
    assert!(!body.contains("vec3<f32>(1.0)"));
    let alpha_at = body.find("let alpha").expect("alpha computed");
    let rgb_at = body.find("let rgb").expect("rgb computed");
    assert!(alpha_at < rgb_at);
}

#[test]
fn composite_alpha_covers_the_brightest_glow_channel() {
    let body = fragment_body(POST_WGSL, "fs_composite");
    assert!(body.contains("max(glow.r, max(glow.g, glow.b))"));
}
