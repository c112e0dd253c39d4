use glam::Vec3;

/// Convert HSL (all components in 0..1, hue wraps) to linear-ish RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);
    if s == 0.0 {
        return Vec3::splat(l);
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

#[inline]
fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Hue of an RGB color in 0..1 (0 for greys).
pub fn rgb_hue(rgb: Vec3) -> f32 {
    let max = rgb.max_element();
    let min = rgb.min_element();
    let d = max - min;
    if d <= f32::EPSILON {
        return 0.0;
    }
    let h = if max == rgb.x {
        ((rgb.y - rgb.z) / d).rem_euclid(6.0)
    } else if max == rgb.y {
        (rgb.z - rgb.x) / d + 2.0
    } else {
        (rgb.x - rgb.y) / d + 4.0
    };
    (h / 6.0).rem_euclid(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn primary_hues() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn hue_wraps() {
        assert!(close(hsl_to_rgb(1.25, 0.6, 0.4), hsl_to_rgb(0.25, 0.6, 0.4)));
        assert!(close(hsl_to_rgb(-0.75, 0.6, 0.4), hsl_to_rgb(0.25, 0.6, 0.4)));
    }

    #[test]
    fn zero_saturation_is_grey() {
        assert!(close(hsl_to_rgb(0.3, 0.0, 0.25), Vec3::splat(0.25)));
    }

    #[test]
    fn hue_recovers_from_rgb() {
        for h in [0.05_f32, 0.3, 0.55, 0.8] {
            let rgb = hsl_to_rgb(h, 0.7, 0.6);
            assert!((rgb_hue(rgb) - h).abs() < 1e-4, "hue {h}");
        }
    }
}
