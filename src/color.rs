//! Dye colors for pointers.

use glam::Vec3;
use rand::Rng;

/// Scale applied to generated dye so repeated splats do not saturate the field.
pub const DYE_INTENSITY: f32 = 0.15;

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match (i as i32).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Vec3::new(r, g, b)
}

/// Random fully saturated hue, scaled down to [`DYE_INTENSITY`].
pub fn generate_color<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    hsv_to_rgb(rng.r#gen::<f32>(), 1.0, 1.0) * DYE_INTENSITY
}

/// Wraps `value` into `[min, max)`.
pub fn wrap(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range == 0.0 {
        return min;
    }
    (value - min).rem_euclid(range) + min
}
