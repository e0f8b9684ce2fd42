use crate::foundation::core::{Rgb, Vec3};

const FRESNEL_STRENGTH: f32 = 0.3;
const SHIMMER_AMPLITUDE: f32 = 0.1;

/// Iridescent surface color for one sample point.
///
/// `rest_position` drives the stop blend and shimmer so the pattern sticks to the surface while it
/// deforms; `position`/`normal` are the deformed values used for the view-angle edge glow.
/// Every channel of the result is clamped to `[0, 1]`.
pub fn iridescent_color(
    stops: &[Rgb; 3],
    rest_position: Vec3,
    position: Vec3,
    normal: Vec3,
    camera: Vec3,
    time: f32,
) -> Rgb {
    let p = rest_position;
    let mix_a = (p.x * 3.0 + time).sin() * 0.5 + 0.5;
    let mix_b = (p.y * 3.0 + time * 0.7).cos() * 0.5 + 0.5;
    let base = stops[0].lerp(stops[1], mix_a).lerp(stops[2], mix_b);

    let view = (camera - position).try_normalize().unwrap_or(Vec3::Z);
    let fresnel = (1.0 - view.dot(normal).max(0.0)).powi(3);

    let shimmer = 1.0
        + SHIMMER_AMPLITUDE * (p.x * 10.0 + time * 2.0).sin() * (p.y * 10.0 - time * 1.5).sin();

    ((base + Vec3::splat(fresnel * FRESNEL_STRENGTH)) * shimmer).clamp(Vec3::ZERO, Vec3::ONE)
}

#[cfg(test)]
#[path = "../../tests/unit/surface/shading.rs"]
mod tests;
