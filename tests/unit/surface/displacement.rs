use super::*;
use crate::mesh::shapes::Shape;

fn sphere() -> Arc<BaseMesh> {
    Arc::new(
        Shape::Sphere {
            radius: 1.0,
            width_segments: 16,
            height_segments: 8,
        }
        .build("sphere")
        .unwrap(),
    )
}

fn surface() -> DisplacementSurface {
    DisplacementSurface::new(sphere(), NoiseField::default(), SurfaceParams::default()).unwrap()
}

#[test]
fn default_weights_sum_to_one() {
    let sum: f32 = SurfaceParams::default().octaves.iter().map(|o| o.weight).sum();
    assert!((sum - 1.0).abs() < 1e-6);
}

#[test]
fn zero_intensity_reproduces_base_mesh_exactly() {
    let mut s = surface();
    s.set_intensity(0.0);
    for frame in 0..5 {
        let t = frame as f32 * 0.37;
        let verts = s.tick(t, Vec2::new(0.3, -0.2)).to_vec();
        for (v, rest) in verts.iter().zip(s.mesh().positions()) {
            assert_eq!(v.position, *rest);
        }
    }
}

#[test]
fn output_keeps_topology_and_is_deterministic() {
    let mut a = surface();
    let mut b = surface();
    let va = a.tick(1.25, Vec2::new(0.5, 0.5)).to_vec();
    let vb = b.tick(1.25, Vec2::new(0.5, 0.5)).to_vec();
    assert_eq!(va.len(), a.mesh().vertex_count());
    assert_eq!(va, vb);
    assert!(
        va.iter()
            .zip(a.mesh().positions())
            .any(|(v, rest)| v.position != *rest)
    );
}

#[test]
fn pointer_adds_capped_influence_at_its_focus() {
    let mut s = surface();
    s.set_intensity(1.0);
    let rest = Vec3::new(0.25, 0.5, 0.8);

    s.tick(0.5, rest.truncate() * 2.0);
    let near = s.displacement_at(rest);
    s.tick(0.5, Vec2::new(40.0, 40.0));
    let far = s.displacement_at(rest);

    assert!((near - far - 0.3).abs() < 1e-5, "near={near} far={far}");
}

#[test]
fn explode_event_eases_intensity_toward_target() {
    let mut s = surface();
    let rest = s.state().intensity;
    s.on_event(&SceneEvent::new(EXPLODE));
    assert_eq!(s.target_intensity(), 1.6);

    s.tick(0.0, Vec2::ZERO);
    let after_one = s.state().intensity;
    assert!(after_one > rest && after_one < 1.6);
    assert!((after_one - (rest + (1.6 - rest) * 0.05)).abs() < 1e-6);

    s.on_event(&SceneEvent::new(REFORM));
    assert_eq!(s.target_intensity(), rest);
    s.on_event(&SceneEvent::new("unrelated"));
    assert_eq!(s.target_intensity(), rest);
}

#[test]
fn invalid_weights_are_rejected() {
    let mut params = SurfaceParams::default();
    params.octaves[2].weight = 0.5;
    let err = DisplacementSurface::new(sphere(), NoiseField::default(), params).unwrap_err();
    assert!(matches!(err, FluxError::Configuration(_)));
}

#[test]
fn shade_yields_one_clamped_color_per_vertex() {
    let mut s = surface();
    s.tick(0.8, Vec2::ZERO);
    let colors = s.shade(Vec3::new(0.0, 0.0, 4.0)).to_vec();
    assert_eq!(colors.len(), s.mesh().vertex_count());
    for c in colors {
        assert!(c.cmpge(Vec3::ZERO).all() && c.cmple(Vec3::ONE).all());
    }
}
