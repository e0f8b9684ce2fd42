use super::*;

fn grid() -> impl Iterator<Item = (Vec3, f32)> {
    (0..9).flat_map(|a| {
        (0..9).map(move |b| {
            let p = Vec3::new(a as f32 * 0.37 - 1.5, b as f32 * 0.41 - 1.7, (a * b) as f32 * 0.05);
            (p, (a + b) as f32 * 0.13)
        })
    })
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let field = NoiseField::default();
    let other = NoiseField::default();
    for (p, t) in grid() {
        assert_eq!(field.evaluate(p, t).to_bits(), field.evaluate(p, t).to_bits());
        assert_eq!(field.evaluate(p, t).to_bits(), other.evaluate(p, t).to_bits());
    }
}

#[test]
fn output_is_bounded() {
    let field = NoiseField::new(7);
    for (p, t) in grid() {
        let v = field.evaluate(p * 3.0, t * 5.0);
        assert!((-1.0..=1.0).contains(&v), "{v} out of range at {p:?}");
    }
}

#[test]
fn field_is_not_constant() {
    let field = NoiseField::default();
    let values: Vec<f32> = grid().map(|(p, t)| field.evaluate(p, t)).collect();
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    assert!(max - min > 0.2);
}

#[test]
fn small_steps_give_small_changes() {
    let field = NoiseField::default();
    for (p, t) in grid() {
        let a = field.evaluate(p, t);
        let b = field.evaluate(p + Vec3::splat(1e-3), t);
        assert!((a - b).abs() < 0.05, "jump {a} -> {b} at {p:?}");
    }
}

#[test]
fn time_scrolls_along_z() {
    let field = NoiseField::default();
    let p = Vec3::new(0.3, -0.2, 0.1);
    assert_eq!(
        field.evaluate(p, 0.75),
        field.evaluate(p + Vec3::new(0.0, 0.0, 0.75), 0.0)
    );
}

#[test]
fn seeds_change_the_field() {
    let a = NoiseField::new(1);
    let b = NoiseField::new(2);
    let differs = grid().any(|(p, t)| a.evaluate(p, t) != b.evaluate(p, t));
    assert!(differs);
}

fn largest_step_along_line(field: &NoiseField, h: f32) -> f32 {
    let n = (8.0 / h).round() as u32;
    let mut prev: Option<f32> = None;
    let mut largest = 0.0f32;
    for i in 0..=n {
        let s = -4.0 + i as f32 * h;
        let v = field.evaluate(Vec3::new(s, 0.37 * s + 0.11, -0.23 * s + 0.7), 0.0);
        if let Some(p) = prev {
            largest = largest.max((v - p).abs());
        }
        prev = Some(v);
    }
    largest
}

#[test]
fn field_is_continuous_across_simplex_boundaries() {
    let field = NoiseField::default();
    let coarse = largest_step_along_line(&field, 1e-3);
    let fine = largest_step_along_line(&field, 1e-4);
    assert!(coarse > 0.0);
    assert!(fine < coarse * 0.2, "step {fine} at h=1e-4 vs {coarse} at h=1e-3");
}
