use std::f32::consts::{PI, TAU};

use crate::foundation::{
    core::Vec3,
    error::{FluxError, FluxResult},
};
use crate::mesh::base::BaseMesh;

/// Built-in primitive meshes a scene can be assembled from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Sphere {
        radius: f32,
        #[serde(default = "default_segments")]
        width_segments: u32,
        #[serde(default = "default_rings")]
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        #[serde(default = "default_rings")]
        radial_segments: u32,
        #[serde(default = "default_segments")]
        tubular_segments: u32,
    },
    Cube {
        size: f32,
        #[serde(default = "default_cube_segments")]
        segments: u32,
    },
    Octahedron {
        radius: f32,
    },
}

fn default_segments() -> u32 {
    32
}

fn default_rings() -> u32 {
    16
}

fn default_cube_segments() -> u32 {
    4
}

impl Shape {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Torus { .. } => "torus",
            Self::Cube { .. } => "cube",
            Self::Octahedron { .. } => "octahedron",
        }
    }

    pub fn validate(&self) -> FluxResult<()> {
        fn positive(name: &str, v: f32) -> FluxResult<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(FluxError::configuration(format!("{name} must be finite and > 0")))
            }
        }
        fn at_least(name: &str, v: u32, min: u32) -> FluxResult<()> {
            if v >= min {
                Ok(())
            } else {
                Err(FluxError::configuration(format!("{name} must be >= {min}")))
            }
        }

        match *self {
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => {
                positive("sphere.radius", radius)?;
                at_least("sphere.width_segments", width_segments, 3)?;
                at_least("sphere.height_segments", height_segments, 2)
            }
            Self::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => {
                positive("torus.radius", radius)?;
                positive("torus.tube", tube)?;
                at_least("torus.radial_segments", radial_segments, 3)?;
                at_least("torus.tubular_segments", tubular_segments, 3)
            }
            Self::Cube { size, segments } => {
                positive("cube.size", size)?;
                at_least("cube.segments", segments, 1)
            }
            Self::Octahedron { radius } => positive("octahedron.radius", radius),
        }
    }

    /// Tessellate into a [`BaseMesh`] called `name`.
    pub fn build(&self, name: impl Into<String>) -> FluxResult<BaseMesh> {
        self.validate()?;
        let (positions, indices) = match *self {
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere(radius, width_segments, height_segments),
            Self::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => torus(radius, tube, radial_segments, tubular_segments),
            Self::Cube { size, segments } => cube(size, segments),
            Self::Octahedron { radius } => octahedron(radius),
        };
        BaseMesh::new(name, positions, indices)
    }
}

fn grid_indices(cols: u32, rows: u32, flip: bool, out: &mut Vec<u32>) {
    let stride = cols + 1;
    for y in 0..rows {
        for x in 0..cols {
            let a = y * stride + x;
            let b = (y + 1) * stride + x;
            let c = b + 1;
            let d = a + 1;
            if flip {
                out.extend_from_slice(&[a, d, b, b, d, c]);
            } else {
                out.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
    }
}

fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> (Vec<Vec3>, Vec<u32>) {
    let mut positions = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            positions.push(Vec3::new(
                -radius * (u * TAU).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * TAU).sin() * (v * PI).sin(),
            ));
        }
    }
    let mut indices = Vec::new();
    grid_indices(width_segments, height_segments, false, &mut indices);
    (positions, indices)
}

fn torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> (Vec<Vec3>, Vec<u32>) {
    let mut positions =
        Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);
    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            positions.push(Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            ));
        }
    }
    let mut indices = Vec::new();
    grid_indices(tubular_segments, radial_segments, true, &mut indices);
    (positions, indices)
}

fn cube(size: f32, segments: u32) -> (Vec<Vec3>, Vec<u32>) {
    let half = size * 0.5;
    // (normal, u axis, v axis); u x v points along the normal.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut positions = Vec::new();
    let mut indices = Vec::new();
    for (normal, u_axis, v_axis) in faces {
        let base = positions.len() as u32;
        for iy in 0..=segments {
            let v = iy as f32 / segments as f32 * 2.0 - 1.0;
            for ix in 0..=segments {
                let u = ix as f32 / segments as f32 * 2.0 - 1.0;
                positions.push((normal + u_axis * u + v_axis * v) * half);
            }
        }
        let stride = segments + 1;
        for y in 0..segments {
            for x in 0..segments {
                let a = base + y * stride + x;
                let b = a + 1;
                let c = a + stride + 1;
                let d = a + stride;
                indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }
    }
    (positions, indices)
}

fn octahedron(radius: f32) -> (Vec<Vec3>, Vec<u32>) {
    let positions = vec![
        Vec3::X * radius,
        Vec3::NEG_X * radius,
        Vec3::Y * radius,
        Vec3::NEG_Y * radius,
        Vec3::Z * radius,
        Vec3::NEG_Z * radius,
    ];
    let indices = vec![
        0, 2, 4, 0, 4, 3, 0, 3, 5, 0, 5, 2, 1, 2, 5, 1, 5, 3, 1, 3, 4, 1, 4, 2,
    ];
    (positions, indices)
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/shapes.rs"]
mod tests;
