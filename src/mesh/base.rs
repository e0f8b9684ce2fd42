use crate::foundation::{
    core::Vec3,
    error::{FluxError, FluxResult},
};
use crate::mesh::normals::compute_normals;

/// One renderable vertex: position plus lighting normal.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Immutable named triangle mesh shared by surfaces and morph sets.
#[derive(Clone, Debug)]
pub struct BaseMesh {
    name: String,
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    normals: Vec<Vec3>,
}

impl BaseMesh {
    /// Validate and freeze a mesh. Normals are derived once from the triangle list.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
    ) -> FluxResult<Self> {
        let name = name.into();
        if positions.is_empty() {
            return Err(FluxError::configuration(format!(
                "mesh '{name}' has no vertices"
            )));
        }
        if u32::try_from(positions.len()).is_err() {
            return Err(FluxError::configuration(format!(
                "mesh '{name}' exceeds u32 vertex indexing"
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(FluxError::configuration(format!(
                "mesh '{name}' index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(FluxError::configuration(format!(
                "mesh '{name}' index {bad} out of range for {} vertices",
                positions.len()
            )));
        }
        if !positions.iter().all(|p| p.is_finite()) {
            return Err(FluxError::numeric(format!(
                "mesh '{name}' has non-finite positions"
            )));
        }

        let mut normals = vec![Vec3::ZERO; positions.len()];
        compute_normals(&positions, &indices, &mut normals);

        Ok(Self {
            name,
            positions,
            indices,
            normals,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Rest-pose normals, one per vertex.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
