use std::sync::Arc;

use crate::{
    events::bus::{EXPLODE, EventSink, REFORM, SceneEvent},
    foundation::{
        core::Vec3,
        error::{FluxError, FluxResult},
    },
    mesh::{
        base::{BaseMesh, Vertex},
        normals::compute_normals,
    },
};

const SPREAD_SNAP: f32 = 1e-4;

/// Tunables for a [`MorphScheduler`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MorphParams {
    /// Seconds spent blending from one mesh to the next.
    pub cycle_duration: f32,
    /// Outward scale added while exploded (`0.6` means 160% size).
    pub explode_spread: f32,
    /// Per-tick fraction by which spread closes on its target.
    pub spread_smoothing: f32,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self {
            cycle_duration: 3.0,
            explode_spread: 0.6,
            spread_smoothing: 0.08,
        }
    }
}

/// Which two meshes are being blended and how far along.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct MorphState {
    pub cycle_index: usize,
    pub next_index: usize,
    /// In `[0, 1)`.
    pub mix_factor: f32,
}

/// Cycles through an ordered set of meshes, blending each into the next.
///
/// Meshes may have different vertex counts: output slot `i` reads slot `i % count` of each
/// source. The output takes its slot count and triangle list from the first mesh.
#[derive(Debug)]
pub struct MorphScheduler {
    meshes: Vec<Arc<BaseMesh>>,
    params: MorphParams,
    spread: f32,
    target_spread: f32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    vertices: Vec<Vertex>,
}

impl MorphScheduler {
    #[tracing::instrument(skip_all, fields(meshes = meshes.len()))]
    pub fn new(meshes: Vec<Arc<BaseMesh>>, params: MorphParams) -> FluxResult<Self> {
        let Some(host) = meshes.first() else {
            return Err(FluxError::numeric("morph set needs at least one mesh"));
        };
        if !(params.cycle_duration.is_finite() && params.cycle_duration > 0.0) {
            return Err(FluxError::numeric(format!(
                "cycle_duration must be finite and > 0 (got {})",
                params.cycle_duration
            )));
        }
        if !params.explode_spread.is_finite() {
            return Err(FluxError::numeric("explode_spread must be finite"));
        }
        if !(0.0..=1.0).contains(&params.spread_smoothing) {
            return Err(FluxError::configuration(
                "spread_smoothing must be in [0, 1]",
            ));
        }

        let n = host.vertex_count();
        let vertices = host
            .positions()
            .iter()
            .zip(host.normals())
            .map(|(&position, &normal)| Vertex { position, normal })
            .collect();
        tracing::debug!(
            slots = n,
            shapes = ?meshes.iter().map(|m| m.name()).collect::<Vec<_>>(),
            "morph set ready"
        );
        Ok(Self {
            positions: host.positions().to_vec(),
            normals: host.normals().to_vec(),
            vertices,
            meshes,
            params,
            spread: 0.0,
            target_spread: 0.0,
        })
    }

    pub fn meshes(&self) -> &[Arc<BaseMesh>] {
        &self.meshes
    }

    pub fn params(&self) -> &MorphParams {
        &self.params
    }

    pub fn spread(&self) -> f32 {
        self.spread
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Cycle position at `global_time`. Negative times wrap.
    pub fn state_at(&self, global_time: f64) -> MorphState {
        let n = self.meshes.len() as i64;
        let cycle = f64::from(self.params.cycle_duration);
        let cycle_index = (global_time / cycle).floor() as i64;
        let cycle_index = cycle_index.rem_euclid(n) as usize;
        let next_index = (cycle_index + 1) % self.meshes.len();
        let mix_factor = (global_time.rem_euclid(cycle) / cycle) as f32;
        MorphState {
            cycle_index,
            next_index,
            mix_factor: mix_factor.min(1.0),
        }
    }

    /// Rebuild the blended buffer for `global_time`.
    pub fn tick(&mut self, global_time: f64) -> &[Vertex] {
        let MorphState {
            cycle_index,
            next_index,
            mix_factor,
        } = self.state_at(global_time);

        self.spread += (self.target_spread - self.spread) * self.params.spread_smoothing;
        if (self.target_spread - self.spread).abs() < SPREAD_SNAP {
            self.spread = self.target_spread;
        }
        let scale = 1.0 + self.spread;

        let from = self.meshes[cycle_index].positions();
        let to = self.meshes[next_index].positions();
        for (i, out) in self.positions.iter_mut().enumerate() {
            let a = from[i % from.len()];
            let b = to[i % to.len()];
            *out = a.lerp(b, mix_factor) * scale;
        }

        compute_normals(&self.positions, self.meshes[0].indices(), &mut self.normals);
        for ((v, &p), &n) in self.vertices.iter_mut().zip(&self.positions).zip(&self.normals) {
            v.position = p;
            v.normal = n;
        }
        &self.vertices
    }
}

impl EventSink for MorphScheduler {
    fn on_event(&mut self, event: &SceneEvent) {
        match event.name() {
            EXPLODE => self.target_spread = self.params.explode_spread,
            REFORM => self.target_spread = 0.0,
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/morph/scheduler.rs"]
mod tests;
