use std::{collections::BTreeMap, sync::Arc};

use crate::{
    events::bus::{EXPLODE, EventSink, REFORM, SceneEvent},
    foundation::{
        core::{Rgb, Vec2, Vec3},
        error::{FluxError, FluxResult},
        math::smoothstep,
    },
    mesh::{
        base::{BaseMesh, Vertex},
        normals::compute_normals,
    },
    noise::field::NoiseField,
    surface::shading::iridescent_color,
};

/// One noise layer: spatial frequency, time scale and blend weight.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Octave {
    pub frequency: f32,
    pub time_scale: f32,
    pub weight: f32,
}

/// Tunables for a [`DisplacementSurface`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SurfaceParams {
    /// Coarse, medium and fine layers. Weights must sum to 1.
    pub octaves: [Octave; 3],
    /// Distance at which pointer influence fades to zero.
    pub pointer_radius: f32,
    /// Displacement added directly under the pointer.
    pub pointer_strength: f32,
    /// Scale applied to the smoothed pointer before measuring distance.
    pub pointer_scale: f32,
    /// Rest intensity. Values above 2 self-intersect on most meshes.
    pub intensity: f32,
    /// Per-tick fraction by which intensity closes on its target.
    pub intensity_smoothing: f32,
    pub color_stops: [Rgb; 3],
    /// Target intensity to adopt when an event of that name arrives.
    pub event_intensity: BTreeMap<String, f32>,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        let intensity = 0.35;
        Self {
            octaves: [
                Octave {
                    frequency: 1.2,
                    time_scale: 0.3,
                    weight: 0.5,
                },
                Octave {
                    frequency: 2.8,
                    time_scale: 0.5,
                    weight: 0.3,
                },
                Octave {
                    frequency: 6.0,
                    time_scale: 0.8,
                    weight: 0.2,
                },
            ],
            pointer_radius: 2.0,
            pointer_strength: 0.3,
            pointer_scale: 0.5,
            intensity,
            intensity_smoothing: 0.05,
            color_stops: [
                Vec3::new(0.42, 0.25, 0.95),
                Vec3::new(0.12, 0.78, 0.92),
                Vec3::new(0.95, 0.35, 0.65),
            ],
            event_intensity: BTreeMap::from([
                (EXPLODE.to_owned(), 1.6),
                (REFORM.to_owned(), intensity),
            ]),
        }
    }
}

impl SurfaceParams {
    pub fn validate(&self) -> FluxResult<()> {
        let weight_sum: f32 = self.octaves.iter().map(|o| o.weight).sum();
        if (weight_sum - 1.0).abs() > 1e-4 {
            return Err(FluxError::configuration(format!(
                "octave weights must sum to 1.0 (got {weight_sum})"
            )));
        }
        for o in &self.octaves {
            if !(o.frequency.is_finite() && o.time_scale.is_finite() && o.weight.is_finite()) {
                return Err(FluxError::numeric("octave parameters must be finite"));
            }
        }
        if !(self.pointer_radius.is_finite() && self.pointer_radius > 0.0) {
            return Err(FluxError::numeric("pointer_radius must be finite and > 0"));
        }
        if !(self.pointer_strength.is_finite() && self.pointer_scale.is_finite()) {
            return Err(FluxError::numeric("pointer strength/scale must be finite"));
        }
        if !self.intensity.is_finite() {
            return Err(FluxError::numeric("intensity must be finite"));
        }
        if !(0.0..=1.0).contains(&self.intensity_smoothing) {
            return Err(FluxError::configuration(
                "intensity_smoothing must be in [0, 1]",
            ));
        }
        if !self.color_stops.iter().all(|c| c.is_finite()) {
            return Err(FluxError::numeric("color stops must be finite"));
        }
        if let Some((name, _)) = self.event_intensity.iter().find(|(_, v)| !v.is_finite()) {
            return Err(FluxError::numeric(format!(
                "event intensity for '{name}' must be finite"
            )));
        }
        if self.intensity > 2.0 {
            tracing::warn!(
                intensity = self.intensity,
                "rest intensity above 2.0 will self-intersect"
            );
        }
        Ok(())
    }
}

/// Per-frame state of one surface.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DisplacementState {
    pub time: f32,
    pub pointer: Vec2,
    pub intensity: f32,
    pub color_stops: [Rgb; 3],
}

/// Noise- and pointer-deformed copy of a [`BaseMesh`], rebuilt every tick.
///
/// All buffers are sized at construction; `tick` and `shade` do not allocate.
#[derive(Debug)]
pub struct DisplacementSurface {
    mesh: Arc<BaseMesh>,
    noise: NoiseField,
    params: SurfaceParams,
    state: DisplacementState,
    target_intensity: f32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    vertices: Vec<Vertex>,
    colors: Vec<Rgb>,
}

impl DisplacementSurface {
    #[tracing::instrument(skip_all, fields(mesh = mesh.name()))]
    pub fn new(mesh: Arc<BaseMesh>, noise: NoiseField, params: SurfaceParams) -> FluxResult<Self> {
        params.validate()?;
        let n = mesh.vertex_count();
        let vertices = mesh
            .positions()
            .iter()
            .zip(mesh.normals())
            .map(|(&position, &normal)| Vertex { position, normal })
            .collect();
        let state = DisplacementState {
            time: 0.0,
            pointer: Vec2::ZERO,
            intensity: params.intensity,
            color_stops: params.color_stops,
        };
        tracing::debug!(vertices = n, "displacement surface ready");
        Ok(Self {
            positions: mesh.positions().to_vec(),
            normals: mesh.normals().to_vec(),
            vertices,
            colors: vec![Rgb::ZERO; n],
            target_intensity: params.intensity,
            mesh,
            noise,
            params,
            state,
        })
    }

    pub fn mesh(&self) -> &BaseMesh {
        &self.mesh
    }

    pub fn params(&self) -> &SurfaceParams {
        &self.params
    }

    pub fn state(&self) -> &DisplacementState {
        &self.state
    }

    pub fn target_intensity(&self) -> f32 {
        self.target_intensity
    }

    /// Snap both current and target intensity.
    pub fn set_intensity(&mut self, intensity: f32) {
        self.state.intensity = intensity;
        self.target_intensity = intensity;
    }

    /// Ease toward `intensity` over the following ticks.
    pub fn set_target_intensity(&mut self, intensity: f32) {
        self.target_intensity = intensity;
    }

    pub fn set_color_stops(&mut self, stops: [Rgb; 3]) {
        self.state.color_stops = stops;
    }

    /// Vertex buffer produced by the latest tick (rest pose before the first one).
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Colors produced by the latest `shade`.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Scalar displacement along the rest normal for one rest position.
    pub fn displacement_at(&self, rest: Vec3) -> f32 {
        let time = self.state.time;
        let noise_sum: f32 = self
            .params
            .octaves
            .iter()
            .map(|o| o.weight * self.noise.evaluate(rest * o.frequency, time * o.time_scale))
            .sum();

        let focus = self.state.pointer * self.params.pointer_scale;
        let distance = rest.truncate().distance(focus);
        let influence =
            smoothstep(self.params.pointer_radius, 0.0, distance) * self.params.pointer_strength;

        (noise_sum + influence) * self.state.intensity
    }

    /// Advance to `time` with the given smoothed pointer and rebuild the vertex buffer.
    pub fn tick(&mut self, time: f32, pointer: Vec2) -> &[Vertex] {
        self.state.time = time;
        self.state.pointer = pointer;
        self.state.intensity +=
            (self.target_intensity - self.state.intensity) * self.params.intensity_smoothing;

        for i in 0..self.positions.len() {
            let rest = self.mesh.positions()[i];
            let d = self.displacement_at(rest);
            self.positions[i] = rest + self.mesh.normals()[i] * d;
        }

        compute_normals(&self.positions, self.mesh.indices(), &mut self.normals);
        for ((v, &p), &n) in self.vertices.iter_mut().zip(&self.positions).zip(&self.normals) {
            v.position = p;
            v.normal = n;
        }
        &self.vertices
    }

    /// Per-vertex iridescent colors for the current deformation as seen from `camera`.
    pub fn shade(&mut self, camera: Vec3) -> &[Rgb] {
        let stops = self.state.color_stops;
        let time = self.state.time;
        for ((c, v), rest) in self
            .colors
            .iter_mut()
            .zip(&self.vertices)
            .zip(self.mesh.positions())
        {
            *c = iridescent_color(&stops, *rest, v.position, v.normal, camera, time);
        }
        &self.colors
    }
}

impl EventSink for DisplacementSurface {
    fn on_event(&mut self, event: &SceneEvent) {
        if let Some(&target) = self.params.event_intensity.get(event.name()) {
            tracing::debug!(
                event = event.name(),
                target,
                mesh = self.mesh.name(),
                "surface intensity retarget"
            );
            self.target_intensity = target;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/displacement.rs"]
mod tests;
