use std::sync::Arc;

use smallvec::SmallVec;

use crate::{
    animation::target::{PropertyBag, TargetRegistry},
    events::bus::{EventBus, EventSink},
    foundation::{
        core::{Rgb, Vec2, Vec3, Viewport},
        error::FluxResult,
    },
    mesh::base::Vertex,
    morph::scheduler::MorphScheduler,
    noise::field::NoiseField,
    pointer::tracker::PointerTracker,
    scene::config::SceneConfig,
    surface::displacement::DisplacementSurface,
    transition::controller::{
        PlayCallbacks, TransitionController, TransitionHandle, TransitionReport,
    },
};

/// Host-supplied per-frame input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Seconds since the scene was mounted.
    pub elapsed: f64,
    pub camera: Vec3,
}

#[derive(Debug)]
pub struct SurfaceSlot {
    name: String,
    surface: DisplacementSurface,
}

impl SurfaceSlot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surface(&self) -> &DisplacementSurface {
        &self.surface
    }

    pub fn vertices(&self) -> &[Vertex] {
        self.surface.vertices()
    }

    pub fn colors(&self) -> &[Rgb] {
        self.surface.colors()
    }
}

#[derive(Debug)]
pub struct MorphSlot {
    name: String,
    morph: MorphScheduler,
}

impl MorphSlot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn morph(&self) -> &MorphScheduler {
        &self.morph
    }

    pub fn vertices(&self) -> &[Vertex] {
        self.morph.vertices()
    }
}

/// Result of one [`Scene::frame`], borrowing the scene's buffers.
#[derive(Debug)]
pub struct Frame<'a> {
    pub index: u64,
    /// Time advanced by transitions this frame.
    pub dt: f64,
    pub pointer: Vec2,
    /// Events delivered at the end of the frame.
    pub events: usize,
    pub surfaces: &'a [SurfaceSlot],
    pub morphs: &'a [MorphSlot],
}

/// A mounted scene: pointer, surfaces, morph sets and transitions driven by one frame call.
#[derive(Debug)]
pub struct Scene {
    pointer: PointerTracker,
    surfaces: Vec<SurfaceSlot>,
    morphs: Vec<MorphSlot>,
    targets: TargetRegistry,
    events: EventBus,
    controller: TransitionController,
    last_elapsed: f64,
    frame_index: u64,
}

impl Scene {
    #[tracing::instrument(skip_all)]
    pub fn from_config(config: &SceneConfig) -> FluxResult<Self> {
        config.validate()?;

        let mut pointer = PointerTracker::new(config.viewport, config.pointer_smoothing)?;
        pointer.start();

        let surfaces = config
            .surfaces
            .iter()
            .map(|s| {
                let mesh = Arc::new(s.shape.build(s.name.clone())?);
                let noise = s.seed.map(NoiseField::new).unwrap_or_default();
                Ok(SurfaceSlot {
                    name: s.name.clone(),
                    surface: DisplacementSurface::new(mesh, noise, s.params.clone())?,
                })
            })
            .collect::<FluxResult<Vec<_>>>()?;

        let morphs = config
            .morphs
            .iter()
            .map(|m| {
                let meshes = m
                    .shapes
                    .iter()
                    .enumerate()
                    .map(|(i, shape)| {
                        shape
                            .build(format!("{}/{i}:{}", m.name, shape.kind_name()))
                            .map(Arc::new)
                    })
                    .collect::<FluxResult<Vec<_>>>()?;
                Ok(MorphSlot {
                    name: m.name.clone(),
                    morph: MorphScheduler::new(meshes, m.params.clone())?,
                })
            })
            .collect::<FluxResult<Vec<_>>>()?;

        let mut targets = TargetRegistry::new();
        for (name, props) in &config.targets {
            let bag: PropertyBag = props.iter().map(|(k, v)| (k, *v)).collect();
            targets.insert(name.clone(), bag);
        }

        let mut controller = TransitionController::new();
        for spec in &config.scripts {
            controller.register(spec.clone().into())?;
        }

        tracing::debug!(
            surfaces = surfaces.len(),
            morphs = morphs.len(),
            targets = config.targets.len(),
            scripts = config.scripts.len(),
            "scene mounted"
        );
        Ok(Self {
            pointer,
            surfaces,
            morphs,
            targets,
            events: EventBus::new(),
            controller,
            last_elapsed: 0.0,
            frame_index: 0,
        })
    }

    /// Feed a raw pointer-move event in client pixels.
    pub fn on_pointer_move(&mut self, client_x: f32, client_y: f32) -> bool {
        self.pointer.on_pointer_move(client_x, client_y)
    }

    pub fn resize(&mut self, viewport: Viewport) -> FluxResult<()> {
        self.pointer.resize(viewport)
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut PointerTracker {
        &mut self.pointer
    }

    pub fn surfaces(&self) -> &[SurfaceSlot] {
        &self.surfaces
    }

    pub fn surface(&self, name: &str) -> Option<&DisplacementSurface> {
        self.surfaces
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.surface)
    }

    pub fn surface_mut(&mut self, name: &str) -> Option<&mut DisplacementSurface> {
        self.surfaces
            .iter_mut()
            .find(|s| s.name == name)
            .map(|s| &mut s.surface)
    }

    pub fn morphs(&self) -> &[MorphSlot] {
        &self.morphs
    }

    pub fn morph(&self, name: &str) -> Option<&MorphScheduler> {
        self.morphs.iter().find(|m| m.name == name).map(|m| &m.morph)
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut TargetRegistry {
        &mut self.targets
    }

    /// Bus for host listeners; scene sinks are attached automatically.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn controller(&self) -> &TransitionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut TransitionController {
        &mut self.controller
    }

    pub fn play(&mut self, script: &str, callbacks: PlayCallbacks) -> FluxResult<TransitionHandle> {
        self.controller.play(script, callbacks)
    }

    pub fn cancel(&mut self, handle: TransitionHandle) -> FluxResult<()> {
        self.controller.cancel(handle)
    }

    pub fn complete_now(&mut self, handle: TransitionHandle) -> FluxResult<()> {
        self.controller.complete_now(handle, &mut self.events)
    }

    pub fn drain_reports(&mut self) -> Vec<TransitionReport> {
        self.controller.drain_reports()
    }

    /// Advance one frame: pointer, then surfaces and morph sets, then transitions, then events.
    ///
    /// A non-finite `elapsed` keeps surfaces at the previous time and completes active
    /// transitions instantly.
    pub fn frame(&mut self, input: FrameInput) -> Frame<'_> {
        let elapsed = if input.elapsed.is_finite() {
            input.elapsed
        } else {
            tracing::warn!(elapsed = input.elapsed, "non-finite frame time");
            self.last_elapsed
        };
        let dt = if input.elapsed.is_finite() {
            elapsed - self.last_elapsed
        } else {
            f64::NAN
        };
        self.last_elapsed = elapsed;

        let pointer = self.pointer.tick();
        for slot in &mut self.surfaces {
            slot.surface.tick(elapsed as f32, pointer);
            slot.surface.shade(input.camera);
        }
        for slot in &mut self.morphs {
            slot.morph.tick(elapsed);
        }

        self.controller.tick(dt, &mut self.targets, &mut self.events);

        let mut sinks: SmallVec<[&mut dyn EventSink; 8]> = SmallVec::new();
        sinks.extend(
            self.surfaces
                .iter_mut()
                .map(|s| &mut s.surface as &mut dyn EventSink),
        );
        sinks.extend(
            self.morphs
                .iter_mut()
                .map(|m| &mut m.morph as &mut dyn EventSink),
        );
        let delivered = self.events.dispatch(&mut sinks);
        drop(sinks);

        let index = self.frame_index;
        self.frame_index += 1;
        Frame {
            index,
            dt: if dt.is_finite() { dt } else { 0.0 },
            pointer,
            events: delivered,
            surfaces: &self.surfaces,
            morphs: &self.morphs,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/driver.rs"]
mod tests;
