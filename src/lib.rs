//! Fluxstage is the numeric and animation core behind a real-time 3D interface.
//!
//! It turns primitive meshes into per-frame vertex buffers and drives scripted transitions
//! between application views:
//!
//! - [`NoiseField`]: deterministic 3D simplex noise, scrolled through time.
//! - [`DisplacementSurface`]: multi-octave noise plus pointer influence pushed along vertex
//!   normals, with iridescent shading.
//! - [`MorphScheduler`]: cyclic index-wise blending between meshes of any vertex count.
//! - [`PointerTracker`]: raw client coordinates to a smoothed NDC vector.
//! - [`Timeline`] and [`Step`]: eased property tweens over a [`TargetRegistry`].
//! - [`TransitionController`]: named multi-timeline scripts with host callbacks.
//! - [`Scene`]: owns all of the above and advances them once per frame.
//!
//! # Frame order
//!
//! Each [`Scene::frame`] runs pointer smoothing, then surfaces and morph sets, then every
//! active transition, and finally delivers queued [`SceneEvent`]s to surfaces, morph sets and
//! host listeners. Events emitted by a transition therefore affect visuals from the next frame.
//!
//! Everything runs on the caller's thread; no call in the frame path blocks or returns an
//! error. Misconfiguration is rejected when a scene, script or timeline is built.
#![forbid(unsafe_code)]

mod animation;
mod events;
mod foundation;
mod mesh;
mod morph;
mod noise;
mod pointer;
mod scene;
mod surface;
mod transition;

pub use animation::ease::Ease;
pub use animation::step::{Chain, HookCtx, Step, StepHook};
pub use animation::target::{Binding, PropertyBag, PropertyKey, TargetId, TargetRegistry};
pub use animation::timeline::{CompletionHook, TickCtx, Timeline, TimelineState};
pub use events::bus::{EXPLODE, EventBus, EventSink, ListenerId, REFORM, SceneEvent};
pub use foundation::core::{Rgb, Vec2, Vec3, Viewport};
pub use foundation::error::{FluxError, FluxResult};
pub use mesh::base::{BaseMesh, Vertex};
pub use mesh::shapes::Shape;
pub use morph::scheduler::{MorphParams, MorphScheduler, MorphState};
pub use noise::field::NoiseField;
pub use pointer::tracker::{DEFAULT_POINTER_SMOOTHING, PointerSession, PointerTracker};
pub use scene::config::{MorphConfig, SceneConfig, SurfaceConfig};
pub use scene::driver::{Frame, FrameInput, MorphSlot, Scene, SurfaceSlot};
pub use surface::displacement::{DisplacementState, DisplacementSurface, Octave, SurfaceParams};
pub use surface::shading::iridescent_color;
pub use transition::controller::{
    PlayCallbacks, TransitionController, TransitionHandle, TransitionReport, TransitionStatus,
};
pub use transition::script::{
    Placement, ScriptSpec, ScriptTrack, StepSpec, TrackSpec, TransitionScript,
};
