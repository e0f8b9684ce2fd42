use std::ops::{Deref, DerefMut};

use crate::foundation::{
    core::{Vec2, Viewport},
    error::{FluxError, FluxResult},
};

/// Default per-frame fraction by which the smoothed pointer closes on the raw one.
pub const DEFAULT_POINTER_SMOOTHING: f32 = 0.05;

/// Smoothed, viewport-normalized pointer position.
///
/// Raw samples arrive only while the tracker is started; `tick` keeps easing toward the last
/// sample regardless.
#[derive(Clone, Debug)]
pub struct PointerTracker {
    viewport: Viewport,
    smoothing: f32,
    raw: Vec2,
    smoothed: Vec2,
    active: bool,
}

impl PointerTracker {
    pub fn new(viewport: Viewport, smoothing: f32) -> FluxResult<Self> {
        viewport.validate()?;
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(FluxError::configuration(format!(
                "pointer smoothing must be in (0, 1] (got {smoothing})"
            )));
        }
        Ok(Self {
            viewport,
            smoothing,
            raw: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            active: false,
        })
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start tracking for the lifetime of the returned guard.
    pub fn session(&mut self) -> PointerSession<'_> {
        self.start();
        PointerSession { tracker: self }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) -> FluxResult<()> {
        viewport.validate()?;
        self.viewport = viewport;
        Ok(())
    }

    /// Record a raw client-space pointer position. Returns `false` when stopped.
    pub fn on_pointer_move(&mut self, client_x: f32, client_y: f32) -> bool {
        if !self.active {
            return false;
        }
        if !(client_x.is_finite() && client_y.is_finite()) {
            tracing::warn!(client_x, client_y, "dropping non-finite pointer sample");
            return false;
        }
        self.raw = self.viewport.to_ndc(client_x, client_y);
        true
    }

    /// Advance one frame and return the smoothed pointer.
    pub fn tick(&mut self) -> Vec2 {
        self.smoothed = self.smoothed.lerp(self.raw, self.smoothing);
        self.smoothed
    }

    pub fn raw(&self) -> Vec2 {
        self.raw
    }

    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }

    /// Recenter both raw and smoothed positions.
    pub fn reset(&mut self) {
        self.raw = Vec2::ZERO;
        self.smoothed = Vec2::ZERO;
    }
}

/// Scoped tracking: the tracker is started on creation and stopped on drop.
#[derive(Debug)]
pub struct PointerSession<'a> {
    tracker: &'a mut PointerTracker,
}

impl Deref for PointerSession<'_> {
    type Target = PointerTracker;

    fn deref(&self) -> &Self::Target {
        self.tracker
    }
}

impl DerefMut for PointerSession<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.tracker
    }
}

impl Drop for PointerSession<'_> {
    fn drop(&mut self) {
        self.tracker.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pointer/tracker.rs"]
mod tests;
