use crate::foundation::error::{FluxError, FluxResult};

pub use glam::{Vec2, Vec3};

/// Size of the render surface in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> FluxResult<Self> {
        let vp = Self { width, height };
        vp.validate()?;
        Ok(vp)
    }

    pub fn validate(&self) -> FluxResult<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(FluxError::numeric("viewport width must be finite and > 0"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(FluxError::numeric("viewport height must be finite and > 0"));
        }
        Ok(())
    }

    /// Map a client-space pixel position to NDC-style coordinates with Y up.
    pub fn to_ndc(self, client_x: f32, client_y: f32) -> Vec2 {
        Vec2::new(
            2.0 * client_x / self.width - 1.0,
            -(2.0 * client_y / self.height - 1.0),
        )
    }
}

/// Linear RGB color, nominal range `[0, 1]` per channel.
pub type Rgb = Vec3;

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
