use std::collections::{BTreeMap, BTreeSet};

use crate::{
    foundation::{
        core::Viewport,
        error::{FluxError, FluxResult},
    },
    mesh::shapes::Shape,
    morph::scheduler::MorphParams,
    pointer::tracker::DEFAULT_POINTER_SMOOTHING,
    surface::displacement::SurfaceParams,
    transition::script::{ScriptSpec, TransitionScript},
};

/// A displaced surface: one primitive plus its tunables.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceConfig {
    pub name: String,
    pub shape: Shape,
    /// Noise permutation seed; the built-in seed when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub params: SurfaceParams,
}

/// A morph set: primitives blended in order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MorphConfig {
    pub name: String,
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub params: MorphParams,
}

/// Everything needed to mount a [`Scene`](crate::Scene).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneConfig {
    pub viewport: Viewport,
    #[serde(default = "default_pointer_smoothing")]
    pub pointer_smoothing: f32,
    #[serde(default)]
    pub surfaces: Vec<SurfaceConfig>,
    #[serde(default)]
    pub morphs: Vec<MorphConfig>,
    /// Animated objects and their initial property values.
    #[serde(default)]
    pub targets: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub scripts: Vec<ScriptSpec>,
}

fn default_pointer_smoothing() -> f32 {
    DEFAULT_POINTER_SMOOTHING
}

impl SceneConfig {
    /// Parse and validate.
    pub fn from_json(json: &str) -> FluxResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> FluxResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> FluxResult<()> {
        self.viewport.validate()?;
        if !(self.pointer_smoothing > 0.0 && self.pointer_smoothing <= 1.0) {
            return Err(FluxError::configuration(format!(
                "pointer_smoothing must be in (0, 1] (got {})",
                self.pointer_smoothing
            )));
        }

        let mut names = BTreeSet::new();
        for surface in &self.surfaces {
            unique_name(&mut names, &surface.name, "surface")?;
            surface.shape.validate()?;
            surface.params.validate()?;
        }
        for morph in &self.morphs {
            unique_name(&mut names, &morph.name, "morph set")?;
            if morph.shapes.is_empty() {
                return Err(FluxError::numeric(format!(
                    "morph set '{}' needs at least one shape",
                    morph.name
                )));
            }
            for shape in &morph.shapes {
                shape.validate()?;
            }
            if !(morph.params.cycle_duration.is_finite() && morph.params.cycle_duration > 0.0) {
                return Err(FluxError::numeric(format!(
                    "morph set '{}' cycle_duration must be finite and > 0",
                    morph.name
                )));
            }
        }

        for (target, props) in &self.targets {
            if target.trim().is_empty() {
                return Err(FluxError::configuration("target names must be non-empty"));
            }
            if let Some((prop, _)) = props.iter().find(|(_, v)| !v.is_finite()) {
                return Err(FluxError::numeric(format!(
                    "target '{target}' property '{prop}' must be finite"
                )));
            }
        }

        let mut scripts = BTreeSet::new();
        for spec in &self.scripts {
            if !scripts.insert(spec.name.as_str()) {
                return Err(FluxError::configuration(format!(
                    "duplicate transition script '{}'",
                    spec.name
                )));
            }
            TransitionScript::from(spec.clone()).validate()?;
            for step in spec.tracks.iter().flat_map(|t| &t.steps) {
                if !self.targets.contains_key(&step.target) {
                    tracing::warn!(
                        script = %spec.name,
                        target_id = %step.target,
                        "script step targets an object not declared in the scene"
                    );
                }
            }
        }
        Ok(())
    }
}

fn unique_name<'a>(seen: &mut BTreeSet<&'a str>, name: &'a str, kind: &str) -> FluxResult<()> {
    if name.trim().is_empty() {
        return Err(FluxError::configuration(format!("{kind} name must be non-empty")));
    }
    if !seen.insert(name) {
        return Err(FluxError::configuration(format!(
            "duplicate {kind} name '{name}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
