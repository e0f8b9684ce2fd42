use std::rc::Rc;

use crate::{
    animation::{
        ease::Ease,
        step::{Chain, Step},
        timeline::Timeline,
    },
    foundation::error::{FluxError, FluxResult},
};

/// Where a track starts relative to the track declared before it.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Start together with the previous track (the first track starts at 0).
    #[default]
    WithPrevious,
    /// Start when the previous track ends, plus `delay`.
    AfterPrevious {
        #[serde(default)]
        delay: f64,
    },
    /// Start at a fixed time from the beginning of the transition.
    Absolute { offset: f64 },
}

/// Declarative step, as it appears in scene configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StepSpec {
    pub target: String,
    pub property: String,
    pub from: f64,
    pub to: f64,
    pub duration: f64,
    #[serde(default)]
    pub ease: Ease,
    #[serde(default)]
    pub chain: Chain,
    #[serde(default)]
    pub start_offset: f64,
    /// Events emitted when the step starts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_start: Vec<String>,
    /// Events emitted when the step completes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_complete: Vec<String>,
}

impl StepSpec {
    pub fn to_step(&self) -> Step {
        let mut step = Step::tween(
            self.target.clone(),
            self.property.clone(),
            self.from,
            self.to,
            self.duration,
        )
        .ease(self.ease)
        .chain(self.chain)
        .start_offset(self.start_offset);
        for name in &self.on_start {
            step = step.emit_on_start(name.clone());
        }
        for name in &self.on_complete {
            step = step.emit_on_complete(name.clone());
        }
        step
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackSpec {
    #[serde(default)]
    pub placement: Placement,
    pub steps: Vec<StepSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptSpec {
    pub name: String,
    pub tracks: Vec<TrackSpec>,
}

type StepFactory = Rc<dyn Fn() -> Vec<Step>>;

#[derive(Clone)]
enum TrackSource {
    Specs(Vec<StepSpec>),
    Factory(StepFactory),
}

/// One timeline of a script. Each play builds a fresh [`Timeline`] from it.
#[derive(Clone)]
pub struct ScriptTrack {
    placement: Placement,
    source: TrackSource,
}

impl std::fmt::Debug for ScriptTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("ScriptTrack");
        d.field("placement", &self.placement);
        match &self.source {
            TrackSource::Specs(specs) => d.field("steps", specs).finish(),
            TrackSource::Factory(_) => d.finish_non_exhaustive(),
        }
    }
}

impl ScriptTrack {
    pub fn from_specs(placement: Placement, steps: Vec<StepSpec>) -> Self {
        Self {
            placement,
            source: TrackSource::Specs(steps),
        }
    }

    /// Track whose steps are built in code, so they can carry closure hooks.
    ///
    /// `build` runs once per play.
    pub fn from_fn(placement: Placement, build: impl Fn() -> Vec<Step> + 'static) -> Self {
        Self {
            placement,
            source: TrackSource::Factory(Rc::new(build)),
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub(crate) fn instantiate(&self, name: String) -> FluxResult<Timeline> {
        let steps = match &self.source {
            TrackSource::Specs(specs) => specs.iter().map(StepSpec::to_step).collect(),
            TrackSource::Factory(build) => build(),
        };
        steps
            .into_iter()
            .try_fold(Timeline::new(name), Timeline::with_step)
    }
}

/// Named composition of timelines played by a
/// [`TransitionController`](crate::TransitionController).
#[derive(Clone, Debug)]
pub struct TransitionScript {
    name: String,
    tracks: Vec<ScriptTrack>,
}

impl TransitionScript {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    pub fn with_track(mut self, track: ScriptTrack) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tracks(&self) -> &[ScriptTrack] {
        &self.tracks
    }

    /// Build one timeline per track, named `<script>#<track>`.
    pub(crate) fn instantiate(&self) -> FluxResult<Vec<Timeline>> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(i, track)| track.instantiate(format!("{}#{i}", self.name)))
            .collect()
    }

    /// Absolute `(start, end)` of each track, given freshly built timelines.
    pub(crate) fn layout(&self, timelines: &[Timeline]) -> FluxResult<Vec<(f64, f64)>> {
        let mut out: Vec<(f64, f64)> = Vec::with_capacity(self.tracks.len());
        for (track, timeline) in self.tracks.iter().zip(timelines) {
            let (prev_start, prev_end) = out.last().copied().unwrap_or((0.0, 0.0));
            let start = match track.placement {
                Placement::WithPrevious => prev_start,
                Placement::AfterPrevious { delay } => prev_end + delay,
                Placement::Absolute { offset } => offset,
            };
            if !(start.is_finite() && start >= 0.0) {
                return Err(FluxError::configuration(format!(
                    "track of script '{}' would start at {start}",
                    self.name
                )));
            }
            out.push((start, start + timeline.total_duration()?));
        }
        Ok(out)
    }

    /// Max end time over every step of every track.
    pub fn duration(&self) -> FluxResult<f64> {
        let timelines = self.instantiate()?;
        Ok(self
            .layout(&timelines)?
            .into_iter()
            .fold(0.0, |acc, (_, end)| f64::max(acc, end)))
    }

    pub fn validate(&self) -> FluxResult<()> {
        if self.name.trim().is_empty() {
            return Err(FluxError::configuration("transition script name must be non-empty"));
        }
        self.duration().map(|_| ())
    }
}

impl From<ScriptSpec> for TransitionScript {
    fn from(spec: ScriptSpec) -> Self {
        spec.tracks.into_iter().fold(Self::new(spec.name), |script, track| {
            script.with_track(ScriptTrack::from_specs(track.placement, track.steps))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/script.rs"]
mod tests;
