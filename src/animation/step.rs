use smallvec::SmallVec;

use crate::{
    animation::ease::Ease,
    events::bus::{EventBus, SceneEvent},
    foundation::error::{FluxError, FluxResult},
};

/// Where a step starts relative to the step added before it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chain {
    /// Start together with the previous step (the first step starts at 0).
    WithPrevious,
    /// Start when the previous step ends, plus `delay` (may be negative to overlap).
    AfterPrevious {
        #[serde(default)]
        delay: f64,
    },
    /// Start at a fixed time from the beginning of the timeline.
    Absolute { offset: f64 },
}

impl Default for Chain {
    fn default() -> Self {
        Self::AfterPrevious { delay: 0.0 }
    }
}

/// What a hook sees when it fires.
pub struct HookCtx<'a> {
    pub target: &'a str,
    pub property: &'a str,
    /// Value written (or that would have been written) this tick.
    pub value: f64,
    /// Eased progress in `[0, 1]`.
    pub progress: f64,
    events: &'a mut EventBus,
}

impl<'a> HookCtx<'a> {
    pub(crate) fn new(
        target: &'a str,
        property: &'a str,
        value: f64,
        progress: f64,
        events: &'a mut EventBus,
    ) -> Self {
        Self {
            target,
            property,
            value,
            progress,
            events,
        }
    }

    /// Publish a cross-component event; it is delivered after all timelines tick.
    pub fn emit(&mut self, event: impl Into<SceneEvent>) {
        self.events.emit(event);
    }
}

pub type StepHook = Box<dyn FnMut(&mut HookCtx<'_>)>;

/// One property tween. Immutable once added to a timeline.
pub struct Step {
    pub(crate) target: String,
    pub(crate) property: String,
    pub(crate) from: f64,
    pub(crate) to: f64,
    pub(crate) start_offset: f64,
    pub(crate) duration: f64,
    pub(crate) ease: Ease,
    pub(crate) chain: Chain,
    pub(crate) on_start: Option<StepHook>,
    pub(crate) on_update: Option<StepHook>,
    pub(crate) on_complete: Option<StepHook>,
    pub(crate) start_events: SmallVec<[SceneEvent; 1]>,
    pub(crate) complete_events: SmallVec<[SceneEvent; 1]>,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("target", &self.target)
            .field("property", &self.property)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("start_offset", &self.start_offset)
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("chain", &self.chain)
            .field("start_events", &self.start_events)
            .field("complete_events", &self.complete_events)
            .finish_non_exhaustive()
    }
}

impl Step {
    /// Tween `target.property` from `from` to `to` over `duration` seconds, linear, chained after
    /// the previous step.
    pub fn tween(
        target: impl Into<String>,
        property: impl Into<String>,
        from: f64,
        to: f64,
        duration: f64,
    ) -> Self {
        Self {
            target: target.into(),
            property: property.into(),
            from,
            to,
            start_offset: 0.0,
            duration,
            ease: Ease::Linear,
            chain: Chain::default(),
            on_start: None,
            on_update: None,
            on_complete: None,
            start_events: SmallVec::new(),
            complete_events: SmallVec::new(),
        }
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    /// Extra shift applied after the chain relation is resolved.
    pub fn start_offset(mut self, offset: f64) -> Self {
        self.start_offset = offset;
        self
    }

    pub fn on_start(mut self, hook: impl FnMut(&mut HookCtx<'_>) + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    pub fn on_update(mut self, hook: impl FnMut(&mut HookCtx<'_>) + 'static) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }

    pub fn on_complete(mut self, hook: impl FnMut(&mut HookCtx<'_>) + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    /// Emit `event` when the step is first entered.
    pub fn emit_on_start(mut self, event: impl Into<SceneEvent>) -> Self {
        self.start_events.push(event.into());
        self
    }

    /// Emit `event` when the step is first exited forward.
    pub fn emit_on_complete(mut self, event: impl Into<SceneEvent>) -> Self {
        self.complete_events.push(event.into());
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn validate(&self) -> FluxResult<()> {
        if self.target.trim().is_empty() {
            return Err(FluxError::configuration("step target must be non-empty"));
        }
        if self.property.trim().is_empty() {
            return Err(FluxError::configuration(format!(
                "step on '{}' has an empty property",
                self.target
            )));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(FluxError::configuration(format!(
                "step '{}.{}' duration must be finite and > 0 (got {})",
                self.target, self.property, self.duration
            )));
        }
        let finite = match self.chain {
            Chain::WithPrevious => true,
            Chain::AfterPrevious { delay } => delay.is_finite(),
            Chain::Absolute { offset } => offset.is_finite(),
        };
        let values_finite =
            self.from.is_finite() && self.to.is_finite() && self.start_offset.is_finite();
        if !(finite && values_finite) {
            return Err(FluxError::configuration(format!(
                "step '{}.{}' has non-finite timing or values",
                self.target, self.property
            )));
        }
        Ok(())
    }

    /// Value at eased progress `p`; exactly `to` once complete.
    pub(crate) fn value_at(&self, p: f64) -> f64 {
        if p >= 1.0 {
            self.to
        } else {
            crate::foundation::math::lerp_f64(self.from, self.to, p)
        }
    }
}

/// Absolute `[start, end)` windows for `steps`, in order.
pub(crate) fn resolve_schedule<'a>(
    steps: impl IntoIterator<Item = &'a Step>,
) -> FluxResult<Vec<(f64, f64)>> {
    let mut out: Vec<(f64, f64)> = Vec::new();
    for step in steps {
        let (prev_start, prev_end) = out.last().copied().unwrap_or((0.0, 0.0));
        let anchor = match step.chain {
            Chain::WithPrevious => prev_start,
            Chain::AfterPrevious { delay } => prev_end + delay,
            Chain::Absolute { offset } => offset,
        };
        let start = anchor + step.start_offset;
        if start < 0.0 {
            return Err(FluxError::configuration(format!(
                "step '{}.{}' would start before the timeline ({start})",
                step.target, step.property
            )));
        }
        out.push((start, start + step.duration));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/step.rs"]
mod tests;
