use crate::{
    animation::{
        step::{HookCtx, Step, StepHook, resolve_schedule},
        target::{Binding, TargetRegistry},
    },
    events::bus::{EventBus, SceneEvent},
    foundation::error::{FluxError, FluxResult},
};

/// Lifecycle of a [`Timeline`]. `Completed` and `Cancelled` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum TimelineState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl TimelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Mutable world a timeline writes into during a tick.
pub struct TickCtx<'a> {
    pub targets: &'a mut TargetRegistry,
    pub events: &'a mut EventBus,
}

pub type CompletionHook = Box<dyn FnOnce(&mut EventBus)>;

#[derive(Debug)]
struct Scheduled {
    step: Step,
    start: f64,
    end: f64,
    binding: Option<Binding>,
    started: bool,
    completed: bool,
    warned: bool,
}

/// Ordered set of steps advanced by elapsed time since `start`.
pub struct Timeline {
    name: String,
    steps: Vec<Scheduled>,
    state: TimelineState,
    elapsed: f64,
    on_complete: Option<CompletionHook>,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("elapsed", &self.elapsed)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

fn fire(
    hook: &mut Option<StepHook>,
    events_out: &[SceneEvent],
    step_target: &str,
    step_property: &str,
    value: f64,
    progress: f64,
    events: &mut EventBus,
) {
    if let Some(hook) = hook.as_mut() {
        let mut ctx = HookCtx::new(step_target, step_property, value, progress, events);
        hook(&mut ctx);
    }
    for event in events_out {
        events.emit(event.clone());
    }
}

impl Timeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            state: TimelineState::Idle,
            elapsed: 0.0,
            on_complete: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// Elapsed time passed to the latest accepted tick.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a step. Only allowed while idle.
    pub fn add_step(&mut self, step: Step) -> FluxResult<()> {
        if self.state != TimelineState::Idle {
            return Err(FluxError::state(format!(
                "timeline '{}' is {:?}; steps can only be added while idle",
                self.name, self.state
            )));
        }
        step.validate()?;
        self.steps.push(Scheduled {
            step,
            start: 0.0,
            end: 0.0,
            binding: None,
            started: false,
            completed: false,
            warned: false,
        });
        Ok(())
    }

    /// Builder form of [`Timeline::add_step`].
    pub fn with_step(mut self, step: Step) -> FluxResult<Self> {
        self.add_step(step)?;
        Ok(self)
    }

    /// Callback run once when the timeline completes (normally or via [`Timeline::complete_now`]).
    pub fn on_complete(&mut self, hook: impl FnOnce(&mut EventBus) + 'static) {
        self.on_complete = Some(Box::new(hook));
    }

    /// End time of the last-ending step.
    pub fn total_duration(&self) -> FluxResult<f64> {
        if self.state == TimelineState::Idle {
            return Ok(resolve_schedule(self.steps.iter().map(|s| &s.step))?
                .into_iter()
                .fold(0.0, |acc, (_, end)| f64::max(acc, end)));
        }
        Ok(self.steps.iter().fold(0.0, |acc, s| f64::max(acc, s.end)))
    }

    /// Resolve step windows and target bindings, then begin running.
    ///
    /// Missing targets are not an error: those steps keep their timing but skip writes, hooks
    /// and emitted events.
    #[tracing::instrument(skip_all, fields(timeline = %self.name))]
    pub fn start(&mut self, targets: &mut TargetRegistry) -> FluxResult<()> {
        if self.state != TimelineState::Idle {
            return Err(FluxError::state(format!(
                "timeline '{}' is {:?}; only idle timelines can start",
                self.name, self.state
            )));
        }

        let windows = resolve_schedule(self.steps.iter().map(|s| &s.step))?;

        for (s, (start, end)) in self.steps.iter_mut().zip(windows) {
            s.start = start;
            s.end = end;
            s.binding = targets.bind(&s.step.target, &s.step.property, s.step.from);
            if s.binding.is_none() {
                tracing::warn!(
                    target_id = %s.step.target,
                    property = %s.step.property,
                    "step target missing; its writes, hooks and events will be skipped"
                );
                s.warned = true;
            }
        }

        self.state = TimelineState::Running;
        self.elapsed = 0.0;
        tracing::debug!(steps = self.steps.len(), "timeline started");
        Ok(())
    }

    /// Advance to `elapsed` seconds since start and return the resulting state.
    ///
    /// Non-running timelines ignore ticks.
    pub fn tick(&mut self, elapsed: f64, ctx: &mut TickCtx<'_>) -> TimelineState {
        if self.state != TimelineState::Running {
            return self.state;
        }
        if !elapsed.is_finite() {
            tracing::warn!(timeline = %self.name, elapsed, "ignoring non-finite tick");
            return self.state;
        }
        self.elapsed = elapsed;

        for s in &mut self.steps {
            if s.completed || elapsed < s.start {
                continue;
            }
            let finished = elapsed >= s.end;
            let progress = if finished {
                1.0
            } else {
                (elapsed - s.start) / s.step.duration
            };
            let eased = s.step.ease.apply(progress);
            let value = s.step.value_at(eased);

            // Hooks and emitted events belong to the step's target; without it they are skipped.
            let written = s
                .binding
                .is_some_and(|binding| ctx.targets.write(binding, value));
            if !written && !s.warned {
                s.warned = true;
                tracing::warn!(
                    timeline = %self.name,
                    target_id = %s.step.target,
                    property = %s.step.property,
                    "step target no longer exists; skipping side effects"
                );
            }

            if !s.started {
                s.started = true;
                if written {
                    fire(
                        &mut s.step.on_start,
                        &s.step.start_events,
                        &s.step.target,
                        &s.step.property,
                        value,
                        eased,
                        ctx.events,
                    );
                }
            }

            if written && let Some(hook) = s.step.on_update.as_mut() {
                let mut hook_ctx =
                    HookCtx::new(&s.step.target, &s.step.property, value, eased, ctx.events);
                hook(&mut hook_ctx);
            }

            if finished {
                s.completed = true;
                if written {
                    fire(
                        &mut s.step.on_complete,
                        &s.step.complete_events,
                        &s.step.target,
                        &s.step.property,
                        value,
                        eased,
                        ctx.events,
                    );
                }
            }
        }

        if self.steps.iter().all(|s| s.completed) {
            self.finish(ctx.events);
        }
        self.state
    }

    /// Stop without rolling back writes. Only valid while running.
    pub fn cancel(&mut self) -> FluxResult<()> {
        if self.state != TimelineState::Running {
            return Err(FluxError::state(format!(
                "timeline '{}' is {:?}; only running timelines can be cancelled",
                self.name, self.state
            )));
        }
        self.state = TimelineState::Cancelled;
        self.on_complete = None;
        tracing::debug!(timeline = %self.name, elapsed = self.elapsed, "timeline cancelled");
        Ok(())
    }

    /// Jump to `Completed`, skipping remaining steps but running the completion callback.
    pub fn complete_now(&mut self, events: &mut EventBus) -> FluxResult<()> {
        if self.state.is_terminal() {
            return Err(FluxError::state(format!(
                "timeline '{}' already {:?}",
                self.name, self.state
            )));
        }
        tracing::debug!(timeline = %self.name, "timeline completed early");
        self.finish(events);
        Ok(())
    }

    fn finish(&mut self, events: &mut EventBus) {
        self.state = TimelineState::Completed;
        if let Some(hook) = self.on_complete.take() {
            hook(events);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
