use std::collections::HashMap;

use crate::{
    animation::{
        target::TargetRegistry,
        timeline::{TickCtx, Timeline, TimelineState},
    },
    events::bus::EventBus,
    foundation::error::{FluxError, FluxResult},
    transition::script::TransitionScript,
};

/// Identifies one play of a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct TransitionHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStatus {
    Running,
    Completed,
    Cancelled,
}

/// Summary handed to host callbacks and kept until drained.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TransitionReport {
    pub handle: TransitionHandle,
    pub script: String,
    pub status: TransitionStatus,
    /// Transition time when the report was taken.
    pub elapsed: f64,
    /// Whether remaining steps were skipped by an instant complete.
    pub skipped: bool,
}

type ReportHook = Box<dyn FnOnce(&TransitionReport)>;
type CompleteHook = Box<dyn FnOnce(&TransitionReport, &mut EventBus)>;

/// Host callbacks for one play.
#[derive(Default)]
pub struct PlayCallbacks {
    on_start: Option<ReportHook>,
    on_complete: Option<CompleteHook>,
    on_cancel: Option<ReportHook>,
}

impl std::fmt::Debug for PlayCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayCallbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}

impl PlayCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, hook: impl FnOnce(&TransitionReport) + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    /// Runs once, on normal completion or instant complete. Typically triggers navigation.
    pub fn on_complete(
        mut self,
        hook: impl FnOnce(&TransitionReport, &mut EventBus) + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn on_cancel(mut self, hook: impl FnOnce(&TransitionReport) + 'static) -> Self {
        self.on_cancel = Some(Box::new(hook));
        self
    }
}

#[derive(Debug)]
struct Track {
    timeline: Timeline,
    start: f64,
}

#[derive(Debug)]
struct Active {
    handle: TransitionHandle,
    script: String,
    tracks: Vec<Track>,
    elapsed: f64,
    callbacks: PlayCallbacks,
}

impl Active {
    fn report(&self, status: TransitionStatus, skipped: bool) -> TransitionReport {
        TransitionReport {
            handle: self.handle,
            script: self.script.clone(),
            status,
            elapsed: self.elapsed,
            skipped,
        }
    }

    fn done(&self) -> bool {
        self.tracks
            .iter()
            .all(|t| t.timeline.state() == TimelineState::Completed)
    }

    fn advance(&mut self, dt: f64, ctx: &mut TickCtx<'_>) {
        self.elapsed += dt;
        for track in &mut self.tracks {
            if self.elapsed < track.start {
                continue;
            }
            if track.timeline.state() == TimelineState::Idle
                && let Err(err) = track.timeline.start(ctx.targets)
            {
                tracing::warn!(
                    timeline = %track.timeline.name(),
                    error = %err,
                    "track failed to start; completing it instantly"
                );
                let _ = track.timeline.complete_now(ctx.events);
                continue;
            }
            track.timeline.tick(self.elapsed - track.start, ctx);
        }
    }

    fn skip_all(&mut self, events: &mut EventBus) {
        for track in &mut self.tracks {
            if !track.timeline.state().is_terminal() {
                let _ = track.timeline.complete_now(events);
            }
        }
    }
}

/// Plays named [`TransitionScript`]s, one fresh set of timelines per play.
#[derive(Debug, Default)]
pub struct TransitionController {
    scripts: HashMap<String, TransitionScript>,
    active: Vec<Active>,
    reports: Vec<TransitionReport>,
    next_handle: u64,
}

impl TransitionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a script. Names must be unique.
    #[tracing::instrument(skip_all, fields(script = %script.name()))]
    pub fn register(&mut self, script: TransitionScript) -> FluxResult<()> {
        script.validate()?;
        if self.scripts.contains_key(script.name()) {
            return Err(FluxError::configuration(format!(
                "transition script '{}' is already registered",
                script.name()
            )));
        }
        tracing::debug!(tracks = script.tracks().len(), "registered transition script");
        self.scripts.insert(script.name().to_owned(), script);
        Ok(())
    }

    pub fn script(&self, name: &str) -> Option<&TransitionScript> {
        self.scripts.get(name)
    }

    /// Registered script names, sorted.
    pub fn script_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scripts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Begin playing `name`. Its tracks start on the following ticks.
    pub fn play(&mut self, name: &str, callbacks: PlayCallbacks) -> FluxResult<TransitionHandle> {
        let script = self
            .scripts
            .get(name)
            .ok_or_else(|| FluxError::UnknownScript(name.to_owned()))?;
        if self.is_playing(name) {
            return Err(FluxError::state(format!(
                "transition script '{name}' is already playing"
            )));
        }

        let timelines = script.instantiate()?;
        let layout = script.layout(&timelines)?;
        let tracks = timelines
            .into_iter()
            .zip(layout)
            .map(|(timeline, (start, _))| Track { timeline, start })
            .collect();

        let handle = TransitionHandle(self.next_handle);
        self.next_handle += 1;
        let mut active = Active {
            handle,
            script: name.to_owned(),
            tracks,
            elapsed: 0.0,
            callbacks,
        };
        if let Some(hook) = active.callbacks.on_start.take() {
            hook(&active.report(TransitionStatus::Running, false));
        }
        tracing::debug!(script = name, ?handle, "transition started");
        self.active.push(active);
        Ok(handle)
    }

    /// Advance every active transition by `dt` seconds, in play order.
    ///
    /// A non-finite `dt` completes every active transition instantly.
    pub fn tick(&mut self, dt: f64, targets: &mut TargetRegistry, events: &mut EventBus) {
        if self.active.is_empty() {
            return;
        }
        if !dt.is_finite() {
            tracing::warn!(dt, "non-finite frame delta; completing active transitions");
            for mut active in std::mem::take(&mut self.active) {
                active.skip_all(events);
                self.finish(active, true, events);
            }
            return;
        }
        let dt = dt.max(0.0);

        let mut ctx = TickCtx { targets, events };
        let mut i = 0;
        while i < self.active.len() {
            self.active[i].advance(dt, &mut ctx);
            if self.active[i].done() {
                let active = self.active.remove(i);
                self.finish(active, false, ctx.events);
            } else {
                i += 1;
            }
        }
    }

    /// Stop a transition. Property writes already made are kept.
    pub fn cancel(&mut self, handle: TransitionHandle) -> FluxResult<()> {
        let mut active = self.take(handle)?;
        for track in &mut active.tracks {
            if track.timeline.state() == TimelineState::Running {
                track.timeline.cancel()?;
            }
        }
        let report = active.report(TransitionStatus::Cancelled, false);
        tracing::debug!(script = %report.script, elapsed = report.elapsed, "transition cancelled");
        if let Some(hook) = active.callbacks.on_cancel.take() {
            hook(&report);
        }
        self.reports.push(report);
        Ok(())
    }

    /// Skip remaining steps and complete now, running completion callbacks.
    pub fn complete_now(
        &mut self,
        handle: TransitionHandle,
        events: &mut EventBus,
    ) -> FluxResult<()> {
        let mut active = self.take(handle)?;
        active.skip_all(events);
        self.finish(active, true, events);
        Ok(())
    }

    /// Status of an active transition, or of a finished one whose report is not yet drained.
    pub fn status(&self, handle: TransitionHandle) -> Option<TransitionStatus> {
        if self.active.iter().any(|a| a.handle == handle) {
            return Some(TransitionStatus::Running);
        }
        self.reports
            .iter()
            .rev()
            .find(|r| r.handle == handle)
            .map(|r| r.status)
    }

    pub fn is_playing(&self, name: &str) -> bool {
        self.active.iter().any(|a| a.script == name)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Take reports of transitions finished since the last drain.
    pub fn drain_reports(&mut self) -> Vec<TransitionReport> {
        std::mem::take(&mut self.reports)
    }

    fn take(&mut self, handle: TransitionHandle) -> FluxResult<Active> {
        let index = self
            .active
            .iter()
            .position(|a| a.handle == handle)
            .ok_or_else(|| FluxError::state(format!("transition {handle:?} is not active")))?;
        Ok(self.active.remove(index))
    }

    fn finish(&mut self, mut active: Active, skipped: bool, events: &mut EventBus) {
        let report = active.report(TransitionStatus::Completed, skipped);
        tracing::debug!(
            script = %report.script,
            elapsed = report.elapsed,
            skipped,
            "transition completed"
        );
        if let Some(hook) = active.callbacks.on_complete.take() {
            hook(&report, events);
        }
        self.reports.push(report);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/controller.rs"]
mod tests;
