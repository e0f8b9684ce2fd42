use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::{
    animation::{
        step::{Chain, Step},
        target::PropertyBag,
    },
    transition::script::{Placement, ScriptTrack},
};

fn world() -> (TargetRegistry, EventBus) {
    let mut targets = TargetRegistry::new();
    targets.insert(
        "prism",
        PropertyBag::from_iter([("rotationY", 0.0), ("scale", 0.8)]),
    );
    targets.insert("camera", PropertyBag::from_iter([("z", 6.0)]));
    (targets, EventBus::new())
}

fn landing_to_auth() -> TransitionScript {
    TransitionScript::new("landing->auth")
        .with_track(ScriptTrack::from_fn(Placement::WithPrevious, || {
            vec![
                Step::tween("prism", "rotationY", 0.0, 3.14159, 2.0)
                    .chain(Chain::WithPrevious)
                    .emit_on_start(crate::events::bus::EXPLODE),
                Step::tween("prism", "scale", 0.8, 1.0, 1.0)
                    .chain(Chain::AfterPrevious { delay: 0.0 })
                    .emit_on_complete(crate::events::bus::REFORM),
            ]
        }))
        .with_track(ScriptTrack::from_fn(
            Placement::Absolute { offset: 0.5 },
            || vec![Step::tween("camera", "z", 6.0, 4.0, 1.0)],
        ))
}

fn controller() -> TransitionController {
    let mut c = TransitionController::new();
    c.register(landing_to_auth()).unwrap();
    c
}

#[test]
fn play_runs_tracks_and_reports_completion_once() {
    let (mut targets, mut events) = world();
    let mut c = controller();
    let completed: Rc<RefCell<Vec<TransitionReport>>> = Rc::default();
    let started = Rc::new(RefCell::new(0));
    let (done, st) = (Rc::clone(&completed), Rc::clone(&started));
    let handle = c
        .play(
            "landing->auth",
            PlayCallbacks::new()
                .on_start(move |_| *st.borrow_mut() += 1)
                .on_complete(move |r, bus| {
                    bus.emit("navigate");
                    done.borrow_mut().push(r.clone());
                }),
        )
        .unwrap();
    assert_eq!(*started.borrow(), 1);
    assert!(c.is_playing("landing->auth"));

    c.tick(1.0, &mut targets, &mut events);
    assert!((targets.get("prism", "rotationY").unwrap() - 1.570795).abs() < 1e-9);
    assert_eq!(targets.get("prism", "scale"), Some(0.8));
    assert!((targets.get("camera", "z").unwrap() - 5.0).abs() < 1e-9);

    c.tick(1.5, &mut targets, &mut events);
    assert_eq!(targets.get("prism", "rotationY"), Some(3.14159));
    assert!((targets.get("prism", "scale").unwrap() - 0.9).abs() < 1e-9);
    assert_eq!(c.status(handle), Some(TransitionStatus::Running));

    c.tick(0.5, &mut targets, &mut events);
    c.tick(0.5, &mut targets, &mut events);
    assert_eq!(c.status(handle), Some(TransitionStatus::Completed));
    assert!(!c.is_playing("landing->auth"));
    assert_eq!(completed.borrow().len(), 1);
    assert!(!completed.borrow()[0].skipped);
    assert_eq!(completed.borrow()[0].elapsed, 3.0);

    let names: Vec<&str> = events.pending().iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec![crate::events::bus::EXPLODE, crate::events::bus::REFORM, "navigate"]
    );

    let reports = c.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(c.status(handle), None);
}

#[test]
fn unknown_and_duplicate_plays_are_rejected() {
    let mut c = controller();
    assert!(matches!(
        c.play("nope", PlayCallbacks::new()),
        Err(FluxError::UnknownScript(name)) if name == "nope"
    ));
    c.play("landing->auth", PlayCallbacks::new()).unwrap();
    assert!(matches!(
        c.play("landing->auth", PlayCallbacks::new()),
        Err(FluxError::State(_))
    ));
    assert!(c.register(landing_to_auth()).is_err());
}

#[test]
fn script_can_be_replayed_after_it_finishes() {
    let (mut targets, mut events) = world();
    let mut c = controller();
    let first = c.play("landing->auth", PlayCallbacks::new()).unwrap();
    c.tick(10.0, &mut targets, &mut events);
    assert_eq!(c.status(first), Some(TransitionStatus::Completed));
    let second = c.play("landing->auth", PlayCallbacks::new()).unwrap();
    assert_ne!(first, second);
    assert_eq!(c.active_count(), 1);
}

#[test]
fn cancel_keeps_writes_and_skips_completion() {
    let (mut targets, mut events) = world();
    let mut c = controller();
    let cancelled = Rc::new(RefCell::new(false));
    let completed = Rc::new(RefCell::new(false));
    let (ca, co) = (Rc::clone(&cancelled), Rc::clone(&completed));
    let handle = c
        .play(
            "landing->auth",
            PlayCallbacks::new()
                .on_cancel(move |r| {
                    assert_eq!(r.status, TransitionStatus::Cancelled);
                    *ca.borrow_mut() = true;
                })
                .on_complete(move |_, _| *co.borrow_mut() = true),
        )
        .unwrap();
    c.tick(1.0, &mut targets, &mut events);
    c.cancel(handle).unwrap();
    c.tick(5.0, &mut targets, &mut events);

    assert!(*cancelled.borrow());
    assert!(!*completed.borrow());
    assert!((targets.get("prism", "rotationY").unwrap() - 1.570795).abs() < 1e-9);
    assert_eq!(c.status(handle), Some(TransitionStatus::Cancelled));
    assert!(c.cancel(handle).is_err());
}

#[test]
fn complete_now_runs_completion_with_skipped_flag() {
    let (_, mut events) = world();
    let mut c = controller();
    let report = Rc::new(RefCell::new(None));
    let r = Rc::clone(&report);
    let handle = c
        .play(
            "landing->auth",
            PlayCallbacks::new().on_complete(move |rep, _| *r.borrow_mut() = Some(rep.clone())),
        )
        .unwrap();
    c.complete_now(handle, &mut events).unwrap();
    let report = report.borrow().clone().unwrap();
    assert!(report.skipped);
    assert_eq!(report.status, TransitionStatus::Completed);
    assert!(c.complete_now(handle, &mut events).is_err());
}

#[test]
fn non_finite_delta_degrades_to_instant_complete() {
    let (mut targets, mut events) = world();
    let mut c = controller();
    let hits = Rc::new(RefCell::new(0));
    let h = Rc::clone(&hits);
    let handle = c
        .play(
            "landing->auth",
            PlayCallbacks::new().on_complete(move |_, _| *h.borrow_mut() += 1),
        )
        .unwrap();
    c.tick(0.25, &mut targets, &mut events);
    c.tick(f64::NAN, &mut targets, &mut events);
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(c.status(handle), Some(TransitionStatus::Completed));
    assert_eq!(c.active_count(), 0);
}

#[test]
fn missing_targets_do_not_block_completion() {
    let (mut targets, mut events) = world();
    let mut c = TransitionController::new();
    c.register(
        TransitionScript::new("ghost").with_track(ScriptTrack::from_fn(
            Placement::WithPrevious,
            || vec![Step::tween("panel-7", "opacity", 0.0, 1.0, 1.0).emit_on_complete("shown")],
        )),
    )
    .unwrap();
    let completed = Rc::new(RefCell::new(false));
    let done = Rc::clone(&completed);
    let handle = c
        .play(
            "ghost",
            PlayCallbacks::new().on_complete(move |_, _| *done.borrow_mut() = true),
        )
        .unwrap();
    c.tick(0.5, &mut targets, &mut events);
    c.tick(0.5, &mut targets, &mut events);
    assert_eq!(c.status(handle), Some(TransitionStatus::Completed));
    assert!(*completed.borrow());
    assert!(events.pending().is_empty());
}

#[test]
fn concurrent_transitions_write_in_play_order() {
    let (mut targets, mut events) = world();
    let mut c = TransitionController::new();
    for (name, to) in [("a", 10.0), ("b", 20.0)] {
        c.register(TransitionScript::new(name).with_track(ScriptTrack::from_fn(
            Placement::WithPrevious,
            move || vec![Step::tween("prism", "scale", 0.0, to, 1.0)],
        )))
        .unwrap();
    }
    c.play("a", PlayCallbacks::new()).unwrap();
    c.play("b", PlayCallbacks::new()).unwrap();
    c.tick(0.5, &mut targets, &mut events);
    assert_eq!(targets.get("prism", "scale"), Some(10.0));
    assert_eq!(c.script_names(), vec!["a", "b"]);
}
