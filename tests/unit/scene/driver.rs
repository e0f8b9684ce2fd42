use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use super::*;
use crate::{
    events::bus::{EXPLODE, REFORM},
    mesh::shapes::Shape,
    morph::scheduler::MorphParams,
    scene::config::{MorphConfig, SurfaceConfig},
    surface::displacement::SurfaceParams,
    transition::script::{Placement, ScriptSpec, StepSpec, TrackSpec},
};

fn step(property: &str, from: f64, to: f64, duration: f64) -> StepSpec {
    StepSpec {
        target: "prism".to_owned(),
        property: property.to_owned(),
        from,
        to,
        duration,
        ease: Default::default(),
        chain: Default::default(),
        start_offset: 0.0,
        on_start: Vec::new(),
        on_complete: Vec::new(),
    }
}

fn config() -> SceneConfig {
    let mut explode = step("scale", 1.0, 1.5, 1.0);
    explode.on_start.push(EXPLODE.to_owned());
    let mut reform = step("scale", 1.5, 1.0, 1.0);
    reform.on_complete.push(REFORM.to_owned());

    SceneConfig {
        viewport: Viewport {
            width: 800.0,
            height: 600.0,
        },
        pointer_smoothing: 0.05,
        surfaces: vec![
            SurfaceConfig {
                name: "still".to_owned(),
                shape: Shape::Octahedron { radius: 1.0 },
                seed: None,
                params: SurfaceParams {
                    intensity: 0.0,
                    event_intensity: BTreeMap::new(),
                    ..SurfaceParams::default()
                },
            },
            SurfaceConfig {
                name: "liquid".to_owned(),
                shape: Shape::Sphere {
                    radius: 1.0,
                    width_segments: 12,
                    height_segments: 8,
                },
                seed: Some(7),
                params: SurfaceParams::default(),
            },
        ],
        morphs: vec![MorphConfig {
            name: "prism".to_owned(),
            shapes: vec![
                Shape::Octahedron { radius: 1.0 },
                Shape::Cube {
                    size: 1.0,
                    segments: 1,
                },
            ],
            params: MorphParams::default(),
        }],
        targets: BTreeMap::from([(
            "prism".to_owned(),
            BTreeMap::from([("scale".to_owned(), 1.0)]),
        )]),
        scripts: vec![ScriptSpec {
            name: "burst".to_owned(),
            tracks: vec![
                TrackSpec {
                    placement: Placement::WithPrevious,
                    steps: vec![explode],
                },
                TrackSpec {
                    placement: Placement::AfterPrevious { delay: 0.0 },
                    steps: vec![reform],
                },
            ],
        }],
    }
}

fn at(elapsed: f64) -> FrameInput {
    FrameInput {
        elapsed,
        camera: Vec3::new(0.0, 0.0, 5.0),
    }
}

#[test]
fn zero_intensity_surface_keeps_rest_positions() {
    let mut scene = Scene::from_config(&config()).unwrap();
    scene.on_pointer_move(400.0, 300.0);
    for i in 0..5 {
        scene.frame(at(f64::from(i) * 0.016));
    }
    let still = scene.surface("still").unwrap();
    for (v, rest) in still.vertices().iter().zip(still.mesh().positions()) {
        assert_eq!(v.position, *rest);
    }
}

#[test]
fn frames_report_index_dt_and_buffers() {
    let mut scene = Scene::from_config(&config()).unwrap();
    let first = scene.frame(at(0.5));
    assert_eq!(first.index, 0);
    assert_eq!(first.dt, 0.5);
    assert_eq!(first.surfaces.len(), 2);
    assert_eq!(first.surfaces[1].name(), "liquid");
    assert_eq!(
        first.surfaces[1].colors().len(),
        first.surfaces[1].vertices().len()
    );
    assert!(
        first.surfaces[1]
            .colors()
            .iter()
            .all(|c| c.cmpge(Vec3::ZERO).all() && c.cmple(Vec3::ONE).all())
    );
    assert_eq!(first.morphs[0].name(), "prism");

    let second = scene.frame(at(0.75));
    assert_eq!(second.index, 1);
    assert_eq!(second.dt, 0.25);
}

#[test]
fn pointer_moves_feed_surfaces_smoothed() {
    let mut scene = Scene::from_config(&config()).unwrap();
    assert!(scene.on_pointer_move(800.0, 0.0));
    let pointer = scene.frame(at(0.0)).pointer;
    assert!((pointer - Vec2::new(0.05, 0.05)).length() < 1e-6);
    assert_eq!(scene.surface("liquid").unwrap().state().pointer, pointer);
}

#[test]
fn transition_events_reach_surfaces_and_morphs() {
    let mut scene = Scene::from_config(&config()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    scene
        .events_mut()
        .on_any(move |e| s.borrow_mut().push(e.name().to_owned()));

    let completed = Rc::new(RefCell::new(false));
    let c = Rc::clone(&completed);
    let handle = scene
        .play("burst", PlayCallbacks::new().on_complete(move |_, _| *c.borrow_mut() = true))
        .unwrap();

    let frame = scene.frame(at(0.1));
    assert_eq!(frame.events, 1);
    assert_eq!(scene.surface("liquid").unwrap().target_intensity(), 1.6);
    assert_eq!(scene.surface("still").unwrap().target_intensity(), 0.0);

    scene.frame(at(0.2));
    assert!(scene.morph("prism").unwrap().spread() > 0.0);
    assert!((scene.targets().get("prism", "scale").unwrap() - 1.1).abs() < 1e-9);

    scene.frame(at(3.0));
    assert!(*completed.borrow());
    assert_eq!(
        scene.controller().status(handle),
        Some(crate::transition::controller::TransitionStatus::Completed)
    );
    assert_eq!(*seen.borrow(), vec![EXPLODE, REFORM]);
    assert_eq!(scene.surface("liquid").unwrap().target_intensity(), 0.35);
    assert_eq!(scene.targets().get("prism", "scale"), Some(1.0));
    assert_eq!(scene.drain_reports().len(), 1);
}

#[test]
fn non_finite_time_completes_transitions_without_corrupting_buffers() {
    let mut scene = Scene::from_config(&config()).unwrap();
    let handle = scene.play("burst", PlayCallbacks::new()).unwrap();
    scene.frame(at(0.5));
    let frame = scene.frame(at(f64::NAN));
    assert_eq!(frame.dt, 0.0);
    assert!(
        frame.surfaces[1]
            .vertices()
            .iter()
            .all(|v| v.position.is_finite())
    );
    assert_eq!(
        scene.controller().status(handle),
        Some(crate::transition::controller::TransitionStatus::Completed)
    );
}

#[test]
fn unknown_script_is_reported() {
    let mut scene = Scene::from_config(&config()).unwrap();
    assert!(matches!(
        scene.play("missing", PlayCallbacks::new()),
        Err(crate::foundation::error::FluxError::UnknownScript(_))
    ));
}
