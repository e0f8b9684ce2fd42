use super::*;

const MINIMAL: &str = r#"{
    "viewport": { "width": 800, "height": 600 },
    "surfaces": [ { "name": "liquid", "shape": { "kind": "sphere", "radius": 1.0 } } ],
    "morphs": [
        { "name": "prism", "shapes": [ { "kind": "octahedron", "radius": 1.0 },
                                       { "kind": "cube", "size": 1.5 } ] }
    ],
    "targets": { "prism": { "rotationY": 0.0, "scale": 0.8 } },
    "scripts": [
        { "name": "landing->auth",
          "tracks": [ { "steps": [
              { "target": "prism", "property": "rotationY", "from": 0, "to": 3.14159,
                "duration": 2 }
          ] } ] }
    ]
}"#;

#[test]
fn minimal_config_fills_defaults() {
    let config = SceneConfig::from_json(MINIMAL).unwrap();
    assert_eq!(config.pointer_smoothing, DEFAULT_POINTER_SMOOTHING);
    assert_eq!(config.surfaces[0].seed, None);
    assert_eq!(config.surfaces[0].params, SurfaceParams::default());
    assert_eq!(config.morphs[0].params.cycle_duration, 3.0);
    assert!(matches!(
        config.surfaces[0].shape,
        Shape::Sphere {
            width_segments: 32,
            height_segments: 16,
            ..
        }
    ));
}

#[test]
fn pretty_json_parses_back_to_the_same_config() {
    let config = SceneConfig::from_json(MINIMAL).unwrap();
    let json = config.to_json_pretty().unwrap();
    assert_eq!(SceneConfig::from_json(&json).unwrap(), config);
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        SceneConfig::from_json("{ \"viewport\": 3 }"),
        Err(FluxError::Serde(_))
    ));
}

#[test]
fn invalid_values_are_rejected() {
    let base = SceneConfig::from_json(MINIMAL).unwrap();

    let mut c = base.clone();
    c.pointer_smoothing = 0.0;
    assert!(matches!(c.validate(), Err(FluxError::Configuration(_))));

    let mut c = base.clone();
    c.viewport.width = 0.0;
    assert!(matches!(c.validate(), Err(FluxError::Numeric(_))));

    let mut c = base.clone();
    c.morphs[0].shapes.clear();
    assert!(matches!(c.validate(), Err(FluxError::Numeric(_))));

    let mut c = base.clone();
    c.morphs[0].params.cycle_duration = 0.0;
    assert!(matches!(c.validate(), Err(FluxError::Numeric(_))));

    let mut c = base.clone();
    c.morphs[0].name = "liquid".to_owned();
    assert!(matches!(c.validate(), Err(FluxError::Configuration(_))));

    let mut c = base.clone();
    c.surfaces[0].params.octaves[2].weight = 0.5;
    assert!(matches!(c.validate(), Err(FluxError::Configuration(_))));

    let mut c = base.clone();
    c.scripts.push(c.scripts[0].clone());
    assert!(matches!(c.validate(), Err(FluxError::Configuration(_))));

    let mut c = base.clone();
    c.scripts[0].tracks[0].steps[0].duration = 0.0;
    assert!(matches!(c.validate(), Err(FluxError::Configuration(_))));

    let mut c = base;
    c.targets
        .get_mut("prism")
        .unwrap()
        .insert("scale".to_owned(), f64::INFINITY);
    assert!(matches!(c.validate(), Err(FluxError::Numeric(_))));
}

#[test]
fn undeclared_script_targets_only_warn() {
    let mut config = SceneConfig::from_json(MINIMAL).unwrap();
    config.targets.clear();
    config.validate().unwrap();
}
