//! Integration tests for validation and scoring

use pretty_assertions::assert_eq;
use spatial_engine::{
    score, validate, wire, Element, Engine, IdGenerator, Layout, Rect, Scene, ViolationKind,
};

fn racetrack(scene: &Scene) -> Layout {
    let source = include_str!("fixtures/racetrack.json");
    let layout = wire::decode_layout(source, scene, &mut IdGenerator::seeded(1))
        .expect("Fixture should decode");
    scene.normalize(&layout)
}

fn single(kind: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new("e", kind, Rect::new(x, y, w, h))
}

#[test]
fn test_overlapping_walls_scenario() {
    let scene = Scene::parking();
    let layout = Layout::from_elements(
        800.0,
        600.0,
        vec![
            Element::new("w1", "wall", Rect::new(0.0, 0.0, 10.0, 10.0)),
            Element::new("w2", "wall", Rect::new(5.0, 5.0, 10.0, 10.0)),
        ],
    );
    let violations = validate(&layout, &scene);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::Overlap);
    let ids = [
        violations[0].element_id.as_str(),
        violations[0].target_id.as_deref().unwrap_or_default(),
    ];
    assert_eq!(ids, ["w1", "w2"]);
}

#[test]
fn test_out_of_bounds_scenario() {
    let scene = Scene::parking();
    let layout = Layout::new(800.0, 600.0).with_element(single("wall", 790.0, 0.0, 50.0, 20.0));
    let kinds: Vec<ViolationKind> = validate(&layout, &scene).iter().map(|v| v.kind).collect();
    assert_eq!(kinds, vec![ViolationKind::OutOfBounds]);
}

#[test]
fn test_severity_ordering() {
    let scene = Scene::parking();

    let disconnected = Layout::new(800.0, 600.0).with_element(single("ground", 300.0, 300.0, 50.0, 50.0));
    let out_of_bounds = Layout::new(800.0, 600.0).with_element(single("wall", 790.0, 0.0, 50.0, 20.0));
    let overlap = Layout::from_elements(
        800.0,
        600.0,
        vec![
            Element::new("a", "wall", Rect::new(0.0, 0.0, 10.0, 10.0)),
            Element::new("b", "wall", Rect::new(5.0, 5.0, 10.0, 10.0)),
        ],
    );

    let connectivity_score = score(&validate(&disconnected, &scene));
    let bounds_score = score(&validate(&out_of_bounds, &scene));
    let overlap_score = score(&validate(&overlap, &scene));

    assert!(connectivity_score > bounds_score);
    assert!(bounds_score > overlap_score);
    assert!(overlap_score > 0);
}

#[test]
fn test_validation_never_panics_on_garbage() {
    let scene = Scene::parking();
    let layout = Layout::from_elements(
        800.0,
        600.0,
        vec![
            Element::new("nan", "wall", Rect::new(f64::NAN, 0.0, 10.0, 10.0)),
            Element::new("inf", "pillar", Rect::new(0.0, 0.0, f64::INFINITY, 10.0)),
            Element::new("neg", "ground", Rect::new(0.0, 0.0, -10.0, -10.0)),
            Element::new("odd", "spaceship", Rect::new(0.0, 0.0, 10.0, 10.0)),
        ],
    );
    let violations = validate(&layout, &scene);
    let invalid = violations
        .iter()
        .filter(|v| v.kind == ViolationKind::InvalidDimension)
        .count();
    assert_eq!(invalid, 3);
}

#[test]
fn test_racetrack_report() {
    let scene = Scene::parking();
    let engine = Engine::new(scene.clone()).expect("Parking scene should build");
    let report = engine.check(&racetrack(&scene));

    insta::assert_snapshot!(report.to_string(), @r###"
    [overlap] lane_top / column_on_lane: driving_lane "lane_top" and pillar "column_on_lane" overlap by 10x10
    [overlap] walkway / bump: pedestrian_path "walkway" and deceleration_zone "bump" overlap by 20x8
    2 violation(s), score 10
    "###);
}

#[test]
fn test_validation_is_repeatable() {
    let scene = Scene::parking();
    let layout = racetrack(&scene);
    assert_eq!(validate(&layout, &scene), validate(&layout, &scene));
}
