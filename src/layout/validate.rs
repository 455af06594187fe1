//! Constraint validator for detecting geometric defects in a layout.
//!
//! Checks run in a fixed order so repeated runs over the same layout report
//! the same violations in the same order: per-element dimension and bounds
//! checks, pairwise overlaps, connectivity of ground and road regions, and
//! finally placement of supported and boundary elements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scene::Scene;

use super::geometry::Rect;
use super::types::{Element, Layout};

/// A detected defect referencing one or two elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub element_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub message: String,
}

/// Category of violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Overlap,
    OutOfBounds,
    InvalidDimension,
    ConnectivityError,
    PlacementError,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Overlap => write!(f, "overlap"),
            ViolationKind::OutOfBounds => write!(f, "out_of_bounds"),
            ViolationKind::InvalidDimension => write!(f, "invalid_dimension"),
            ViolationKind::ConnectivityError => write!(f, "connectivity_error"),
            ViolationKind::PlacementError => write!(f, "placement_error"),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target_id {
            Some(target) => write!(
                f,
                "[{}] {} / {}: {}",
                self.kind, self.element_id, target, self.message
            ),
            None => write!(f, "[{}] {}: {}", self.kind, self.element_id, self.message),
        }
    }
}

impl Violation {
    fn single(element: &Element, kind: ViolationKind, message: String) -> Self {
        Self {
            element_id: element.id.clone(),
            target_id: None,
            kind,
            message,
        }
    }

    fn pair(element: &Element, target: &Element, kind: ViolationKind, message: String) -> Self {
        Self {
            element_id: element.id.clone(),
            target_id: Some(target.id.clone()),
            kind,
            message,
        }
    }
}

/// Run all checks on a layout.
pub fn validate(layout: &Layout, scene: &Scene) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_elements(layout, scene, &mut violations);
    check_overlaps(layout, scene, &mut violations);
    check_ground_connectivity(layout, scene, &mut violations);
    check_road_network(layout, scene, &mut violations);
    check_placement(layout, scene, &mut violations);
    violations
}

fn has_valid_dimensions(element: &Element, scene: &Scene) -> bool {
    let r = element.bounds();
    let finite = r.x.is_finite() && r.y.is_finite() && r.width.is_finite() && r.height.is_finite();
    if !finite {
        return false;
    }
    if scene.rules.tolerates_degenerate(&element.kind) {
        r.width >= 0.0 && r.height >= 0.0 && (r.width > 0.0 || r.height > 0.0)
    } else {
        r.width > 0.0 && r.height > 0.0
    }
}

// ── Dimensions and canvas bounds ──────────────────────────────────

fn check_elements(layout: &Layout, scene: &Scene, violations: &mut Vec<Violation>) {
    for element in layout.elements() {
        if !has_valid_dimensions(element, scene) {
            violations.push(Violation::single(
                element,
                ViolationKind::InvalidDimension,
                format!(
                    "{} \"{}\" has invalid size {}x{}",
                    element.kind, element.id, element.width, element.height
                ),
            ));
            continue;
        }

        let r = element.bounds();
        if r.x < 0.0 || r.y < 0.0 || r.right() > layout.width || r.bottom() > layout.height {
            violations.push(Violation::single(
                element,
                ViolationKind::OutOfBounds,
                format!(
                    "{} \"{}\" extends beyond the {}x{} canvas",
                    element.kind, element.id, layout.width, layout.height
                ),
            ));
        }
    }
}

// ── Overlaps ──────────────────────────────────────────────────────

fn check_overlaps(layout: &Layout, scene: &Scene, violations: &mut Vec<Violation>) {
    let elements: Vec<&Element> = layout
        .elements()
        .iter()
        .filter(|e| has_valid_dimensions(e, scene))
        .collect();

    for i in 0..elements.len() {
        for j in (i + 1)..elements.len() {
            let a = elements[i];
            let b = elements[j];

            if scene.rules.compatible(&a.kind, &b.kind) {
                continue;
            }

            if let Some(overlap) = a.bounds().intersection(&b.bounds()) {
                violations.push(Violation::pair(
                    a,
                    b,
                    ViolationKind::Overlap,
                    format!(
                        "{} \"{}\" and {} \"{}\" overlap by {:.0}x{:.0}",
                        a.kind, a.id, b.kind, b.id, overlap.width, overlap.height
                    ),
                ));
            }
        }
    }
}

// ── Connectivity ──────────────────────────────────────────────────

/// Every ground region must touch a road or another ground region.
fn check_ground_connectivity(layout: &Layout, scene: &Scene, violations: &mut Vec<Violation>) {
    let tolerance = scene.rules.adjacency_tolerance;
    let ground = &scene.types.ground;
    let road = &scene.types.road;

    for element in layout.of_kind(ground) {
        let bounds = element.bounds();
        if bounds.is_degenerate() {
            continue;
        }
        let connected = layout.elements().iter().any(|other| {
            other.id != element.id
                && (other.is(ground) || other.is(road))
                && bounds.is_near(&other.bounds(), tolerance)
        });
        if !connected {
            violations.push(Violation::single(
                element,
                ViolationKind::ConnectivityError,
                format!(
                    "ground \"{}\" does not touch any road or ground region",
                    element.id
                ),
            ));
        }
    }
}

/// Roads must form one connected network; every road outside the
/// largest connected group is reported.
fn check_road_network(layout: &Layout, scene: &Scene, violations: &mut Vec<Violation>) {
    let tolerance = scene.rules.adjacency_tolerance;
    let roads: Vec<&Element> = layout
        .of_kind(&scene.types.road)
        .filter(|e| !e.bounds().is_degenerate())
        .collect();
    if roads.len() < 2 {
        return;
    }

    let groups = connected_groups(&roads, tolerance);
    let mut main = 0;
    for (index, group) in groups.iter().enumerate() {
        if group.len() > groups[main].len() {
            main = index;
        }
    }

    let mut stray: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != main)
        .flat_map(|(_, group)| group.iter().copied())
        .collect();
    stray.sort_unstable();

    for index in stray {
        let road = roads[index];
        violations.push(Violation::single(
            road,
            ViolationKind::ConnectivityError,
            format!(
                "road \"{}\" is disconnected from the main road network",
                road.id
            ),
        ));
    }
}

/// Group element indices by transitive adjacency, in first-seen order
fn connected_groups(elements: &[&Element], tolerance: f64) -> Vec<Vec<usize>> {
    let bounds: Vec<Rect> = elements.iter().map(|e| e.bounds()).collect();
    let mut group_of: Vec<Option<usize>> = vec![None; elements.len()];
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for start in 0..elements.len() {
        if group_of[start].is_some() {
            continue;
        }
        let group_index = groups.len();
        let mut members = vec![start];
        group_of[start] = Some(group_index);
        let mut cursor = 0;
        while cursor < members.len() {
            let current = members[cursor];
            cursor += 1;
            for next in 0..elements.len() {
                if group_of[next].is_none() && bounds[current].is_near(&bounds[next], tolerance) {
                    group_of[next] = Some(group_index);
                    members.push(next);
                }
            }
        }
        groups.push(members);
    }

    groups
}

// ── Placement ─────────────────────────────────────────────────────

fn check_placement(layout: &Layout, scene: &Scene, violations: &mut Vec<Violation>) {
    let tolerance = scene.rules.adjacency_tolerance;
    let footprints: Vec<Rect> = layout
        .elements()
        .iter()
        .filter(|e| e.is(&scene.types.ground) || e.is(&scene.types.road))
        .map(Element::bounds)
        .collect();
    let canvas = layout.canvas();

    for element in layout.elements() {
        if !has_valid_dimensions(element, scene) {
            continue;
        }
        let bounds = element.bounds();

        if scene.rules.is_supported(&element.kind)
            && !footprints.iter().any(|f| f.encloses(&bounds, tolerance))
        {
            violations.push(Violation::single(
                element,
                ViolationKind::PlacementError,
                format!(
                    "{} \"{}\" is not placed on any ground or road region",
                    element.kind, element.id
                ),
            ));
        }

        if scene.rules.is_boundary(&element.kind) && !touches_canvas_edge(&bounds, &canvas, tolerance)
        {
            violations.push(Violation::single(
                element,
                ViolationKind::PlacementError,
                format!(
                    "{} \"{}\" must touch an edge of the canvas",
                    element.kind, element.id
                ),
            ));
        }
    }
}

fn touches_canvas_edge(bounds: &Rect, canvas: &Rect, tolerance: f64) -> bool {
    bounds.x.abs() <= tolerance
        || bounds.y.abs() <= tolerance
        || (canvas.right() - bounds.right()).abs() <= tolerance
        || (canvas.bottom() - bounds.bottom()).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(id: &str, kind: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(id, kind, Rect::new(x, y, w, h))
    }

    fn layout(elements: Vec<Element>) -> Layout {
        Layout::from_elements(800.0, 600.0, elements)
    }

    fn kinds(violations: &[Violation]) -> Vec<ViolationKind> {
        violations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_overlapping_walls() {
        let scene = Scene::parking();
        let l = layout(vec![
            rect("w1", "wall", 0.0, 0.0, 10.0, 10.0),
            rect("w2", "wall", 5.0, 5.0, 10.0, 10.0),
        ]);
        let violations = validate(&l, &scene);
        assert_eq!(kinds(&violations), vec![ViolationKind::Overlap]);
        assert_eq!(violations[0].element_id, "w1");
        assert_eq!(violations[0].target_id.as_deref(), Some("w2"));
    }

    #[test]
    fn test_compatible_overlap_is_ignored() {
        let scene = Scene::parking();
        let l = layout(vec![
            rect("w1", "wall", 0.0, 0.0, 100.0, 10.0),
            rect("line", "ground_line", 0.0, 5.0, 100.0, 0.0),
        ]);
        assert!(validate(&l, &scene).is_empty());
    }

    #[test]
    fn test_touching_walls_do_not_overlap() {
        let scene = Scene::parking();
        let l = layout(vec![
            rect("w1", "wall", 0.0, 0.0, 10.0, 10.0),
            rect("w2", "wall", 10.0, 0.0, 10.0, 10.0),
        ]);
        assert!(validate(&l, &scene).is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let scene = Scene::parking();
        let l = layout(vec![rect("w1", "wall", 790.0, 0.0, 50.0, 20.0)]);
        assert_eq!(kinds(&validate(&l, &scene)), vec![ViolationKind::OutOfBounds]);
    }

    #[test]
    fn test_invalid_dimension() {
        let scene = Scene::parking();
        let l = layout(vec![
            rect("w1", "wall", 10.0, 10.0, 0.0, 20.0),
            rect("w2", "wall", 10.0, 10.0, f64::NAN, 20.0),
            rect("w3", "wall", 10.0, 10.0, -4.0, 20.0),
        ]);
        assert_eq!(
            kinds(&validate(&l, &scene)),
            vec![ViolationKind::InvalidDimension; 3]
        );
    }

    #[test]
    fn test_degenerate_line_tolerated() {
        let scene = Scene::parking();
        let l = layout(vec![rect("l1", "ground_line", 10.0, 10.0, 100.0, 0.0)]);
        assert!(validate(&l, &scene).is_empty());
    }

    #[test]
    fn test_floating_ground_island() {
        let scene = Scene::parking();
        let l = layout(vec![
            rect("r1", "driving_lane", 100.0, 40.0, 400.0, 60.0),
            rect("g1", "ground", 100.0, 100.0, 400.0, 100.0),
            rect("g2", "ground", 100.0, 400.0, 100.0, 100.0),
        ]);
        let violations = validate(&l, &scene);
        assert_eq!(kinds(&violations), vec![ViolationKind::ConnectivityError]);
        assert_eq!(violations[0].element_id, "g2");
    }

    #[test]
    fn test_ground_chain_is_connected() {
        let scene = Scene::parking();
        let l = layout(vec![
            rect("r1", "driving_lane", 100.0, 40.0, 400.0, 60.0),
            rect("g1", "ground", 100.0, 100.0, 400.0, 100.0),
            rect("g2", "ground", 100.0, 203.0, 400.0, 100.0),
        ]);
        assert!(validate(&l, &scene).is_empty());
    }

    #[test]
    fn test_disconnected_road() {
        let scene = Scene::parking();
        let l = layout(vec![
            rect("r1", "driving_lane", 60.0, 60.0, 680.0, 60.0),
            rect("r2", "driving_lane", 60.0, 60.0, 60.0, 480.0),
            rect("r3", "driving_lane", 300.0, 400.0, 100.0, 60.0),
        ]);
        let violations = validate(&l, &scene);
        assert_eq!(kinds(&violations), vec![ViolationKind::ConnectivityError]);
        assert_eq!(violations[0].element_id, "r3");
    }

    #[test]
    fn test_facility_must_sit_on_ground() {
        let scene = Scene::parking();
        let l = layout(vec![
            rect("r1", "driving_lane", 100.0, 40.0, 400.0, 60.0),
            rect("g1", "ground", 100.0, 100.0, 400.0, 100.0),
            rect("p1", "pillar", 150.0, 150.0, 10.0, 10.0),
            rect("p2", "pillar", 600.0, 400.0, 10.0, 10.0),
        ]);
        let violations = validate(&l, &scene);
        assert_eq!(kinds(&violations), vec![ViolationKind::PlacementError]);
        assert_eq!(violations[0].element_id, "p2");
    }

    #[test]
    fn test_exit_must_touch_canvas_edge() {
        let scene = Scene::parking();
        let l = layout(vec![
            rect("e1", "exit", 0.0, 200.0, 20.0, 40.0),
            rect("e2", "exit", 300.0, 200.0, 20.0, 40.0),
        ]);
        let violations = validate(&l, &scene);
        assert_eq!(kinds(&violations), vec![ViolationKind::PlacementError]);
        assert_eq!(violations[0].element_id, "e2");
    }

    #[test]
    fn test_validation_is_deterministic() {
        let scene = Scene::parking();
        let l = layout(vec![
            rect("w1", "wall", 0.0, 0.0, 10.0, 10.0),
            rect("w2", "wall", 5.0, 5.0, 10.0, 10.0),
            rect("w3", "wall", 790.0, 0.0, 50.0, 20.0),
            rect("g1", "ground", 300.0, 300.0, 10.0, 10.0),
        ]);
        assert_eq!(validate(&l, &scene), validate(&l, &scene));
    }

    #[test]
    fn test_violation_display() {
        let v = Violation {
            element_id: "a".to_string(),
            target_id: Some("b".to_string()),
            kind: ViolationKind::Overlap,
            message: "boom".to_string(),
        };
        assert_eq!(v.to_string(), "[overlap] a / b: boom");
    }

    #[test]
    fn test_violation_serializes_like_wire_format() {
        let v = Violation {
            element_id: "a".to_string(),
            target_id: None,
            kind: ViolationKind::OutOfBounds,
            message: "m".to_string(),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["elementId"], "a");
        assert_eq!(json["type"], "out_of_bounds");
        assert!(json.get("targetId").is_none());
    }
}
