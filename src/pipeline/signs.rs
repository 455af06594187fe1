//! Point guidance signs toward the nearest exit

use crate::layout::{Element, Layout, Point, Rect};
use crate::scene::Scene;

/// Rotate each guidance sign along its road toward the nearest exit.
///
/// A sign standing on a road points along that road's long axis: 0 or 180
/// degrees on a horizontal road, 90 or 270 on a vertical one. A sign on no
/// road points along whichever axis the exit is farther away on. Layouts
/// without exits are returned unchanged.
pub fn orient_guidance_signs(layout: &Layout, scene: &Scene) -> Layout {
    let exits: Vec<Point> = layout
        .bounds_of(&scene.types.exit)
        .iter()
        .map(Rect::center)
        .collect();
    if exits.is_empty() {
        return layout.clone();
    }
    let roads = layout.bounds_of(&scene.types.road);
    let tolerance = scene.cleanup.sign_tolerance;

    layout.map(|element| {
        if !element.is(&scene.types.guidance_sign) {
            return element.clone();
        }
        let bounds = element.bounds();
        let sign = bounds.center();
        let exit = nearest(sign, &exits);
        let road = roads.iter().find(|r| r.encloses(&bounds, tolerance));

        Element {
            rotation: heading(sign, exit, road),
            ..element.clone()
        }
    })
}

/// Closest point by Manhattan distance; the first one wins ties
fn nearest(from: Point, points: &[Point]) -> Point {
    let mut best = points[0];
    let mut best_distance = f64::INFINITY;
    for point in points {
        let distance = from.manhattan(*point);
        if distance < best_distance {
            best_distance = distance;
            best = *point;
        }
    }
    best
}

fn heading(sign: Point, exit: Point, road: Option<&Rect>) -> f64 {
    let dx = exit.x - sign.x;
    let dy = exit.y - sign.y;
    let along_x = match road {
        Some(road) => road.is_horizontal(),
        None => dx.abs() > dy.abs(),
    };

    match (along_x, dx > 0.0, dy > 0.0) {
        (true, true, _) => 0.0,
        (true, false, _) => 180.0,
        (false, _, true) => 90.0,
        (false, _, false) => 270.0,
    }
}
