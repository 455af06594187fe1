//! Auto-fill parking spaces along road/ground boundaries
//!
//! For every road and every ground region whose edges touch, spots are
//! tiled along the shared edge on the ground side. Spots stand across the
//! edge: a road above or below the ground gives vertical spots, a road to
//! the left or right gives horizontal ones.

use crate::layout::ids::next_sequential;
use crate::layout::{Element, Layout, Rect, Side};
use crate::scene::{ParkingParams, Scene};

/// Tile parking spaces along every road/ground shared edge.
pub fn fill_parking(layout: &Layout, scene: &Scene) -> Layout {
    let params = &scene.parking;
    let obstacles: Vec<Rect> = layout
        .elements()
        .iter()
        .filter(|e| scene.rules.is_obstacle(&e.kind))
        .map(Element::bounds)
        .collect();
    let grounds = layout.bounds_of(&scene.types.ground);
    let roads = layout.bounds_of(&scene.types.road);
    let canvas = layout.canvas();

    let mut taken = layout.ids();
    let mut counter = 0;
    let mut placed: Vec<Element> = Vec::new();

    for road in &roads {
        for ground in &grounds {
            let Some(side) = ground.touching_side(road, params.edge_tolerance) else {
                continue;
            };
            let prefix = match side {
                Side::Top | Side::Bottom => "p_auto_",
                Side::Left | Side::Right => "p_auto_v_",
            };

            for spot in candidate_spots(ground, road, side, &canvas, params) {
                let probe = spot.inset(params.clearance);
                let blocked = obstacles.iter().any(|o| probe.intersects(o))
                    || placed.iter().any(|p| probe.intersects(&p.bounds()));
                if blocked {
                    continue;
                }
                let id = next_sequential(prefix, &mut counter, &taken);
                taken.insert(id.clone());
                placed.push(Element::new(id, scene.types.parking_space.clone(), spot));
            }
        }
    }

    log::debug!("fill_parking placed {} spaces", placed.len());
    if placed.is_empty() {
        return layout.clone();
    }
    let mut elements = layout.elements().to_vec();
    elements.extend(placed);
    layout.with_elements(elements)
}

/// Spots along the edge of `ground` that `road` touches on `side`, limited
/// to the part of the edge that lies on the canvas
fn candidate_spots(
    ground: &Rect,
    road: &Rect,
    side: Side,
    canvas: &Rect,
    params: &ParkingParams,
) -> Vec<Rect> {
    let pitch = params.spot_width + params.gap;
    let inset = params.clearance;

    let (start, end) = match side {
        Side::Top | Side::Bottom => (
            ground.x.max(road.x).max(canvas.x),
            ground.right().min(road.right()).min(canvas.right()),
        ),
        Side::Left | Side::Right => (
            ground.y.max(road.y).max(canvas.y),
            ground.bottom().min(road.bottom()).min(canvas.bottom()),
        ),
    };
    let start = start + params.buffer;
    let end = end - params.buffer;
    let count = ((end - start) / pitch).floor();
    if !(count >= 1.0) {
        return Vec::new();
    }

    (0..count as usize)
        .map(|i| {
            let offset = start + i as f64 * pitch;
            match side {
                Side::Top => Rect::new(offset, ground.y + inset, params.spot_width, params.spot_length),
                Side::Bottom => Rect::new(
                    offset,
                    ground.bottom() - params.spot_length - inset,
                    params.spot_width,
                    params.spot_length,
                ),
                Side::Left => Rect::new(ground.x + inset, offset, params.spot_length, params.spot_width),
                Side::Right => Rect::new(
                    ground.right() - params.spot_length - inset,
                    offset,
                    params.spot_length,
                    params.spot_width,
                ),
            }
        })
        .filter(|spot| canvas.encloses(spot, 0.0))
        .collect()
}
