//! Charging-station placement on every n-th parking space

use crate::layout::ids::next_sequential;
use crate::layout::{Element, Layout, Point, Rect};
use crate::scene::{ChargingParams, Scene};

/// Add one station to every `stride`-th parking space in row order.
pub fn place_charging_stations(layout: &Layout, scene: &Scene) -> Layout {
    let params = &scene.charging;
    if params.stride == 0 {
        return layout.clone();
    }

    let spaces = row_order(layout.bounds_of(&scene.types.parking_space), params.row_band);
    let road_centers: Vec<Point> = layout
        .bounds_of(&scene.types.road)
        .iter()
        .map(Rect::center)
        .collect();

    let mut taken = layout.ids();
    let mut counter = 0;
    let mut stations = Vec::new();

    for (index, space) in spaces.iter().enumerate() {
        if (index + 1) % params.stride != 0 {
            continue;
        }
        let Some(spot) = best_position(space, &road_centers, params) else {
            continue;
        };
        let id = next_sequential("charging_", &mut counter, &taken);
        taken.insert(id.clone());
        stations.push(Element::new(
            id,
            scene.types.charging_station.clone(),
            Rect::new(spot.x, spot.y, params.station_size, params.station_size),
        ));
    }

    log::debug!("place_charging_stations added {} stations", stations.len());
    if stations.is_empty() {
        return layout.clone();
    }
    let mut elements = layout.elements().to_vec();
    elements.extend(stations);
    layout.with_elements(elements)
}

/// Sort spaces into rows, then left to right within a row.
///
/// A row starts at the topmost unplaced space and takes every space whose
/// y is within `band` of that first one.
fn row_order(mut spaces: Vec<Rect>, band: f64) -> Vec<Rect> {
    spaces.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut ordered = Vec::with_capacity(spaces.len());
    let mut row: Vec<Rect> = Vec::new();
    let mut row_start = f64::NEG_INFINITY;

    for space in spaces {
        if space.y - row_start >= band {
            flush_row(&mut row, &mut ordered);
            row_start = space.y;
        }
        row.push(space);
    }
    flush_row(&mut row, &mut ordered);
    ordered
}

fn flush_row(row: &mut Vec<Rect>, ordered: &mut Vec<Rect>) {
    row.sort_by(|a, b| a.x.total_cmp(&b.x));
    ordered.append(row);
}

/// Top-left corner of the station inside `space` farthest from every road.
///
/// Vertical spaces offer their top and bottom edge positions, horizontal
/// ones their left and right. The first candidate wins ties.
fn best_position(space: &Rect, road_centers: &[Point], params: &ChargingParams) -> Option<Point> {
    let size = params.station_size;
    let inset = params.inset;
    let mid_x = space.x + space.width / 2.0 - size / 2.0;
    let mid_y = space.y + space.height / 2.0 - size / 2.0;

    let candidates = if space.height > space.width {
        [
            Point::new(mid_x, space.y + inset),
            Point::new(mid_x, space.bottom() - size - inset),
        ]
    } else {
        [
            Point::new(space.x + inset, mid_y),
            Point::new(space.right() - size - inset, mid_y),
        ]
    };

    let mut best = None;
    let mut best_distance = -1.0;
    for candidate in candidates {
        let nearest = road_centers
            .iter()
            .map(|c| candidate.distance(*c))
            .min_by(f64::total_cmp)
            .unwrap_or(f64::INFINITY);
        if nearest > best_distance {
            best_distance = nearest;
            best = Some(candidate);
        }
    }
    best
}
