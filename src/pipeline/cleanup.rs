//! Removal passes: intersection debris, misplaced pillars, speed bumps on
//! sidewalks

use std::collections::HashSet;

use crate::layout::{Element, Layout, Rect};
use crate::scene::Scene;

// ── Intersection debris ───────────────────────────────────────────

/// Remove debris whose center lies strictly inside a road crossing.
///
/// Only crossings larger than the threshold in both dimensions count.
pub fn clean_intersections(layout: &Layout, scene: &Scene) -> Layout {
    let min = scene.cleanup.min_intersection;
    let roads = layout.bounds_of(&scene.types.road);

    let mut crossings: Vec<Rect> = Vec::new();
    for i in 0..roads.len() {
        for j in (i + 1)..roads.len() {
            if let Some(crossing) = roads[i].intersection(&roads[j]) {
                if crossing.width > min && crossing.height > min {
                    crossings.push(crossing);
                }
            }
        }
    }
    if crossings.is_empty() {
        return layout.clone();
    }

    let removed: HashSet<&str> = layout
        .elements()
        .iter()
        .filter(|e| scene.rules.is_debris(&e.kind))
        .filter(|e| {
            let center = e.bounds().center();
            crossings.iter().any(|c| c.contains_strictly(center))
        })
        .map(|e| e.id.as_str())
        .collect();

    log::debug!("clean_intersections removed {} elements", removed.len());
    if removed.is_empty() {
        return layout.clone();
    }
    layout.retain(|e| !removed.contains(e.id.as_str()))
}

// ── Pillars ───────────────────────────────────────────────────────

/// Drop pillars standing on a road or inside a parking space.
pub fn prune_pillars(layout: &Layout, scene: &Scene) -> Layout {
    let margin = scene.cleanup.pillar_margin;
    let roads = layout.bounds_of(&scene.types.road);
    let spaces = layout.bounds_of(&scene.types.parking_space);

    let misplaced = |pillar: &Element| {
        let bounds = pillar.bounds();
        roads.iter().any(|r| r.intersects(&bounds))
            || spaces.iter().any(|s| s.encloses_strictly(&bounds, margin))
    };

    let pruned = layout.retain(|e| !(e.is(&scene.types.pillar) && misplaced(e)));
    log::debug!(
        "prune_pillars removed {} pillars",
        layout.len() - pruned.len()
    );
    pruned
}

// ── Priority conflicts ────────────────────────────────────────────

/// Sidewalks win over speed bumps: drop bumps that cut into a sidewalk.
pub fn resolve_priority_conflicts(layout: &Layout, scene: &Scene) -> Layout {
    let threshold = scene.cleanup.conflict_threshold;
    let sidewalks = layout.bounds_of(&scene.types.sidewalk);

    let conflicts = |bump: &Element| {
        let bounds = bump.bounds();
        sidewalks.iter().any(|s| {
            s.intersection(&bounds)
                .is_some_and(|overlap| overlap.width > threshold || overlap.height > threshold)
        })
    };

    let resolved = layout.retain(|e| !(e.is(&scene.types.speed_bump) && conflicts(e)));
    log::debug!(
        "resolve_priority_conflicts removed {} speed bumps",
        layout.len() - resolved.len()
    );
    resolved
}
