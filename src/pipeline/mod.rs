//! Post-process pipeline
//!
//! A pipeline is the ordered list of passes a scene names, resolved against
//! a [`PassRegistry`] once at construction. Running it folds the layout
//! through every pass left to right; each pass returns a new layout.

pub mod charging;
pub mod cleanup;
pub mod parking;
pub mod registry;
pub mod signs;

pub use charging::place_charging_stations;
pub use cleanup::{clean_intersections, prune_pillars, resolve_priority_conflicts};
pub use parking::fill_parking;
pub use registry::{PassFn, PassRegistry};
pub use signs::orient_guidance_signs;

use crate::layout::Layout;
use crate::scene::{Scene, SceneError};

/// An ordered, resolved list of passes
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<(String, PassFn)>,
}

impl Pipeline {
    /// Resolve the scene's pass list. Unknown names fail here rather than
    /// at run time.
    pub fn for_scene(scene: &Scene, registry: &PassRegistry) -> Result<Self, SceneError> {
        Self::from_names(&scene.passes, registry)
    }

    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        registry: &PassRegistry,
    ) -> Result<Self, SceneError> {
        let stages = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                registry
                    .get(name)
                    .map(|pass| (name.to_string(), pass))
                    .ok_or_else(|| SceneError::UnknownPass {
                        name: name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stages })
    }

    /// Stage names in run order
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply every stage in order.
    pub fn run(&self, layout: &Layout, scene: &Scene) -> Layout {
        let mut current = layout.clone();
        for (name, pass) in &self.stages {
            let before = current.len();
            current = pass(&current, scene);
            log::debug!("pass {}: {} -> {} elements", name, before, current.len());
        }
        current
    }
}
