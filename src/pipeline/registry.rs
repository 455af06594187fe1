//! Registry of named post-process passes

use std::collections::HashMap;

use crate::layout::Layout;
use crate::scene::{Scene, SceneError};

use super::{charging, cleanup, parking, signs};

/// A pure layout transform; the input is never modified
pub type PassFn = fn(&Layout, &Scene) -> Layout;

/// Registry of passes that scenes can reference by name
#[derive(Debug, Clone, Default)]
pub struct PassRegistry {
    passes: HashMap<String, PassFn>,
}

impl PassRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in pass
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, PassFn); 6] = [
            ("clean_intersections", cleanup::clean_intersections),
            ("fill_parking", parking::fill_parking),
            ("place_charging_stations", charging::place_charging_stations),
            ("prune_pillars", cleanup::prune_pillars),
            ("resolve_priority_conflicts", cleanup::resolve_priority_conflicts),
            ("orient_guidance_signs", signs::orient_guidance_signs),
        ];
        for (name, pass) in builtins {
            registry.passes.insert(name.to_string(), pass);
        }
        registry
    }

    /// Register a pass under a new name
    pub fn register(&mut self, name: impl Into<String>, pass: PassFn) -> Result<(), SceneError> {
        let name = name.into();
        if self.passes.contains_key(&name) {
            return Err(SceneError::DuplicatePass { name });
        }
        self.passes.insert(name, pass);
        Ok(())
    }

    /// Get a pass by name
    pub fn get(&self, name: &str) -> Option<PassFn> {
        self.passes.get(name).copied()
    }

    /// Check if a pass exists
    pub fn contains(&self, name: &str) -> bool {
        self.passes.contains_key(name)
    }

    /// Registered pass names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.passes.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
