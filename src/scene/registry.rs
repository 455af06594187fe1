//! Scene registry for looking up scene definitions by id

use std::collections::HashMap;
use std::path::Path;

use super::config::{Scene, SceneError};

/// Registry of available scenes
#[derive(Debug, Default)]
pub struct SceneRegistry {
    scenes: HashMap<String, Scene>,
}

impl SceneRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in scenes
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let parking = Scene::parking();
        registry.scenes.insert(parking.id.clone(), parking);
        registry
    }

    /// Register a scene
    pub fn register(&mut self, scene: Scene) -> Result<(), SceneError> {
        if self.scenes.contains_key(&scene.id) {
            return Err(SceneError::DuplicateScene {
                id: scene.id.clone(),
            });
        }
        self.scenes.insert(scene.id.clone(), scene);
        Ok(())
    }

    /// Load a scene from a TOML file and register it, returning its id
    pub fn load_file(&mut self, path: &Path) -> Result<String, SceneError> {
        let scene = Scene::from_file(path)?;
        let id = scene.id.clone();
        self.register(scene)?;
        Ok(id)
    }

    /// Get a scene by id
    pub fn get(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    /// Get a scene by id, failing if it is not registered
    pub fn require(&self, id: &str) -> Result<&Scene, SceneError> {
        self.scenes.get(id).ok_or_else(|| SceneError::UnknownScene { id: id.to_string() })
    }

    /// Check if a scene exists
    pub fn contains(&self, id: &str) -> bool {
        self.scenes.contains_key(id)
    }

    /// Registered scene ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.scenes.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}
