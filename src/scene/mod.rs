//! Scene configurations
//!
//! Scenes are data, not code: a TOML document names the type vocabulary,
//! synonym table, rule tables and the ordered pass list. The built-in
//! underground parking scene ships embedded in the crate.

mod config;
mod registry;

pub use config::{
    CanvasDefaults, ChargingParams, CleanupParams, ParkingParams, PromptConfig, RuleSet, Scene,
    SceneError, TypeRoles,
};
pub use registry::SceneRegistry;
