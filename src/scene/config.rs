//! Scene configuration loaded from TOML
//!
//! A scene supplies everything the core needs to know about a facility
//! domain: its type vocabulary and synonyms, which types play which
//! geometric role, the ordered list of post-process passes, and the
//! numeric parameters those passes use. The geometric rules text is carried
//! opaquely and forwarded to the external collaborators.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::{Element, Layout};

/// Errors that can occur when loading scenes or assembling their pipelines
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scene TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("unknown post-process pass: {name}")]
    UnknownPass { name: String },
    #[error("duplicate post-process pass: {name}")]
    DuplicatePass { name: String },
    #[error("scene not found: {id}")]
    UnknownScene { id: String },
    #[error("duplicate scene definition: {id}")]
    DuplicateScene { id: String },
}

/// Built-in underground parking scene
const PARKING_SCENE: &str = include_str!("parking.toml");

/// Canvas defaults used when a response leaves sizes out
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasDefaults {
    pub width: f64,
    pub height: f64,
    pub element_width: f64,
    pub element_height: f64,
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            element_width: 10.0,
            element_height: 10.0,
        }
    }
}

/// Text forwarded to the generative collaborators, never interpreted here
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub role: String,
    pub rules: String,
    pub required_elements: Vec<String>,
}

/// Registered vocabulary and the type tags that play each geometric role
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TypeRoles {
    pub vocabulary: Vec<String>,
    pub ground: String,
    pub road: String,
    pub sidewalk: String,
    pub parking_space: String,
    pub pillar: String,
    pub exit: String,
    pub guidance_sign: String,
    pub speed_bump: String,
    pub charging_station: String,
}

impl Default for TypeRoles {
    fn default() -> Self {
        Self {
            vocabulary: Vec::new(),
            ground: "ground".to_string(),
            road: "driving_lane".to_string(),
            sidewalk: "pedestrian_path".to_string(),
            parking_space: "parking_space".to_string(),
            pillar: "pillar".to_string(),
            exit: "exit".to_string(),
            guidance_sign: "guidance_sign".to_string(),
            speed_bump: "deceleration_zone".to_string(),
            charging_station: "charging_station".to_string(),
        }
    }
}

/// Geometric rule tables consumed by the validator and the passes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Gap under which two edges count as touching
    pub adjacency_tolerance: f64,
    /// Types that auto-filled parking spaces must avoid
    pub obstacles: Vec<String>,
    /// Types swept out of road intersections
    pub debris: Vec<String>,
    /// Types that must sit inside a ground or road footprint
    pub supported: Vec<String>,
    /// Types that must touch a canvas edge
    pub boundary: Vec<String>,
    /// Line-like types allowed a zero width or height
    pub degenerate: Vec<String>,
    /// Type pairs allowed to overlap; `*` matches any type
    pub compatible_overlaps: Vec<[String; 2]>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            adjacency_tolerance: 5.0,
            obstacles: Vec::new(),
            debris: Vec::new(),
            supported: Vec::new(),
            boundary: Vec::new(),
            degenerate: Vec::new(),
            compatible_overlaps: Vec::new(),
        }
    }
}

impl RuleSet {
    /// Whether elements of these two types may overlap
    pub fn compatible(&self, a: &str, b: &str) -> bool {
        let matches = |pattern: &str, kind: &str| pattern == "*" || pattern == kind;
        self.compatible_overlaps.iter().any(|[p, q]| {
            (matches(p, a) && matches(q, b)) || (matches(p, b) && matches(q, a))
        })
    }

    pub fn is_obstacle(&self, kind: &str) -> bool {
        self.obstacles.iter().any(|k| k == kind)
    }

    pub fn is_debris(&self, kind: &str) -> bool {
        self.debris.iter().any(|k| k == kind)
    }

    pub fn is_supported(&self, kind: &str) -> bool {
        self.supported.iter().any(|k| k == kind)
    }

    pub fn is_boundary(&self, kind: &str) -> bool {
        self.boundary.iter().any(|k| k == kind)
    }

    pub fn tolerates_degenerate(&self, kind: &str) -> bool {
        self.degenerate.iter().any(|k| k == kind)
    }
}

/// Parking-space tiling parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParkingParams {
    /// Short side of a spot
    pub spot_width: f64,
    /// Long side of a spot
    pub spot_length: f64,
    pub gap: f64,
    /// Inset from the ends of the shared edge
    pub buffer: f64,
    /// Max gap between road and ground edges for them to count as adjacent
    pub edge_tolerance: f64,
    /// Erosion applied to a candidate spot before collision tests
    pub clearance: f64,
}

impl Default for ParkingParams {
    fn default() -> Self {
        Self {
            spot_width: 24.0,
            spot_length: 48.0,
            gap: 2.0,
            buffer: 4.0,
            edge_tolerance: 12.0,
            clearance: 1.0,
        }
    }
}

/// Charging-station placement parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChargingParams {
    pub station_size: f64,
    pub inset: f64,
    /// Spaces whose y differs by less than this share a row
    pub row_band: f64,
    /// Every n-th space gets a station
    pub stride: usize,
}

impl Default for ChargingParams {
    fn default() -> Self {
        Self {
            station_size: 10.0,
            inset: 2.0,
            row_band: 10.0,
            stride: 3,
        }
    }
}

/// Thresholds for the cleanup passes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CleanupParams {
    /// Road overlaps must exceed this in both dimensions to count as an intersection
    pub min_intersection: f64,
    /// Inward margin for a pillar to count as inside a parking space
    pub pillar_margin: f64,
    /// Speed bump / sidewalk overlap extent that triggers removal
    pub conflict_threshold: f64,
    /// Slack when deciding which road a guidance sign stands on
    pub sign_tolerance: f64,
}

impl Default for CleanupParams {
    fn default() -> Self {
        Self {
            min_intersection: 20.0,
            pillar_margin: 2.0,
            conflict_threshold: 2.0,
            sign_tolerance: 5.0,
        }
    }
}

/// A complete scene definition
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: String,
    pub name: String,
    pub description: String,
    pub canvas: CanvasDefaults,
    pub prompt: PromptConfig,
    pub types: TypeRoles,
    /// Synonym -> canonical type tag
    pub normalization: HashMap<String, String>,
    /// Ordered post-process pass names
    pub passes: Vec<String>,
    pub rules: RuleSet,
    pub parking: ParkingParams,
    pub charging: ChargingParams,
    pub cleanup: CleanupParams,
}

/// TOML structure for deserializing scenes
#[derive(Deserialize)]
struct TomlScene {
    scene: TomlMetadata,
    #[serde(default)]
    canvas: CanvasDefaults,
    #[serde(default)]
    prompt: PromptConfig,
    #[serde(default)]
    types: TypeRoles,
    #[serde(default)]
    normalization: HashMap<String, String>,
    #[serde(default)]
    pipeline: TomlPipeline,
    #[serde(default)]
    rules: RuleSet,
    #[serde(default)]
    parking: ParkingParams,
    #[serde(default)]
    charging: ChargingParams,
    #[serde(default)]
    cleanup: CleanupParams,
}

#[derive(Deserialize)]
struct TomlMetadata {
    id: String,
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Default)]
struct TomlPipeline {
    #[serde(default)]
    passes: Vec<String>,
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a scene from a TOML string
    pub fn from_str(content: &str) -> Result<Self, SceneError> {
        let parsed: TomlScene = toml::from_str(content)?;

        let normalization = parsed
            .normalization
            .into_iter()
            .map(|(from, to)| (from.trim().to_lowercase(), to))
            .collect();

        Ok(Scene {
            name: parsed.scene.name.unwrap_or_else(|| parsed.scene.id.clone()),
            id: parsed.scene.id,
            description: parsed.scene.description.unwrap_or_default(),
            canvas: parsed.canvas,
            prompt: parsed.prompt,
            types: parsed.types,
            normalization,
            passes: parsed.pipeline.passes,
            rules: parsed.rules,
            parking: parsed.parking,
            charging: parsed.charging,
            cleanup: parsed.cleanup,
        })
    }

    /// The built-in underground parking scene
    pub fn parking() -> Self {
        Self::default()
    }

    /// Canonical form of a type tag: trimmed, lower-cased, synonyms resolved
    pub fn normalize_kind(&self, kind: &str) -> String {
        let key = kind.trim().to_lowercase();
        match self.normalization.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    /// Copy of the layout with every type tag normalized. Tags still
    /// outside the vocabulary afterwards are kept and logged.
    pub fn normalize(&self, layout: &Layout) -> Layout {
        let normalized = layout.map(|e| Element {
            kind: self.normalize_kind(&e.kind),
            ..e.clone()
        });
        for kind in self.unregistered_kinds(&normalized) {
            log::warn!("Type \"{}\" is not in the {} vocabulary", kind, self.id);
        }
        normalized
    }

    /// Whether a type tag belongs to this scene's vocabulary. An empty
    /// vocabulary accepts every tag.
    pub fn is_registered(&self, kind: &str) -> bool {
        self.types.vocabulary.is_empty() || self.types.vocabulary.iter().any(|k| k == kind)
    }

    /// Distinct type tags in `layout` outside the vocabulary, sorted
    pub fn unregistered_kinds(&self, layout: &Layout) -> Vec<String> {
        let mut kinds: Vec<String> = layout
            .elements()
            .iter()
            .filter(|e| !self.is_registered(&e.kind))
            .map(|e| e.kind.clone())
            .collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::from_str(PARKING_SCENE).expect("Built-in parking scene should be valid TOML")
    }
}
