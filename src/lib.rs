//! Spatial Engine - constraint checking and repair for 2-D facility layouts
//!
//! This library validates rectangle layouts against a scene's geometric
//! rules, completes them with deterministic post-process passes (parking
//! spaces, charging stations, debris cleanup, sign orientation) and drives
//! them toward zero violations with an external corrector.
//!
//! # Example
//!
//! ```rust
//! use spatial_engine::{Element, Engine, Layout, Rect, Scene};
//!
//! let engine = Engine::new(Scene::parking()).unwrap();
//! let layout = Layout::new(800.0, 600.0)
//!     .with_element(Element::new("w1", "wall", Rect::new(0.0, 0.0, 10.0, 10.0)))
//!     .with_element(Element::new("w2", "wall", Rect::new(5.0, 5.0, 10.0, 10.0)));
//!
//! let report = engine.check(&layout);
//! assert_eq!(report.score, 5);
//! ```

pub mod error;
pub mod layout;
pub mod pipeline;
pub mod repair;
pub mod scene;
pub mod session;
pub mod wire;

pub use error::DecodeError;
pub use layout::{
    merge, score, validate, Element, ElementPatch, IdGenerator, Layout, Point, Rect, Violation,
    ViolationKind,
};
pub use pipeline::{PassFn, PassRegistry, Pipeline};
pub use repair::{
    repair, CollaboratorError, CorrectionRequest, GenerationRequest, LayoutCorrector,
    LayoutGenerator, RefinementRequest, RepairConfig, RepairOutcome, RetryPolicy, Retrying,
    Terminal,
};
pub use scene::{Scene, SceneError, SceneRegistry};
pub use session::{ModelTier, Session};

use std::fmt;

use thiserror::Error;

/// Errors that stop a generation or refinement request outright
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("could not decode collaborator response: {0}")]
    Decode(#[from] DecodeError),
}

/// Violations of a layout together with their score
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub violations: Vec<Violation>,
    pub score: u32,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{}", violation)?;
        }
        write!(
            f,
            "{} violation(s), score {}",
            self.violations.len(),
            self.score
        )
    }
}

/// A scene with its resolved pipeline and repair settings
#[derive(Debug, Clone)]
pub struct Engine {
    scene: Scene,
    pipeline: Pipeline,
    repair: RepairConfig,
}

impl Engine {
    /// Engine for `scene` using the built-in passes
    pub fn new(scene: Scene) -> Result<Self, SceneError> {
        Self::with_registry(scene, &PassRegistry::builtin())
    }

    /// Engine for `scene` resolving its passes against `registry`
    pub fn with_registry(scene: Scene, registry: &PassRegistry) -> Result<Self, SceneError> {
        let pipeline = Pipeline::for_scene(&scene, registry)?;
        Ok(Self {
            scene,
            pipeline,
            repair: RepairConfig::default(),
        })
    }

    /// Set the repair loop configuration
    pub fn with_repair(mut self, config: RepairConfig) -> Self {
        self.repair = config;
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn repair_config(&self) -> &RepairConfig {
        &self.repair
    }

    /// Normalize type tags and run the scene pipeline
    pub fn prepare(&self, layout: &Layout) -> Layout {
        let normalized = self.scene.normalize(layout);
        self.pipeline.run(&normalized, &self.scene)
    }

    /// Validate and score a layout as-is
    pub fn check(&self, layout: &Layout) -> Report {
        let violations = validate(layout, &self.scene);
        let score = score(&violations);
        Report { violations, score }
    }

    /// Generate a layout from a free-text description.
    ///
    /// The generator's response is decoded, normalized and repaired; the
    /// final layout's geometry is rounded to whole units. The outcome's score
    /// and violations describe the layout before rounding.
    pub async fn generate<M>(
        &self,
        description: &str,
        model: &mut M,
        session: &mut Session,
    ) -> Result<RepairOutcome, EngineError>
    where
        M: LayoutGenerator + LayoutCorrector,
    {
        let tier = session.resolve_tier(model).await;
        log::info!("Generating with the {} model tier", tier);

        let request = GenerationRequest {
            description,
            scene: &self.scene,
            tier,
        };
        let text = model.generate(request).await.map_err(|err| {
            downgrade_on_unavailable(session, &err);
            err
        })?;

        let payload = wire::decode(&text)?;
        if let Some(plan) = &payload.reasoning_plan {
            log::info!("Plan: {}", plan);
        }
        let layout = self.scene.normalize(&payload.into_layout(&self.scene, session.ids()));

        let mut outcome = repair(layout, &self.scene, model, session, &self.repair).await;
        outcome.layout = outcome.layout.rounded();
        Ok(outcome)
    }

    /// Ask the generator to extend `current`, then run the pipeline and the
    /// repair loop over the combined layout.
    pub async fn refine<M>(
        &self,
        current: &Layout,
        model: &mut M,
        session: &mut Session,
    ) -> Result<RepairOutcome, EngineError>
    where
        M: LayoutGenerator + LayoutCorrector,
    {
        let tier = session.resolve_tier(model).await;

        let simplified = wire::encode(current);
        let request = RefinementRequest {
            layout: &simplified,
            scene: &self.scene,
            tier,
        };
        let text = model.refine(request).await.map_err(|err| {
            downgrade_on_unavailable(session, &err);
            err
        })?;

        let payload = wire::decode(&text)?;
        if let Some(plan) = &payload.reasoning_plan {
            log::info!("Refinement plan: {}", plan);
        }
        let combined = merge(current, payload.elements, session.ids(), &self.scene.canvas);
        let layout = self.prepare(&combined);

        let mut outcome = repair(layout, &self.scene, model, session, &self.repair).await;
        outcome.layout = outcome.layout.rounded();
        Ok(outcome)
    }
}

fn downgrade_on_unavailable(session: &mut Session, err: &CollaboratorError) {
    if matches!(err, CollaboratorError::Unavailable(_)) {
        session.downgrade();
    }
}
