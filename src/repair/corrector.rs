//! Collaborator interfaces for the generative model
//!
//! The engine never talks to a model directly. Corrections, initial
//! generation and refinement go through these traits, which return the raw
//! response text; decoding stays on this side of the boundary.

use thiserror::Error;

use crate::layout::Violation;
use crate::scene::Scene;
use crate::session::ModelTier;
use crate::wire::WireLayout;

/// Failures reported by a collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// Transient quota signal; worth retrying after a delay
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("model tier unavailable: {0}")]
    Unavailable(String),
    #[error("request failed: {0}")]
    Failed(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// One repair pass worth of context for the corrector
#[derive(Debug, Clone, Copy)]
pub struct CorrectionRequest<'a> {
    pub layout: &'a WireLayout,
    pub violations: &'a [Violation],
    pub scene: &'a Scene,
    pub tier: ModelTier,
    /// 1-based repair pass number
    pub pass: usize,
}

/// Initial layout request from a free-text description
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub description: &'a str,
    pub scene: &'a Scene,
    pub tier: ModelTier,
}

/// Request to extend an existing layout with new elements
#[derive(Debug, Clone, Copy)]
pub struct RefinementRequest<'a> {
    pub layout: &'a WireLayout,
    pub scene: &'a Scene,
    pub tier: ModelTier,
}

/// Proposes partial element sets that reduce the violation score
#[allow(async_fn_in_trait)]
pub trait LayoutCorrector {
    async fn correct(&mut self, request: CorrectionRequest<'_>) -> Result<String, CollaboratorError>;
}

/// Produces whole layouts, or additions to one
#[allow(async_fn_in_trait)]
pub trait LayoutGenerator {
    async fn generate(&mut self, request: GenerationRequest<'_>) -> Result<String, CollaboratorError>;

    async fn refine(&mut self, request: RefinementRequest<'_>) -> Result<String, CollaboratorError>;

    /// Cheap reachability check for a tier
    async fn probe(&mut self, tier: ModelTier) -> Result<(), CollaboratorError>;
}
