//! Iterative repair loop
//!
//! Each pass validates the current layout and scores it. A zero score ends
//! the loop as converged. A score that fails to improve on the previous
//! pass ends it as stagnant, keeping the better earlier layout. Otherwise the
//! corrector is asked for a partial fix, which is merged in by identity
//! before the next pass. The loop never retries the corrector itself.

pub mod corrector;
pub mod retry;

pub use corrector::{
    CollaboratorError, CorrectionRequest, GenerationRequest, LayoutCorrector, LayoutGenerator,
    RefinementRequest,
};
pub use retry::{RetryPolicy, Retrying};

use std::fmt;

use crate::layout::{merge, score, validate, Layout, Violation};
use crate::scene::Scene;
use crate::session::{ModelTier, Session};
use crate::wire;

/// Tunables for the repair loop
#[derive(Debug, Clone, PartialEq)]
pub struct RepairConfig {
    pub max_passes: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self { max_passes: 4 }
    }
}

impl RepairConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }
}

/// How the loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    /// No violations remain, including after the last permitted correction
    Converged,
    /// The score stopped improving
    Stagnant,
    /// Every pass was used and violations remain
    MaxPassesReached,
    /// The corrector failed or sent something undecodable
    CorrectionFailed(String),
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Converged => write!(f, "converged"),
            Terminal::Stagnant => write!(f, "stagnant"),
            Terminal::MaxPassesReached => write!(f, "max passes reached"),
            Terminal::CorrectionFailed(reason) => write!(f, "correction failed: {}", reason),
        }
    }
}

/// Result of a repair run. Imperfect layouts are still returned.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairOutcome {
    pub layout: Layout,
    pub terminal: Terminal,
    /// Number of passes entered
    pub passes: usize,
    /// Score of `layout`
    pub score: u32,
    /// Violations of `layout`
    pub violations: Vec<Violation>,
}

impl RepairOutcome {
    pub fn is_converged(&self) -> bool {
        self.terminal == Terminal::Converged
    }
}

/// Drive `layout` toward zero violations.
pub async fn repair<C: LayoutCorrector>(
    layout: Layout,
    scene: &Scene,
    corrector: &mut C,
    session: &mut Session,
    config: &RepairConfig,
) -> RepairOutcome {
    let tier = session.tier().unwrap_or(ModelTier::Low);
    let mut current = layout;
    let mut best: Option<(Layout, u32, Vec<Violation>)> = None;

    for pass in 1..=config.max_passes {
        let violations = validate(&current, scene);
        let current_score = score(&violations);

        if current_score == 0 {
            log::info!("Pass {}: layout validated (score 0)", pass);
            return RepairOutcome {
                layout: current,
                terminal: Terminal::Converged,
                passes: pass,
                score: 0,
                violations,
            };
        }

        if let Some((previous, previous_score, previous_violations)) = best.take() {
            if current_score >= previous_score {
                log::info!("Stagnation at pass {} (score {})", pass, current_score);
                return RepairOutcome {
                    layout: previous,
                    terminal: Terminal::Stagnant,
                    passes: pass,
                    score: previous_score,
                    violations: previous_violations,
                };
            }
        }

        log::info!(
            "Auto-fixing pass {}/{} (score {})",
            pass,
            config.max_passes,
            current_score
        );

        let simplified = wire::encode(&current);
        let request = CorrectionRequest {
            layout: &simplified,
            violations: &violations,
            scene,
            tier,
            pass,
        };
        let payload = match corrector.correct(request).await {
            Ok(text) => wire::decode(&text)
                .map_err(|err| CollaboratorError::Malformed(err.to_string())),
            Err(err) => Err(err),
        };

        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("Fix failed: {}", err);
                if matches!(err, CollaboratorError::Unavailable(_)) {
                    session.downgrade();
                }
                return RepairOutcome {
                    layout: current,
                    terminal: Terminal::CorrectionFailed(err.to_string()),
                    passes: pass,
                    score: current_score,
                    violations,
                };
            }
        };

        for step in &payload.fix_strategy {
            log::info!("Correction step: {}", step);
        }

        let merged = merge(&current, payload.elements, session.ids(), &scene.canvas);
        best = Some((current, current_score, violations));
        current = scene.normalize(&merged);
    }

    // the last correction is checked once more, without another call
    let violations = validate(&current, scene);
    let final_score = score(&violations);
    let terminal = if final_score == 0 {
        Terminal::Converged
    } else {
        Terminal::MaxPassesReached
    };
    RepairOutcome {
        score: final_score,
        layout: current,
        terminal,
        passes: config.max_passes,
        violations,
    }
}
