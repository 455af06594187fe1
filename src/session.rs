//! Per-session state shared across generation requests
//!
//! The model tier is probed once and then cached for the session. A failed
//! probe or an explicit [`Session::downgrade`] moves it to `Low`, and nothing
//! moves it back up.

use std::fmt;

use crate::layout::IdGenerator;
use crate::repair::LayoutGenerator;

/// Capability tier of the generative collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    High,
    Low,
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::High => write!(f, "high"),
            ModelTier::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    tier: Option<ModelTier>,
    ids: IdGenerator,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with a deterministic identity generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            tier: None,
            ids: IdGenerator::seeded(seed),
        }
    }

    /// Session whose tier is already known; no probe will run
    pub fn with_tier(mut self, tier: ModelTier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// The cached tier, if resolved
    pub fn tier(&self) -> Option<ModelTier> {
        self.tier
    }

    pub fn ids(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    /// Cached tier, probing the high tier on first use
    pub async fn resolve_tier<G: LayoutGenerator>(&mut self, generator: &mut G) -> ModelTier {
        if let Some(tier) = self.tier {
            return tier;
        }
        log::info!("Checking high-tier model availability");
        let tier = match generator.probe(ModelTier::High).await {
            Ok(()) => {
                log::info!("High-tier model access confirmed");
                ModelTier::High
            }
            Err(err) => {
                log::warn!("High-tier model unavailable ({}), using fallback", err);
                ModelTier::Low
            }
        };
        self.tier = Some(tier);
        tier
    }

    /// Permanently drop to the fallback tier for this session
    pub fn downgrade(&mut self) {
        if self.tier != Some(ModelTier::Low) {
            log::warn!("Downgrading session to the low model tier");
        }
        self.tier = Some(ModelTier::Low);
    }
}
