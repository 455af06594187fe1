//! Bounded exponential backoff around a collaborator

use std::time::Duration;

use crate::session::ModelTier;

use super::corrector::{
    CollaboratorError, CorrectionRequest, GenerationRequest, LayoutCorrector, LayoutGenerator,
    RefinementRequest,
};

/// Retry settings for rate-limited collaborator calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each later one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay after the zero-based failed `attempt`
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Whether another attempt follows the zero-based failed `attempt`
    pub fn should_retry(&self, attempt: u32, error: &CollaboratorError) -> bool {
        matches!(error, CollaboratorError::RateLimited(_)) && attempt + 1 < self.max_attempts
    }

    async fn backoff(&self, attempt: u32, error: &CollaboratorError) {
        let delay = self.delay(attempt);
        log::warn!("{}; retrying in {:?}", error, delay);
        tokio::time::sleep(delay).await;
    }
}

/// Wraps a collaborator so rate-limited calls are retried
#[derive(Debug, Clone)]
pub struct Retrying<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C> Retrying<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: LayoutCorrector> LayoutCorrector for Retrying<C> {
    async fn correct(&mut self, request: CorrectionRequest<'_>) -> Result<String, CollaboratorError> {
        let mut attempt = 0;
        loop {
            match self.inner.correct(request).await {
                Err(err) if self.policy.should_retry(attempt, &err) => {
                    self.policy.backoff(attempt, &err).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl<C: LayoutGenerator> LayoutGenerator for Retrying<C> {
    async fn generate(&mut self, request: GenerationRequest<'_>) -> Result<String, CollaboratorError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(request).await {
                Err(err) if self.policy.should_retry(attempt, &err) => {
                    self.policy.backoff(attempt, &err).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn refine(&mut self, request: RefinementRequest<'_>) -> Result<String, CollaboratorError> {
        let mut attempt = 0;
        loop {
            match self.inner.refine(request).await {
                Err(err) if self.policy.should_retry(attempt, &err) => {
                    self.policy.backoff(attempt, &err).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn probe(&mut self, tier: ModelTier) -> Result<(), CollaboratorError> {
        // probes report reachability as-is
        self.inner.probe(tier).await
    }
}
