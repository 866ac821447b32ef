//! Proposal scoring capability.
//!
//! The scoring service is an external, best-effort evaluator: a black-box
//! function from (pitch, campaign, creator) to a numeric score and feedback
//! text, reached over the network. It is trusted for neither correctness nor
//! availability, so every caller goes through the [`Scorer`] trait and the
//! guard in [`breaker`], and the intake path treats any failure as "proceed
//! without a score".

mod breaker;
mod http;

pub use breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState, GuardedScorer};
pub use http::{HttpScorer, ScorerConfig};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{Campaign, Creator, ScoreReport};

/// Scoring failures. All of these are recoverable from the intake path's
/// perspective; none may block proposal creation.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scoring request timed out after {0:?}")]
    Timeout(Duration),

    #[error("scoring service transport error: {0}")]
    Transport(String),

    #[error("scoring service returned a malformed response: {0}")]
    Malformed(String),

    #[error("scoring service unavailable: {0}")]
    Unavailable(&'static str),
}

/// Capability interface for proposal evaluation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Score a pitch against a campaign and the submitting creator's profile.
    async fn evaluate(
        &self,
        pitch: &str,
        campaign: &Campaign,
        creator: &Creator,
    ) -> Result<ScoreReport, ScoringError>;
}

/// Scorer used when no scoring service is configured. Every call fails with
/// `Unavailable`, which the intake path degrades to an unscored proposal.
pub struct DisabledScorer;

#[async_trait]
impl Scorer for DisabledScorer {
    async fn evaluate(
        &self,
        _pitch: &str,
        _campaign: &Campaign,
        _creator: &Creator,
    ) -> Result<ScoreReport, ScoringError> {
        Err(ScoringError::Unavailable("scoring not configured"))
    }
}
