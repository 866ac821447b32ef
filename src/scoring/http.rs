//! HTTP client for the scoring service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Campaign, Creator, ScoreReport};

use super::{Scorer, ScoringError};

/// Default request timeout when `SCORING_TIMEOUT_MS` is unset.
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Scoring service configuration.
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Evaluation endpoint URL.
    pub endpoint: String,
    /// Optional bearer token for the scoring service.
    pub api_key: Option<String>,
    /// Upper bound on a single evaluation round-trip.
    pub timeout: Duration,
}

impl ScorerConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `SCORING_URL` is unset; deployments without a
    /// scoring service run with scoring disabled.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("SCORING_URL").ok()?;
        let api_key = std::env::var("SCORING_API_KEY").ok();
        let timeout = std::env::var("SCORING_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);

        Some(Self {
            endpoint,
            api_key,
            timeout,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationRequest<'a> {
    pitch: &'a str,
    campaign: CampaignSnapshot<'a>,
    creator: CreatorSnapshot<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignSnapshot<'a> {
    title: &'a str,
    description: &'a str,
    requirements: Option<&'a str>,
    niche: &'a [String],
    platforms: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatorSnapshot<'a> {
    niches: &'a [String],
    reputation: f64,
}

#[derive(Deserialize)]
struct EvaluationResponse {
    score: f64,
    feedback: String,
}

/// Scorer backed by the scoring service's HTTP API.
pub struct HttpScorer {
    client: reqwest::Client,
    config: ScorerConfig,
}

impl HttpScorer {
    pub fn new(config: ScorerConfig) -> Result<Self, ScoringError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScoringError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    async fn evaluate(
        &self,
        pitch: &str,
        campaign: &Campaign,
        creator: &Creator,
    ) -> Result<ScoreReport, ScoringError> {
        let request = EvaluationRequest {
            pitch,
            campaign: CampaignSnapshot {
                title: &campaign.title,
                description: &campaign.description,
                requirements: campaign.requirements.as_deref(),
                niche: &campaign.niche,
                platforms: &campaign.platforms,
            },
            creator: CreatorSnapshot {
                niches: &creator.niches,
                reputation: creator.reputation,
            },
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ScoringError::Timeout(self.config.timeout)
            } else {
                ScoringError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoringError::Transport(format!(
                "scoring service returned {status}"
            )));
        }

        let body: EvaluationResponse = response
            .json()
            .await
            .map_err(|e| ScoringError::Malformed(e.to_string()))?;

        if !(0.0..=100.0).contains(&body.score) {
            return Err(ScoringError::Malformed(format!(
                "score {} outside the 0-100 range",
                body.score
            )));
        }

        Ok(ScoreReport {
            ai_score: body.score,
            ai_feedback: body.feedback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_env_requires_url() {
        // Serialise access to the process environment within this test.
        std::env::remove_var("SCORING_URL");
        assert!(ScorerConfig::from_env().is_none());

        std::env::set_var("SCORING_URL", "http://localhost:9000/evaluate");
        std::env::set_var("SCORING_TIMEOUT_MS", "750");
        let config = ScorerConfig::from_env().unwrap();
        assert_eq!(config.endpoint, "http://localhost:9000/evaluate");
        assert_eq!(config.timeout, Duration::from_millis(750));
        std::env::remove_var("SCORING_URL");
        std::env::remove_var("SCORING_TIMEOUT_MS");
    }
}
