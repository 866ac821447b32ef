//! Proposal intake.
//!
//! Orchestrates proposal submission: principal resolution, campaign lookup,
//! the best-effort scoring call, and the atomic proposal write. Scoring is
//! never allowed to block or fail proposal creation; its failure is recorded
//! for observability only.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::Principal;
use crate::domain::{
    Campaign, CampaignId, CampaignStatus, Creator, CreatorId, Proposal, ProposalId,
    ProposalWithCreator, ScoreReport,
};
use crate::scoring::{Scorer, ScoringError};
use crate::store::{CampaignStore, MarketplaceStore, ProfileStore, ProposalStore, StoreError};

/// Unresolved product decisions kept configurable rather than guessed:
/// historically the platform accepts proposals against non-active campaigns
/// and duplicate proposals per (creator, campaign). Both stay permissive
/// unless a flag tightens them.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakePolicy {
    /// Reject proposals against campaigns that are not ACTIVE.
    pub require_active_campaign: bool,
    /// Reject a second proposal by the same creator on the same campaign.
    pub single_proposal_per_creator: bool,
}

impl IntakePolicy {
    /// Upstream-compatible defaults: everything allowed.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Load the policy flags from environment variables.
    pub fn from_env() -> Self {
        Self {
            require_active_campaign: env_flag("INTAKE_REQUIRE_ACTIVE_CAMPAIGN"),
            single_proposal_per_creator: env_flag("INTAKE_SINGLE_PROPOSAL_PER_CREATOR"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on"))
        .unwrap_or(false)
}

/// Errors surfaced by the intake service.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("creator profile not found for {0}")]
    CreatorNotFound(String),

    #[error("campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    #[error("campaign {campaign_id} is {status}, not ACTIVE")]
    CampaignNotActive {
        campaign_id: CampaignId,
        status: CampaignStatus,
    },

    #[error("creator {creator_id} already has a proposal on campaign {campaign_id}")]
    DuplicateProposal {
        campaign_id: CampaignId,
        creator_id: CreatorId,
    },

    #[error("proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    /// Only the explicit rescore path surfaces scoring failures; the submit
    /// path degrades them to an unscored proposal.
    #[error("scoring failed: {0}")]
    ScoringFailed(#[from] ScoringError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of an explicit rescore request.
#[derive(Debug, Clone)]
pub enum RescoreOutcome {
    /// The proposal was unscored and now carries the fresh report.
    Scored(Proposal),
    /// The proposal already carried a report; nothing was changed.
    AlreadyScored(Proposal),
}

/// The proposal intake service.
pub struct ProposalIntake {
    store: Arc<dyn MarketplaceStore>,
    scorer: Arc<dyn Scorer>,
    policy: IntakePolicy,
}

impl ProposalIntake {
    pub fn new(
        store: Arc<dyn MarketplaceStore>,
        scorer: Arc<dyn Scorer>,
        policy: IntakePolicy,
    ) -> Self {
        Self {
            store,
            scorer,
            policy,
        }
    }

    /// Submit a proposal on behalf of the principal's creator profile.
    ///
    /// The scoring call is best-effort: on any failure the proposal is
    /// persisted with no report and the failure is logged, never surfaced.
    pub async fn submit(
        &self,
        principal: &Principal,
        campaign_id: CampaignId,
        pitch: String,
        rate: Decimal,
    ) -> Result<Proposal, IntakeError> {
        let creator = self
            .store
            .creator_by_email(&principal.email)
            .await?
            .ok_or_else(|| IntakeError::CreatorNotFound(principal.email.clone()))?;

        let campaign = self
            .store
            .campaign_by_id(campaign_id)
            .await?
            .ok_or(IntakeError::CampaignNotFound(campaign_id))?;

        if self.policy.require_active_campaign && campaign.status != CampaignStatus::Active {
            return Err(IntakeError::CampaignNotActive {
                campaign_id,
                status: campaign.status,
            });
        }

        if self.policy.single_proposal_per_creator
            && self.store.proposal_exists(campaign_id, creator.id).await?
        {
            return Err(IntakeError::DuplicateProposal {
                campaign_id,
                creator_id: creator.id,
            });
        }

        let review = self.score(&pitch, &campaign, &creator).await;

        let proposal = Proposal::create(campaign_id, creator.id, pitch, rate, review, Utc::now());
        self.store.insert_proposal(proposal.clone()).await?;

        info!(
            proposal_id = %proposal.id,
            campaign_id = %campaign_id,
            creator_id = %creator.id,
            scored = proposal.review.is_some(),
            "proposal submitted"
        );
        Ok(proposal)
    }

    /// All proposals for a campaign, score-descending with unscored last,
    /// joined with creator public profiles.
    pub async fn list_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<ProposalWithCreator>, IntakeError> {
        Ok(self.store.list_proposals_for_campaign(campaign_id).await?)
    }

    /// Re-run scoring for an existing proposal.
    ///
    /// Unlike submission, this surfaces scoring failures to the caller: the
    /// score is the entire point of the call. Already-scored proposals are
    /// left untouched.
    pub async fn rescore(&self, proposal_id: ProposalId) -> Result<RescoreOutcome, IntakeError> {
        let proposal = self
            .store
            .proposal_by_id(proposal_id)
            .await?
            .ok_or(IntakeError::ProposalNotFound(proposal_id))?;

        if proposal.review.is_some() {
            return Ok(RescoreOutcome::AlreadyScored(proposal));
        }

        let campaign = self
            .store
            .campaign_by_id(proposal.campaign_id)
            .await?
            .ok_or(IntakeError::CampaignNotFound(proposal.campaign_id))?;
        let creator = self
            .store
            .creator_by_id(proposal.creator_id)
            .await?
            .ok_or_else(|| IntakeError::CreatorNotFound(proposal.creator_id.to_string()))?;

        let report = self
            .scorer
            .evaluate(&proposal.pitch, &campaign, &creator)
            .await?;

        let updated = self.store.set_proposal_review(proposal_id, report).await?;
        info!(proposal_id = %proposal_id, "proposal rescored");
        Ok(RescoreOutcome::Scored(updated))
    }

    async fn score(
        &self,
        pitch: &str,
        campaign: &Campaign,
        creator: &Creator,
    ) -> Option<ScoreReport> {
        match self.scorer.evaluate(pitch, campaign, creator).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(
                    campaign_id = %campaign.id,
                    creator_id = %creator.id,
                    error = %e,
                    "scoring unavailable; proposal proceeds unscored"
                );
                None
            }
        }
    }
}
