//! Repository trait definitions for the marketplace store.
//!
//! The persistent store is an external collaborator with a narrow contract:
//! point lookups, filtered listing, and atomic single-row conditional updates.
//! Two implementations ship with the crate: PostgreSQL for production and an
//! in-memory store for tests.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{
    Brand, Campaign, CampaignId, Creator, CreatorFilter, CreatorId, Payment, Proposal, ProposalId,
    ProposalWithCreator, ScoreReport,
};

use super::Result;

/// Outcome of the atomic payment-confirmation write.
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    /// This call won the compare-and-set; exactly one caller per reference
    /// ever observes this.
    Confirmed(Payment),
    /// The payment was already SUCCESS; duplicate delivery, no-op.
    AlreadyConfirmed,
    /// No payment carries this reference; acknowledged without effect.
    NotFound,
}

/// Brand and creator profile lookups.
///
/// Profiles are written by the identity/onboarding layer; this service only
/// needs resolution by principal email plus the public discovery listing.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn insert_brand(&self, brand: Brand) -> Result<()>;

    async fn insert_creator(&self, creator: Creator) -> Result<()>;

    /// Resolve a principal's email to its brand profile.
    async fn brand_by_email(&self, email: &str) -> Result<Option<Brand>>;

    /// Resolve a principal's email to its creator profile.
    async fn creator_by_email(&self, email: &str) -> Result<Option<Creator>>;

    async fn creator_by_id(&self, id: CreatorId) -> Result<Option<Creator>>;

    /// Public creator discovery: optional niche filter, optional minimum
    /// reputation, reputation-descending.
    async fn list_creators(&self, filter: CreatorFilter) -> Result<Vec<Creator>>;
}

/// Campaign persistence and discovery.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: Campaign) -> Result<()>;

    async fn campaign_by_id(&self, id: CampaignId) -> Result<Option<Campaign>>;

    /// All ACTIVE campaigns, optionally intersected with a single niche tag,
    /// newest-first.
    async fn list_active_campaigns<'a>(&self, niche: Option<&'a str>) -> Result<Vec<Campaign>>;
}

/// Proposal persistence, listing, and lifecycle writes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProposalStore: Send + Sync {
    async fn insert_proposal(&self, proposal: Proposal) -> Result<()>;

    async fn proposal_by_id(&self, id: ProposalId) -> Result<Option<Proposal>>;

    /// Whether the creator already has any proposal on the campaign.
    async fn proposal_exists(&self, campaign_id: CampaignId, creator_id: CreatorId)
        -> Result<bool>;

    /// Proposals for a campaign joined with creator public profiles, ordered
    /// score-descending with unscored proposals last.
    async fn list_proposals_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<ProposalWithCreator>>;

    /// Attach a scoring report to a proposal that does not have one yet.
    /// Returns the updated proposal.
    async fn set_proposal_review(
        &self,
        id: ProposalId,
        review: ScoreReport,
    ) -> Result<Proposal>;

    /// Cascade target of payment confirmation: move the proposal to COMPLETED.
    /// Enforces the proposal transition table.
    async fn complete_proposal(&self, id: ProposalId) -> Result<()>;
}

/// Payment persistence and the settlement compare-and-set.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Insert a pending payment. The reference must be unique.
    async fn insert_payment(&self, payment: Payment) -> Result<()>;

    async fn payment_by_reference(&self, reference: &str) -> Result<Option<Payment>>;

    /// Atomically transition the payment with this reference to SUCCESS and
    /// record the provider transaction id, only if it is not already SUCCESS.
    ///
    /// This must be a single conditional write, not a read-then-write pair:
    /// under concurrent duplicate delivery exactly one caller observes
    /// [`ConfirmOutcome::Confirmed`].
    async fn confirm_payment<'a>(
        &self,
        reference: &str,
        provider_ref: Option<&'a str>,
    ) -> Result<ConfirmOutcome>;
}

/// The full store contract consumed by services and handlers.
pub trait MarketplaceStore:
    ProfileStore + CampaignStore + ProposalStore + PaymentStore + HealthCheck
{
}

impl<T> MarketplaceStore for T where
    T: ProfileStore + CampaignStore + ProposalStore + PaymentStore + HealthCheck
{
}

/// Connectivity probe for the readiness endpoint.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<()>;
}
