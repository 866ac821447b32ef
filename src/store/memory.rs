//! In-memory marketplace store.
//!
//! Backs the test suite and local development. All maps live behind a single
//! `RwLock`, so every conditional update runs in one critical section and the
//! compare-and-set guarantees of the trait hold under concurrency.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    Brand, Campaign, CampaignId, CampaignStatus, Creator, CreatorFilter, CreatorId, Payment,
    PaymentStatus, Proposal, ProposalId, ProposalStatus, ProposalWithCreator, ScoreReport,
};

use super::traits::{
    CampaignStore, ConfirmOutcome, HealthCheck, PaymentStore, ProfileStore, ProposalStore,
};
use super::{Result, StoreError};

#[derive(Default)]
struct Inner {
    brands: HashMap<crate::domain::BrandId, Brand>,
    creators: HashMap<CreatorId, Creator>,
    campaigns: HashMap<CampaignId, Campaign>,
    proposals: HashMap<ProposalId, Proposal>,
    /// Keyed by provider reference, which is unique.
    payments: HashMap<String, Payment>,
}

/// In-memory implementation of the full store contract.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn insert_brand(&self, brand: Brand) -> Result<()> {
        self.inner.write().await.brands.insert(brand.id, brand);
        Ok(())
    }

    async fn insert_creator(&self, creator: Creator) -> Result<()> {
        self.inner.write().await.creators.insert(creator.id, creator);
        Ok(())
    }

    async fn brand_by_email(&self, email: &str) -> Result<Option<Brand>> {
        let inner = self.inner.read().await;
        Ok(inner.brands.values().find(|b| b.email == email).cloned())
    }

    async fn creator_by_email(&self, email: &str) -> Result<Option<Creator>> {
        let inner = self.inner.read().await;
        Ok(inner.creators.values().find(|c| c.email == email).cloned())
    }

    async fn creator_by_id(&self, id: CreatorId) -> Result<Option<Creator>> {
        Ok(self.inner.read().await.creators.get(&id).cloned())
    }

    async fn list_creators(&self, filter: CreatorFilter) -> Result<Vec<Creator>> {
        let inner = self.inner.read().await;
        let mut creators: Vec<Creator> = inner
            .creators
            .values()
            .filter(|c| filter.niche.as_deref().is_none_or(|n| c.has_niche(n)))
            .filter(|c| filter.min_score.is_none_or(|min| c.reputation >= min))
            .cloned()
            .collect();
        creators.sort_by(|a, b| {
            b.reputation
                .partial_cmp(&a.reputation)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(creators)
    }
}

#[async_trait]
impl CampaignStore for InMemoryStore {
    async fn insert_campaign(&self, campaign: Campaign) -> Result<()> {
        self.inner
            .write()
            .await
            .campaigns
            .insert(campaign.id, campaign);
        Ok(())
    }

    async fn campaign_by_id(&self, id: CampaignId) -> Result<Option<Campaign>> {
        Ok(self.inner.read().await.campaigns.get(&id).cloned())
    }

    async fn list_active_campaigns<'a>(&self, niche: Option<&'a str>) -> Result<Vec<Campaign>> {
        let inner = self.inner.read().await;
        let mut campaigns: Vec<Campaign> = inner
            .campaigns
            .values()
            .filter(|c| c.status == CampaignStatus::Active)
            .filter(|c| niche.is_none_or(|n| c.has_niche(n)))
            .cloned()
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(campaigns)
    }
}

#[async_trait]
impl ProposalStore for InMemoryStore {
    async fn insert_proposal(&self, proposal: Proposal) -> Result<()> {
        self.inner
            .write()
            .await
            .proposals
            .insert(proposal.id, proposal);
        Ok(())
    }

    async fn proposal_by_id(&self, id: ProposalId) -> Result<Option<Proposal>> {
        Ok(self.inner.read().await.proposals.get(&id).cloned())
    }

    async fn proposal_exists(
        &self,
        campaign_id: CampaignId,
        creator_id: CreatorId,
    ) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .proposals
            .values()
            .any(|p| p.campaign_id == campaign_id && p.creator_id == creator_id))
    }

    async fn list_proposals_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<ProposalWithCreator>> {
        let inner = self.inner.read().await;
        let mut proposals: Vec<Proposal> = inner
            .proposals
            .values()
            .filter(|p| p.campaign_id == campaign_id)
            .cloned()
            .collect();
        proposals.sort_by(Proposal::score_desc);

        proposals
            .into_iter()
            .map(|proposal| {
                let creator = inner.creators.get(&proposal.creator_id).ok_or_else(|| {
                    StoreError::CorruptRow {
                        entity: "proposal",
                        entity_id: proposal.id.to_string(),
                        message: format!("dangling creator {}", proposal.creator_id),
                    }
                })?;
                Ok(ProposalWithCreator {
                    creator: creator.public(),
                    proposal,
                })
            })
            .collect()
    }

    async fn set_proposal_review(&self, id: ProposalId, review: ScoreReport) -> Result<Proposal> {
        let mut inner = self.inner.write().await;
        let proposal = inner
            .proposals
            .get_mut(&id)
            .ok_or(StoreError::ProposalNotFound(id))?;
        if proposal.review.is_none() {
            proposal.review = Some(review);
            proposal.updated_at = Utc::now();
        }
        Ok(proposal.clone())
    }

    async fn complete_proposal(&self, id: ProposalId) -> Result<()> {
        let mut inner = self.inner.write().await;
        let proposal = inner
            .proposals
            .get_mut(&id)
            .ok_or(StoreError::ProposalNotFound(id))?;

        if proposal.status == ProposalStatus::Completed {
            return Ok(());
        }
        if !proposal.status.can_transition(ProposalStatus::Completed) {
            return Err(StoreError::InvalidTransition {
                entity: "proposal",
                entity_id: id.to_string(),
                from: proposal.status.to_string(),
                to: ProposalStatus::Completed.to_string(),
            });
        }
        proposal.status = ProposalStatus::Completed;
        proposal.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn insert_payment(&self, payment: Payment) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.payments.contains_key(&payment.reference) {
            return Err(StoreError::DuplicateReference(payment.reference));
        }
        inner.payments.insert(payment.reference.clone(), payment);
        Ok(())
    }

    async fn payment_by_reference(&self, reference: &str) -> Result<Option<Payment>> {
        Ok(self.inner.read().await.payments.get(reference).cloned())
    }

    async fn confirm_payment<'a>(
        &self,
        reference: &str,
        provider_ref: Option<&'a str>,
    ) -> Result<ConfirmOutcome> {
        // One critical section: lookup, condition check, and write happen
        // under the same lock, so two concurrent deliveries cannot both win.
        let mut inner = self.inner.write().await;
        let Some(payment) = inner.payments.get_mut(reference) else {
            return Ok(ConfirmOutcome::NotFound);
        };

        if payment.status == PaymentStatus::Success {
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }

        payment.status = PaymentStatus::Success;
        payment.provider_ref = provider_ref.map(str::to_owned);
        payment.updated_at = Utc::now();
        Ok(ConfirmOutcome::Confirmed(payment.clone()))
    }
}

#[async_trait]
impl HealthCheck for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProposalId;
    use rust_decimal_macros::dec;

    fn pending_payment(reference: &str) -> Payment {
        Payment::create(ProposalId::new(), dec!(50000), "NGN", reference)
    }

    #[tokio::test]
    async fn confirm_payment_is_first_writer_wins() {
        let store = InMemoryStore::new();
        store.insert_payment(pending_payment("pay_123")).await.unwrap();

        let first = store.confirm_payment("pay_123", Some("999")).await.unwrap();
        assert!(matches!(first, ConfirmOutcome::Confirmed(_)));

        let second = store.confirm_payment("pay_123", Some("999")).await.unwrap();
        assert!(matches!(second, ConfirmOutcome::AlreadyConfirmed));

        let payment = store.payment_by_reference("pay_123").await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Success);
        assert_eq!(payment.provider_ref.as_deref(), Some("999"));
    }

    #[tokio::test]
    async fn confirm_unknown_reference_is_noop() {
        let store = InMemoryStore::new();
        let outcome = store.confirm_payment("missing", None).await.unwrap();
        assert!(matches!(outcome, ConfirmOutcome::NotFound));
    }

    #[tokio::test]
    async fn duplicate_reference_rejected() {
        let store = InMemoryStore::new();
        store.insert_payment(pending_payment("pay_dup")).await.unwrap();
        let err = store.insert_payment(pending_payment("pay_dup")).await;
        assert!(matches!(err, Err(StoreError::DuplicateReference(_))));
    }

    #[tokio::test]
    async fn concurrent_confirms_yield_exactly_one_winner() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        store.insert_payment(pending_payment("pay_race")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.confirm_payment("pay_race", Some("999")).await.unwrap()
            }));
        }

        let mut confirmed = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), ConfirmOutcome::Confirmed(_)) {
                confirmed += 1;
            }
        }
        assert_eq!(confirmed, 1);
    }

    #[tokio::test]
    async fn complete_proposal_enforces_transitions() {
        let store = InMemoryStore::new();
        let mut proposal = Proposal::create(
            CampaignId::new(),
            CreatorId::new(),
            "pitch".into(),
            dec!(100),
            None,
            Utc::now(),
        );
        proposal.status = ProposalStatus::Rejected;
        let id = proposal.id;
        store.insert_proposal(proposal).await.unwrap();

        let err = store.complete_proposal(id).await;
        assert!(matches!(err, Err(StoreError::InvalidTransition { .. })));
    }
}
