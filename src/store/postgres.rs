//! PostgreSQL-backed marketplace store.
//!
//! Row structs mirror the table layout; statuses are stored as their
//! uppercase wire strings and parsed back through the domain `FromStr`
//! impls. The settlement compare-and-set is a single conditional `UPDATE`,
//! so concurrent duplicate deliveries resolve inside the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::domain::{
    Brand, BrandId, Campaign, CampaignId, CampaignStatus, Creator, CreatorFilter, CreatorId,
    CreatorPublic, Payment, PaymentId, Proposal, ProposalId, ProposalStatus, ProposalWithCreator,
    ScoreReport,
};

use super::traits::{
    CampaignStore, ConfirmOutcome, HealthCheck, PaymentStore, ProfileStore, ProposalStore,
};
use super::{Result, StoreError};

/// PostgreSQL implementation of the full store contract.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct BrandRow {
    id: Uuid,
    email: String,
    company_name: String,
    created_at: DateTime<Utc>,
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Brand {
            id: BrandId::from_uuid(row.id),
            email: row.email,
            company_name: row.company_name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CreatorRow {
    id: Uuid,
    email: String,
    display_name: String,
    niches: Vec<String>,
    reputation: f64,
    rate_expectation: Decimal,
    created_at: DateTime<Utc>,
}

impl From<CreatorRow> for Creator {
    fn from(row: CreatorRow) -> Self {
        Creator {
            id: CreatorId::from_uuid(row.id),
            email: row.email,
            display_name: row.display_name,
            niches: row.niches,
            reputation: row.reputation,
            rate_expectation: row.rate_expectation,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CampaignRow {
    id: Uuid,
    brand_id: Uuid,
    title: String,
    description: String,
    budget: Decimal,
    deadline: DateTime<Utc>,
    niche: Vec<String>,
    platforms: Vec<String>,
    requirements: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = StoreError;

    fn try_from(row: CampaignRow) -> Result<Self> {
        let status: CampaignStatus =
            row.status.parse().map_err(|message| StoreError::CorruptRow {
                entity: "campaign",
                entity_id: row.id.to_string(),
                message,
            })?;
        Ok(Campaign {
            id: CampaignId::from_uuid(row.id),
            brand_id: BrandId::from_uuid(row.brand_id),
            title: row.title,
            description: row.description,
            budget: row.budget,
            deadline: row.deadline,
            niche: row.niche,
            platforms: row.platforms,
            requirements: row.requirements,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProposalRow {
    id: Uuid,
    campaign_id: Uuid,
    creator_id: Uuid,
    pitch: String,
    rate: Decimal,
    ai_score: Option<f64>,
    ai_feedback: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProposalRow> for Proposal {
    type Error = StoreError;

    fn try_from(row: ProposalRow) -> Result<Self> {
        let status: ProposalStatus =
            row.status.parse().map_err(|message| StoreError::CorruptRow {
                entity: "proposal",
                entity_id: row.id.to_string(),
                message,
            })?;
        // Scoring is all-or-nothing; a row with one half set is corrupt.
        let review = match (row.ai_score, row.ai_feedback) {
            (Some(ai_score), Some(ai_feedback)) => Some(ScoreReport {
                ai_score,
                ai_feedback,
            }),
            (None, None) => None,
            _ => {
                return Err(StoreError::CorruptRow {
                    entity: "proposal",
                    entity_id: row.id.to_string(),
                    message: "ai_score and ai_feedback must be set together".into(),
                })
            }
        };
        Ok(Proposal {
            id: ProposalId::from_uuid(row.id),
            campaign_id: CampaignId::from_uuid(row.campaign_id),
            creator_id: CreatorId::from_uuid(row.creator_id),
            pitch: row.pitch,
            rate: row.rate,
            review,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProposalWithCreatorRow {
    #[sqlx(flatten)]
    proposal: ProposalRow,
    creator_display_name: String,
    creator_niches: Vec<String>,
    creator_reputation: f64,
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    proposal_id: Uuid,
    amount: Decimal,
    currency: String,
    reference: String,
    status: String,
    provider_ref: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> Result<Self> {
        let status = row.status.parse().map_err(|message| StoreError::CorruptRow {
            entity: "payment",
            entity_id: row.id.to_string(),
            message,
        })?;
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            proposal_id: ProposalId::from_uuid(row.proposal_id),
            amount: row.amount,
            currency: row.currency,
            reference: row.reference,
            status,
            provider_ref: row.provider_ref,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// ProfileStore
// =============================================================================

#[async_trait]
impl ProfileStore for PgStore {
    async fn insert_brand(&self, brand: Brand) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO brands (id, email, company_name, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(brand.id.0)
        .bind(&brand.email)
        .bind(&brand.company_name)
        .bind(brand.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_creator(&self, creator: Creator) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO creators (id, email, display_name, niches, reputation, rate_expectation, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(creator.id.0)
        .bind(&creator.email)
        .bind(&creator.display_name)
        .bind(&creator.niches)
        .bind(creator.reputation)
        .bind(creator.rate_expectation)
        .bind(creator.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn brand_by_email(&self, email: &str) -> Result<Option<Brand>> {
        let row = sqlx::query_as::<_, BrandRow>(
            "SELECT id, email, company_name, created_at FROM brands WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Brand::from))
    }

    async fn creator_by_email(&self, email: &str) -> Result<Option<Creator>> {
        let row = sqlx::query_as::<_, CreatorRow>(
            r#"
            SELECT id, email, display_name, niches, reputation, rate_expectation, created_at
            FROM creators WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Creator::from))
    }

    async fn creator_by_id(&self, id: CreatorId) -> Result<Option<Creator>> {
        let row = sqlx::query_as::<_, CreatorRow>(
            r#"
            SELECT id, email, display_name, niches, reputation, rate_expectation, created_at
            FROM creators WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Creator::from))
    }

    async fn list_creators(&self, filter: CreatorFilter) -> Result<Vec<Creator>> {
        let rows = sqlx::query_as::<_, CreatorRow>(
            r#"
            SELECT id, email, display_name, niches, reputation, rate_expectation, created_at
            FROM creators
            WHERE ($1::text IS NULL OR $1 = ANY(niches))
              AND ($2::float8 IS NULL OR reputation >= $2)
            ORDER BY reputation DESC
            "#,
        )
        .bind(filter.niche)
        .bind(filter.min_score)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Creator::from).collect())
    }
}

// =============================================================================
// CampaignStore
// =============================================================================

#[async_trait]
impl CampaignStore for PgStore {
    async fn insert_campaign(&self, campaign: Campaign) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, brand_id, title, description, budget, deadline,
                niche, platforms, requirements, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(campaign.id.0)
        .bind(campaign.brand_id.0)
        .bind(&campaign.title)
        .bind(&campaign.description)
        .bind(campaign.budget)
        .bind(campaign.deadline)
        .bind(&campaign.niche)
        .bind(&campaign.platforms)
        .bind(&campaign.requirements)
        .bind(campaign.status.to_string())
        .bind(campaign.created_at)
        .bind(campaign.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn campaign_by_id(&self, id: CampaignId) -> Result<Option<Campaign>> {
        let row = sqlx::query_as::<_, CampaignRow>(
            r#"
            SELECT id, brand_id, title, description, budget, deadline,
                   niche, platforms, requirements, status, created_at, updated_at
            FROM campaigns WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Campaign::try_from).transpose()
    }

    async fn list_active_campaigns<'a>(&self, niche: Option<&'a str>) -> Result<Vec<Campaign>> {
        let rows = sqlx::query_as::<_, CampaignRow>(
            r#"
            SELECT id, brand_id, title, description, budget, deadline,
                   niche, platforms, requirements, status, created_at, updated_at
            FROM campaigns
            WHERE status = 'ACTIVE'
              AND ($1::text IS NULL OR $1 = ANY(niche))
            ORDER BY created_at DESC
            "#,
        )
        .bind(niche)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Campaign::try_from).collect()
    }
}

// =============================================================================
// ProposalStore
// =============================================================================

#[async_trait]
impl ProposalStore for PgStore {
    async fn insert_proposal(&self, proposal: Proposal) -> Result<()> {
        let (ai_score, ai_feedback) = match &proposal.review {
            Some(review) => (Some(review.ai_score), Some(review.ai_feedback.clone())),
            None => (None, None),
        };
        sqlx::query(
            r#"
            INSERT INTO proposals (
                id, campaign_id, creator_id, pitch, rate,
                ai_score, ai_feedback, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(proposal.id.0)
        .bind(proposal.campaign_id.0)
        .bind(proposal.creator_id.0)
        .bind(&proposal.pitch)
        .bind(proposal.rate)
        .bind(ai_score)
        .bind(ai_feedback)
        .bind(proposal.status.to_string())
        .bind(proposal.created_at)
        .bind(proposal.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn proposal_by_id(&self, id: ProposalId) -> Result<Option<Proposal>> {
        let row = sqlx::query_as::<_, ProposalRow>(
            r#"
            SELECT id, campaign_id, creator_id, pitch, rate,
                   ai_score, ai_feedback, status, created_at, updated_at
            FROM proposals WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Proposal::try_from).transpose()
    }

    async fn proposal_exists(
        &self,
        campaign_id: CampaignId,
        creator_id: CreatorId,
    ) -> Result<bool> {
        let exists: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM proposals WHERE campaign_id = $1 AND creator_id = $2 LIMIT 1",
        )
        .bind(campaign_id.0)
        .bind(creator_id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exists.is_some())
    }

    async fn list_proposals_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<ProposalWithCreator>> {
        let rows = sqlx::query_as::<_, ProposalWithCreatorRow>(
            r#"
            SELECT p.id, p.campaign_id, p.creator_id, p.pitch, p.rate,
                   p.ai_score, p.ai_feedback, p.status, p.created_at, p.updated_at,
                   c.display_name AS creator_display_name,
                   c.niches AS creator_niches,
                   c.reputation AS creator_reputation
            FROM proposals p
            JOIN creators c ON c.id = p.creator_id
            WHERE p.campaign_id = $1
            ORDER BY p.ai_score DESC NULLS LAST, p.created_at ASC
            "#,
        )
        .bind(campaign_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let creator_id = CreatorId::from_uuid(row.proposal.creator_id);
                let proposal = Proposal::try_from(row.proposal)?;
                Ok(ProposalWithCreator {
                    proposal,
                    creator: CreatorPublic {
                        id: creator_id,
                        display_name: row.creator_display_name,
                        niches: row.creator_niches,
                        reputation: row.creator_reputation,
                    },
                })
            })
            .collect()
    }

    async fn set_proposal_review(&self, id: ProposalId, review: ScoreReport) -> Result<Proposal> {
        let row = sqlx::query_as::<_, ProposalRow>(
            r#"
            UPDATE proposals
            SET ai_score = $2, ai_feedback = $3, updated_at = NOW()
            WHERE id = $1 AND ai_score IS NULL
            RETURNING id, campaign_id, creator_id, pitch, rate,
                      ai_score, ai_feedback, status, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(review.ai_score)
        .bind(&review.ai_feedback)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Proposal::try_from(row),
            // Already scored, or missing; re-read to tell which.
            None => self
                .proposal_by_id(id)
                .await?
                .ok_or(StoreError::ProposalNotFound(id)),
        }
    }

    async fn complete_proposal(&self, id: ProposalId) -> Result<()> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE proposals
            SET status = 'COMPLETED', updated_at = NOW()
            WHERE id = $1 AND status IN ('PENDING', 'REVIEWING', 'ACCEPTED')
            RETURNING id
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        if updated.is_some() {
            return Ok(());
        }

        match self.proposal_by_id(id).await? {
            None => Err(StoreError::ProposalNotFound(id)),
            Some(p) if p.status == ProposalStatus::Completed => Ok(()),
            Some(p) => Err(StoreError::InvalidTransition {
                entity: "proposal",
                entity_id: id.to_string(),
                from: p.status.to_string(),
                to: ProposalStatus::Completed.to_string(),
            }),
        }
    }
}

// =============================================================================
// PaymentStore
// =============================================================================

#[async_trait]
impl PaymentStore for PgStore {
    async fn insert_payment(&self, payment: Payment) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                id, proposal_id, amount, currency, reference,
                status, provider_ref, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(payment.id.0)
        .bind(payment.proposal_id.0)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.reference)
        .bind(payment.status.to_string())
        .bind(&payment.provider_ref)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateReference(payment.reference))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn payment_by_reference(&self, reference: &str) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, proposal_id, amount, currency, reference,
                   status, provider_ref, created_at, updated_at
            FROM payments WHERE reference = $1
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Payment::try_from).transpose()
    }

    async fn confirm_payment<'a>(
        &self,
        reference: &str,
        provider_ref: Option<&'a str>,
    ) -> Result<ConfirmOutcome> {
        // Single conditional UPDATE: the database serialises concurrent
        // deliveries, so exactly one caller gets the RETURNING row.
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            UPDATE payments
            SET status = 'SUCCESS', provider_ref = $2, updated_at = NOW()
            WHERE reference = $1 AND status <> 'SUCCESS'
            RETURNING id, proposal_id, amount, currency, reference,
                      status, provider_ref, created_at, updated_at
            "#,
        )
        .bind(reference)
        .bind(provider_ref)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(ConfirmOutcome::Confirmed(Payment::try_from(row)?));
        }

        let exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM payments WHERE reference = $1")
                .bind(reference)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_some() {
            Ok(ConfirmOutcome::AlreadyConfirmed)
        } else {
            Ok(ConfirmOutcome::NotFound)
        }
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
