//! Proposal entity, its status state machine, and the scoring report pair.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{CampaignId, CreatorId, CreatorPublic, ProposalId};

/// Proposal lifecycle status.
///
/// Review transitions (Reviewing/Accepted/Rejected) are driven by brand action
/// outside this service. Completed is driven exclusively by confirmed payment
/// and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Pending,
    Reviewing,
    Accepted,
    Rejected,
    Completed,
}

impl ProposalStatus {
    /// Whether `self -> to` is an admissible transition.
    ///
    /// The payment cascade may complete a proposal from any pre-payment state
    /// except Rejected, since brand review happens out-of-band and must not
    /// wedge settlement.
    pub fn can_transition(self, to: ProposalStatus) -> bool {
        use ProposalStatus::*;
        matches!(
            (self, to),
            (Pending, Reviewing)
                | (Pending, Accepted)
                | (Pending, Rejected)
                | (Reviewing, Accepted)
                | (Reviewing, Rejected)
                | (Pending, Completed)
                | (Reviewing, Completed)
                | (Accepted, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ProposalStatus::Completed | ProposalStatus::Rejected)
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposalStatus::Pending => write!(f, "PENDING"),
            ProposalStatus::Reviewing => write!(f, "REVIEWING"),
            ProposalStatus::Accepted => write!(f, "ACCEPTED"),
            ProposalStatus::Rejected => write!(f, "REJECTED"),
            ProposalStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl std::str::FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ProposalStatus::Pending),
            "REVIEWING" => Ok(ProposalStatus::Reviewing),
            "ACCEPTED" => Ok(ProposalStatus::Accepted),
            "REJECTED" => Ok(ProposalStatus::Rejected),
            "COMPLETED" => Ok(ProposalStatus::Completed),
            other => Err(format!("unknown proposal status: {other}")),
        }
    }
}

/// Outcome of a completed scoring call.
///
/// Scoring is all-or-nothing: a proposal either carries a full report or none.
/// Using one pair type (rather than two independent optionals) makes a
/// half-populated record unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    /// Quality score in the 0-100 range.
    pub ai_score: f64,
    pub ai_feedback: String,
}

impl ScoreReport {
    pub fn in_range(&self) -> bool {
        (0.0..=100.0).contains(&self.ai_score)
    }
}

/// A creator's pitch against a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub campaign_id: CampaignId,
    pub creator_id: CreatorId,
    pub pitch: String,
    pub rate: Decimal,
    /// Absent when scoring was not completed.
    #[serde(flatten)]
    pub review: Option<ScoreReport>,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Build a freshly submitted proposal. Status starts at Pending whether or
    /// not scoring completed.
    pub fn create(
        campaign_id: CampaignId,
        creator_id: CreatorId,
        pitch: String,
        rate: Decimal,
        review: Option<ScoreReport>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProposalId::new(),
            campaign_id,
            creator_id,
            pitch,
            rate,
            review,
            status: ProposalStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ai_score(&self) -> Option<f64> {
        self.review.as_ref().map(|r| r.ai_score)
    }

    /// Listing order: score descending, unscored proposals after all scored
    /// ones, submission time as the tiebreaker.
    pub fn score_desc(a: &Proposal, b: &Proposal) -> Ordering {
        match (a.ai_score(), b.ai_score()) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.created_at.cmp(&b.created_at))
    }
}

/// A proposal joined with the submitting creator's public profile, as returned
/// by the campaign proposal listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalWithCreator {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub creator: CreatorPublic,
}
