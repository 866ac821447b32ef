//! Campaign entity and its status state machine.
//!
//! A campaign is posted by a brand and is the anchor for proposal intake.
//! Only `Active` campaigns are returned by open-discovery queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BrandId, CampaignId};

/// Campaign lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    /// Whether `self -> to` is an admissible transition.
    pub fn can_transition(self, to: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, to),
            (Draft, Active)
                | (Active, Paused)
                | (Paused, Active)
                | (Active, Completed)
                | (Active, Cancelled)
                | (Paused, Completed)
                | (Paused, Cancelled)
        )
    }

    /// Completed and Cancelled admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, CampaignStatus::Completed | CampaignStatus::Cancelled)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignStatus::Draft => write!(f, "DRAFT"),
            CampaignStatus::Active => write!(f, "ACTIVE"),
            CampaignStatus::Paused => write!(f, "PAUSED"),
            CampaignStatus::Completed => write!(f, "COMPLETED"),
            CampaignStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(CampaignStatus::Draft),
            "ACTIVE" => Ok(CampaignStatus::Active),
            "PAUSED" => Ok(CampaignStatus::Paused),
            "COMPLETED" => Ok(CampaignStatus::Completed),
            "CANCELLED" => Ok(CampaignStatus::Cancelled),
            other => Err(format!("unknown campaign status: {other}")),
        }
    }
}

/// A brand campaign open for creator proposals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub brand_id: BrandId,
    pub title: String,
    pub description: String,
    /// Total budget in the campaign currency. Must be positive.
    pub budget: Decimal,
    pub deadline: DateTime<Utc>,
    /// Niche tags used for discovery filtering. May be empty.
    pub niche: Vec<String>,
    /// Target platforms. May be empty.
    pub platforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when a brand posts a new campaign.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    pub budget: Decimal,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub niche: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub requirements: Option<String>,
}

impl Campaign {
    /// Build a campaign from validated input. New campaigns go live immediately.
    pub fn create(brand_id: BrandId, fields: NewCampaign, now: DateTime<Utc>) -> Self {
        Self {
            id: CampaignId::new(),
            brand_id,
            title: fields.title,
            description: fields.description,
            budget: fields.budget,
            deadline: fields.deadline,
            niche: fields.niche,
            platforms: fields.platforms,
            requirements: fields.requirements,
            status: CampaignStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_niche(&self, niche: &str) -> bool {
        self.niche.iter().any(|n| n == niche)
    }
}
