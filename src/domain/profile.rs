//! Brand and creator profiles.
//!
//! Profiles are owned by the identity layer's users and resolved by the
//! principal's email. Creator profiles are read-only inputs to proposal
//! scoring; their reputation score is accumulated externally.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BrandId, CreatorId};

/// A brand account able to post campaigns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: BrandId,
    /// Email of the owning user; the lookup key from an authenticated principal.
    pub email: String,
    pub company_name: String,
    pub created_at: DateTime<Utc>,
}

impl Brand {
    pub fn new(email: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            id: BrandId::new(),
            email: email.into(),
            company_name: company_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A creator account able to submit proposals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: CreatorId,
    /// Email of the owning user; the lookup key from an authenticated principal.
    pub email: String,
    pub display_name: String,
    pub niches: Vec<String>,
    /// Externally accumulated reputation score.
    pub reputation: f64,
    /// Expected rate per engagement.
    pub rate_expectation: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Creator {
    /// Public projection exposed in proposal listings and creator discovery.
    pub fn public(&self) -> CreatorPublic {
        CreatorPublic {
            id: self.id,
            display_name: self.display_name.clone(),
            niches: self.niches.clone(),
            reputation: self.reputation,
        }
    }

    pub fn has_niche(&self, niche: &str) -> bool {
        self.niches.iter().any(|n| n == niche)
    }
}

/// Public creator fields, safe to expose to any caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorPublic {
    pub id: CreatorId,
    pub display_name: String,
    pub niches: Vec<String>,
    pub reputation: f64,
}

/// Filter for the public creator discovery listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorFilter {
    pub niche: Option<String>,
    #[serde(alias = "min_score")]
    pub min_score: Option<f64>,
}
