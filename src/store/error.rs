//! Error types for the persistence layer.

use thiserror::Error;

use crate::domain::{CampaignId, CreatorId, ProposalId};

/// Errors that can occur in the marketplace store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No brand profile for the given email
    #[error("brand profile not found for {0}")]
    BrandNotFound(String),

    /// No creator profile for the given email
    #[error("creator profile not found for {0}")]
    CreatorNotFound(String),

    /// Campaign not found
    #[error("campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    /// Proposal not found
    #[error("proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    /// Duplicate proposal under the strict intake policy
    #[error("creator {creator_id} already has a proposal on campaign {campaign_id}")]
    DuplicateProposal {
        campaign_id: CampaignId,
        creator_id: CreatorId,
    },

    /// Payment reference already in use
    #[error("duplicate payment reference: {0}")]
    DuplicateReference(String),

    /// Transition rejected by a status state machine
    #[error("invalid state transition for {entity}/{entity_id}: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        entity_id: String,
        from: String,
        to: String,
    },

    /// Stored row could not be decoded into a domain value
    #[error("corrupt row for {entity}/{entity_id}: {message}")]
    CorruptRow {
        entity: &'static str,
        entity_id: String,
        message: String,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
