//! Payment settlement: the webhook processor.
//!
//! Consumes untrusted network input that controls money-state transitions,
//! so the order of operations is fixed: authenticate the raw bytes first,
//! parse second, and apply the state change through a single atomic
//! compare-and-set. Duplicate and concurrent deliveries of the same event
//! must produce exactly one effective transition and one cascade.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::crypto::verify_signature;
use crate::domain::ProviderEvent;
use crate::store::{
    ConfirmOutcome, MarketplaceStore, PaymentStore, ProposalStore, StoreError,
};

/// Settlement failures. Anything else the processor swallows into a benign
/// acknowledgement so the provider stops retrying.
#[derive(Error, Debug)]
pub enum SettlementError {
    /// Signature missing, undecodable, or wrong. The body was not parsed.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Signature verified but the body is not a provider event.
    #[error("malformed provider event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a verified webhook delivery amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// This delivery won the compare-and-set: payment confirmed, proposal
    /// cascade applied.
    Confirmed { reference: String },
    /// The payment was already SUCCESS; duplicate delivery.
    AlreadyProcessed { reference: String },
    /// No payment carries the referenced key.
    UnknownReference { reference: String },
    /// Event type or payload status does not drive a transition.
    Ignored,
}

/// The payment webhook processor.
pub struct SettlementProcessor {
    store: Arc<dyn MarketplaceStore>,
    secret: Vec<u8>,
}

impl SettlementProcessor {
    pub fn new(store: Arc<dyn MarketplaceStore>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            store,
            secret: secret.into(),
        }
    }

    /// Handle one webhook delivery.
    ///
    /// `raw_body` must be the exact bytes as received; verification happens
    /// before any parsing. A missing header fails exactly like a wrong one.
    pub async fn handle(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> Result<SettlementOutcome, SettlementError> {
        let signature = signature.ok_or(SettlementError::InvalidSignature)?;
        if !verify_signature(&self.secret, raw_body, signature) {
            return Err(SettlementError::InvalidSignature);
        }

        let event: ProviderEvent = serde_json::from_slice(raw_body)?;

        if !event.is_confirmed_charge() {
            info!(event = %event.event, "webhook event ignored");
            return Ok(SettlementOutcome::Ignored);
        }

        let reference = event.data.reference.clone();
        let provider_ref = event.data.provider_ref();

        match self
            .store
            .confirm_payment(&reference, provider_ref.as_deref())
            .await?
        {
            ConfirmOutcome::Confirmed(payment) => {
                // Cascade: a confirmed payment completes its proposal. The
                // CAS above guarantees this branch runs once per reference.
                match self.store.complete_proposal(payment.proposal_id).await {
                    Ok(()) => {}
                    Err(StoreError::ProposalNotFound(id)) => {
                        warn!(reference = %reference, proposal_id = %id, "confirmed payment has no proposal");
                    }
                    Err(e) => return Err(e.into()),
                }
                info!(reference = %reference, "payment confirmed");
                Ok(SettlementOutcome::Confirmed { reference })
            }
            ConfirmOutcome::AlreadyConfirmed => {
                info!(reference = %reference, "duplicate confirmation ignored");
                Ok(SettlementOutcome::AlreadyProcessed { reference })
            }
            ConfirmOutcome::NotFound => {
                warn!(reference = %reference, "webhook references unknown payment");
                Ok(SettlementOutcome::UnknownReference { reference })
            }
        }
    }
}
