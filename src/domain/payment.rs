//! Payment entity, its status state machine, and the provider webhook event
//! shapes.
//!
//! A payment is created when a proposal is accepted (outside this service's
//! endpoints) and is mutated only by the settlement processor. The
//! provider-facing `reference` string is unique and serves as the idempotency
//! key for webhook correlation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PaymentId, ProposalId};

/// Provider event type that drives a settlement transition. Everything else is
/// acknowledged and ignored.
pub const CHARGE_SUCCESS: &str = "charge.success";

/// Payload status value required alongside [`CHARGE_SUCCESS`].
pub const CHARGE_STATUS_SUCCESS: &str = "success";

/// Payment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Whether `self -> to` is an admissible transition.
    ///
    /// Pending -> Success happens via verified webhook only. Pending -> Failed
    /// and Success -> Refunded are reserved; no endpoint drives them yet.
    pub fn can_transition(self, to: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, to),
            (Pending, Success) | (Pending, Failed) | (Success, Refunded)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Failed | PaymentStatus::Refunded)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Success => write!(f, "SUCCESS"),
            PaymentStatus::Failed => write!(f, "FAILED"),
            PaymentStatus::Refunded => write!(f, "REFUNDED"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// Money owed for an accepted proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub proposal_id: ProposalId,
    pub amount: Decimal,
    pub currency: String,
    /// Unique provider-facing reference; the webhook idempotency key.
    pub reference: String,
    pub status: PaymentStatus,
    /// Provider transaction id, recorded on confirmation.
    #[serde(rename = "paystackRef")]
    pub provider_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Build a pending payment for an accepted proposal.
    pub fn create(
        proposal_id: ProposalId,
        amount: Decimal,
        currency: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            proposal_id,
            amount,
            currency: currency.into(),
            reference: reference.into(),
            status: PaymentStatus::Pending,
            provider_ref: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Inbound provider webhook event. Parsed only after the raw-body signature
/// has been verified.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEvent {
    pub event: String,
    pub data: ChargePayload,
}

impl ProviderEvent {
    /// True for the one event shape that drives a settlement transition.
    pub fn is_confirmed_charge(&self) -> bool {
        self.event == CHARGE_SUCCESS && self.data.status == CHARGE_STATUS_SUCCESS
    }
}

/// Charge payload inside a provider event.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargePayload {
    pub reference: String,
    pub status: String,
    /// Provider transaction id; arrives as a JSON number or string depending
    /// on the provider's event version.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl ChargePayload {
    /// Provider transaction id normalised to a string.
    pub fn provider_ref(&self) -> Option<String> {
        match &self.id {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_exit_from_success_back_to_pending() {
        assert!(!PaymentStatus::Success.can_transition(PaymentStatus::Pending));
        assert!(PaymentStatus::Success.can_transition(PaymentStatus::Refunded));
    }

    #[test]
    fn pending_confirms_once() {
        assert!(PaymentStatus::Pending.can_transition(PaymentStatus::Success));
        assert!(!PaymentStatus::Refunded.can_transition(PaymentStatus::Success));
    }

    #[test]
    fn charge_event_dispatch() {
        let event: ProviderEvent = serde_json::from_str(
            r#"{"event":"charge.success","data":{"reference":"pay_123","status":"success","id":999}}"#,
        )
        .unwrap();
        assert!(event.is_confirmed_charge());
        assert_eq!(event.data.provider_ref().as_deref(), Some("999"));

        let failed: ProviderEvent = serde_json::from_str(
            r#"{"event":"charge.success","data":{"reference":"pay_123","status":"failed"}}"#,
        )
        .unwrap();
        assert!(!failed.is_confirmed_charge());

        let other: ProviderEvent = serde_json::from_str(
            r#"{"event":"transfer.success","data":{"reference":"t_1","status":"success"}}"#,
        )
        .unwrap();
        assert!(!other.is_confirmed_charge());
    }

    #[test]
    fn provider_ref_accepts_string_ids() {
        let event: ProviderEvent = serde_json::from_str(
            r#"{"event":"charge.success","data":{"reference":"pay_9","status":"success","id":"trx_77"}}"#,
        )
        .unwrap();
        assert_eq!(event.data.provider_ref().as_deref(), Some("trx_77"));
    }

    #[test]
    fn provider_ref_wire_name() {
        let mut payment = Payment::create(ProposalId::new(), Decimal::new(500, 0), "NGN", "pay_1");
        payment.provider_ref = Some("999".into());
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["paystackRef"], "999");
        assert_eq!(json["status"], "PENDING");
    }
}
