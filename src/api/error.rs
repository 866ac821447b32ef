//! Structured API error responses with error codes.
//!
//! Consistent error handling across all endpoints with machine-readable
//! error codes and human-readable messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::intake::IntakeError;
use crate::settlement::SettlementError;
use crate::store::StoreError;

// ============================================================================
// Error Codes
// ============================================================================

/// Error codes for API responses.
///
/// These codes are stable and can be used by clients for programmatic error
/// handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication errors (1xxx)
    /// No authentication credentials provided
    AuthRequired,
    /// Invalid or expired session token
    InvalidSessionToken,

    // Validation errors (3xxx)
    /// Request body is malformed
    InvalidRequestBody,
    /// Field value is invalid
    InvalidFieldValue,

    // Resource errors (4xxx)
    /// Requested resource not found
    ResourceNotFound,
    /// Principal has no brand profile
    BrandProfileNotFound,
    /// Principal has no creator profile
    CreatorProfileNotFound,
    /// Campaign not found
    CampaignNotFound,
    /// Proposal not found
    ProposalNotFound,

    // Conflict errors (5xxx)
    /// Creator already proposed on this campaign (strict intake policy)
    DuplicateProposal,
    /// Payment reference already exists
    DuplicateReference,

    // Signature errors (6xxx)
    /// Webhook signature verification failed
    InvalidSignature,

    // State errors (7xxx)
    /// Campaign is not ACTIVE (strict intake policy)
    CampaignNotActive,
    /// Invalid state transition
    InvalidStateTransition,

    // Infrastructure errors (8xxx)
    /// Database operation failed
    DatabaseError,
    /// Scoring service unavailable (surfaced by explicit rescore only)
    ScoringUnavailable,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn numeric_code(&self) -> u32 {
        match self {
            // Auth (1xxx)
            ErrorCode::AuthRequired => 1001,
            ErrorCode::InvalidSessionToken => 1002,

            // Validation (3xxx)
            ErrorCode::InvalidRequestBody => 3001,
            ErrorCode::InvalidFieldValue => 3002,

            // Resource (4xxx)
            ErrorCode::ResourceNotFound => 4001,
            ErrorCode::BrandProfileNotFound => 4002,
            ErrorCode::CreatorProfileNotFound => 4003,
            ErrorCode::CampaignNotFound => 4004,
            ErrorCode::ProposalNotFound => 4005,

            // Conflict (5xxx)
            ErrorCode::DuplicateProposal => 5001,
            ErrorCode::DuplicateReference => 5002,

            // Signature (6xxx)
            ErrorCode::InvalidSignature => 6001,

            // State (7xxx)
            ErrorCode::CampaignNotActive => 7001,
            ErrorCode::InvalidStateTransition => 7002,

            // Infrastructure (8xxx)
            ErrorCode::DatabaseError => 8001,
            ErrorCode::ScoringUnavailable => 8002,
            ErrorCode::InternalError => 8999,
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Auth -> 401
            ErrorCode::AuthRequired => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidSessionToken => StatusCode::UNAUTHORIZED,

            // Validation -> 400
            ErrorCode::InvalidRequestBody => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,

            // Resource -> 404
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::BrandProfileNotFound => StatusCode::NOT_FOUND,
            ErrorCode::CreatorProfileNotFound => StatusCode::NOT_FOUND,
            ErrorCode::CampaignNotFound => StatusCode::NOT_FOUND,
            ErrorCode::ProposalNotFound => StatusCode::NOT_FOUND,

            // Conflict -> 409
            ErrorCode::DuplicateProposal => StatusCode::CONFLICT,
            ErrorCode::DuplicateReference => StatusCode::CONFLICT,

            // Signature -> 401: an unsigned webhook is an unauthenticated
            // caller, not a malformed request
            ErrorCode::InvalidSignature => StatusCode::UNAUTHORIZED,

            // State -> 422
            ErrorCode::CampaignNotActive => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InvalidStateTransition => StatusCode::UNPROCESSABLE_ENTITY,

            // Infrastructure -> 5xx
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ScoringUnavailable => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code_str = match self {
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::InvalidSessionToken => "INVALID_SESSION_TOKEN",
            ErrorCode::InvalidRequestBody => "INVALID_REQUEST_BODY",
            ErrorCode::InvalidFieldValue => "INVALID_FIELD_VALUE",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::BrandProfileNotFound => "BRAND_PROFILE_NOT_FOUND",
            ErrorCode::CreatorProfileNotFound => "CREATOR_PROFILE_NOT_FOUND",
            ErrorCode::CampaignNotFound => "CAMPAIGN_NOT_FOUND",
            ErrorCode::ProposalNotFound => "PROPOSAL_NOT_FOUND",
            ErrorCode::DuplicateProposal => "DUPLICATE_PROPOSAL",
            ErrorCode::DuplicateReference => "DUPLICATE_REFERENCE",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::CampaignNotActive => "CAMPAIGN_NOT_ACTIVE",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ScoringUnavailable => "SCORING_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", code_str)
    }
}

// ============================================================================
// Structured Error Response
// ============================================================================

/// Structured error response for API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ErrorDetails,
}

/// Detailed error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Numeric error code for easy categorization
    pub numeric_code: u32,

    /// Human-readable error message
    pub message: String,

    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Related resource ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetails {
                code,
                numeric_code: code.numeric_code(),
                message: message.into(),
                details: None,
                resource_id: None,
            },
        }
    }

    /// Set additional details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Set related resource ID
    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.error.resource_id = Some(id.into());
        self
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.error.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code_str = self.error.code.to_string();
        let mut response = (status, Json(self)).into_response();

        // Add error code header for easier debugging
        if let Ok(code_value) = axum::http::HeaderValue::from_str(&code_str) {
            response.headers_mut().insert(
                axum::http::header::HeaderName::from_static("x-error-code"),
                code_value,
            );
        }

        response
    }
}

// ============================================================================
// Conversions from service errors
// ============================================================================

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => {
                ApiError::new(ErrorCode::DatabaseError, format!("Database error: {}", e))
            }
            StoreError::BrandNotFound(email) => ApiError::new(
                ErrorCode::BrandProfileNotFound,
                format!("Brand profile not found for {}", email),
            ),
            StoreError::CreatorNotFound(email) => ApiError::new(
                ErrorCode::CreatorProfileNotFound,
                format!("Creator profile not found for {}", email),
            ),
            StoreError::CampaignNotFound(id) => {
                ApiError::new(ErrorCode::CampaignNotFound, format!("Campaign not found: {}", id))
                    .with_resource_id(id.to_string())
            }
            StoreError::ProposalNotFound(id) => {
                ApiError::new(ErrorCode::ProposalNotFound, format!("Proposal not found: {}", id))
                    .with_resource_id(id.to_string())
            }
            StoreError::DuplicateProposal {
                campaign_id,
                creator_id,
            } => ApiError::new(
                ErrorCode::DuplicateProposal,
                "Creator already has a proposal on this campaign",
            )
            .with_details(serde_json::json!({
                "campaign_id": campaign_id,
                "creator_id": creator_id,
            })),
            StoreError::DuplicateReference(reference) => ApiError::new(
                ErrorCode::DuplicateReference,
                format!("Duplicate payment reference: {}", reference),
            )
            .with_resource_id(reference),
            StoreError::InvalidTransition {
                entity,
                entity_id,
                from,
                to,
            } => ApiError::new(
                ErrorCode::InvalidStateTransition,
                format!("Invalid state transition for {}/{}: {} -> {}", entity, entity_id, from, to),
            )
            .with_details(serde_json::json!({
                "entity": entity,
                "entity_id": entity_id,
                "from_state": from,
                "to_state": to,
            })),
            StoreError::CorruptRow {
                entity, entity_id, ..
            } => ApiError::new(
                ErrorCode::InternalError,
                format!("Stored record is corrupt: {}/{}", entity, entity_id),
            ),
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::CreatorNotFound(who) => ApiError::new(
                ErrorCode::CreatorProfileNotFound,
                format!("Creator profile not found for {}", who),
            ),
            IntakeError::CampaignNotFound(id) => {
                ApiError::new(ErrorCode::CampaignNotFound, format!("Campaign not found: {}", id))
                    .with_resource_id(id.to_string())
            }
            IntakeError::CampaignNotActive {
                campaign_id,
                status,
            } => ApiError::new(
                ErrorCode::CampaignNotActive,
                format!("Campaign {} is {}, not ACTIVE", campaign_id, status),
            )
            .with_resource_id(campaign_id.to_string()),
            IntakeError::DuplicateProposal {
                campaign_id,
                creator_id,
            } => ApiError::new(
                ErrorCode::DuplicateProposal,
                "Creator already has a proposal on this campaign",
            )
            .with_details(serde_json::json!({
                "campaign_id": campaign_id,
                "creator_id": creator_id,
            })),
            IntakeError::ProposalNotFound(id) => {
                ApiError::new(ErrorCode::ProposalNotFound, format!("Proposal not found: {}", id))
                    .with_resource_id(id.to_string())
            }
            IntakeError::ScoringFailed(e) => {
                ApiError::new(ErrorCode::ScoringUnavailable, format!("Scoring failed: {}", e))
            }
            IntakeError::Store(e) => e.into(),
        }
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::InvalidSignature => {
                ApiError::new(ErrorCode::InvalidSignature, "Invalid signature")
            }
            // 500 on purpose: the provider retries non-2xx, and a verified but
            // unparseable body deserves another attempt after a fix.
            SettlementError::MalformedEvent(e) => ApiError::new(
                ErrorCode::InternalError,
                format!("Webhook processing failed: {}", e),
            ),
            SettlementError::Store(e) => e.into(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a validation error with field details
pub fn validation_error(field: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::InvalidFieldValue, message.into()).with_details(serde_json::json!({
        "field": field
    }))
}

/// Create an unauthorized error
pub fn unauthorized(message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::AuthRequired, message.into())
}

/// Create an internal error
pub fn internal_error(message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::InternalError, message.into())
}

// ============================================================================
// Tests
// ============================================================================
