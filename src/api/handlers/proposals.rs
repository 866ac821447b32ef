//! Proposal intake handlers.

use axum::extract::{Extension, Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{unauthorized, validation_error, ApiError};
use crate::auth::PrincipalExt;
use crate::domain::{CampaignId, Proposal, ProposalId, ProposalWithCreator};
use crate::intake::RescoreOutcome;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitProposalRequest {
    pub pitch: String,
    pub rate: Decimal,
}

/// POST /campaigns/:id/proposals - Creator submits a proposal.
pub async fn submit_proposal(
    State(state): State<AppState>,
    Extension(PrincipalExt(principal)): Extension<PrincipalExt>,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<SubmitProposalRequest>,
) -> Result<(StatusCode, Json<Proposal>), ApiError> {
    if request.pitch.trim().is_empty() {
        return Err(validation_error("pitch", "pitch must not be empty"));
    }
    if request.rate <= Decimal::ZERO {
        return Err(validation_error("rate", "rate must be positive"));
    }

    let proposal = state
        .intake
        .submit(
            &principal,
            CampaignId::from_uuid(campaign_id),
            request.pitch,
            request.rate,
        )
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(proposal)))
}

/// GET /campaigns/:id/proposals - Proposals for a campaign, score-descending,
/// joined with creator public profiles. Authentication only; no ownership
/// check in the current design.
pub async fn list_campaign_proposals(
    State(state): State<AppState>,
    Extension(PrincipalExt(_principal)): Extension<PrincipalExt>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<Vec<ProposalWithCreator>>, ApiError> {
    let proposals = state
        .intake
        .list_for_campaign(CampaignId::from_uuid(campaign_id))
        .await
        .map_err(ApiError::from)?;
    Ok(Json(proposals))
}

/// POST /proposals/:id/rescore - Re-run scoring for an unscored proposal.
///
/// Called by the internal scoring worker with a shared secret header; a
/// session token works as a fallback for manual triggering. Unlike intake,
/// a scoring failure here is surfaced, since the score is the whole point.
pub async fn rescore_proposal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(proposal_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize_rescore(&state, &headers)?;

    let outcome = state
        .intake
        .rescore(ProposalId::from_uuid(proposal_id))
        .await
        .map_err(ApiError::from)?;

    let body = match outcome {
        RescoreOutcome::Scored(proposal) => serde_json::json!({
            "rescored": true,
            "proposal": proposal,
        }),
        RescoreOutcome::AlreadyScored(proposal) => serde_json::json!({
            "rescored": false,
            "proposal": proposal,
        }),
    };
    Ok(Json(body))
}

/// Worker secret first, session token second. This route lives outside the
/// session middleware so that headless workers can reach it.
fn authorize_rescore(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if let Some(expected) = &state.worker_secret {
        let presented = headers.get("x-worker-secret").and_then(|v| v.to_str().ok());
        if presented == Some(expected.as_str()) {
            return Ok(());
        }
    }

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|header| header.strip_prefix("Bearer ").unwrap_or(header));
    match token {
        Some(token) if state.sessions.validate(token).is_ok() => Ok(()),
        _ => Err(unauthorized("Missing worker secret or session token")),
    }
}
