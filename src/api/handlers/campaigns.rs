//! Campaign lifecycle handlers.

use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::error::{validation_error, ApiError, ErrorCode};
use crate::auth::PrincipalExt;
use crate::domain::{Campaign, NewCampaign};
use crate::server::AppState;
use crate::store::{CampaignStore, ProfileStore};

#[derive(Debug, Deserialize)]
pub struct CampaignQuery {
    /// Optional single niche tag to intersect with.
    pub niche: Option<String>,
}

/// POST /campaigns - Brand posts a new campaign.
pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(PrincipalExt(principal)): Extension<PrincipalExt>,
    Json(fields): Json<NewCampaign>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    let now = Utc::now();
    if fields.budget <= Decimal::ZERO {
        return Err(validation_error("budget", "budget must be positive"));
    }
    if fields.deadline <= now {
        return Err(validation_error("deadline", "deadline must be in the future"));
    }

    let brand = state
        .store
        .brand_by_email(&principal.email)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError::new(
                ErrorCode::BrandProfileNotFound,
                format!("Brand profile not found for {}", principal.email),
            )
        })?;

    let campaign = Campaign::create(brand.id, fields, now);
    state
        .store
        .insert_campaign(campaign.clone())
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(campaign)))
}

/// GET /campaigns?niche= - Open discovery: ACTIVE campaigns, newest first.
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<CampaignQuery>,
) -> Result<Json<Vec<Campaign>>, ApiError> {
    let campaigns = state
        .store
        .list_active_campaigns(query.niche.as_deref())
        .await
        .map_err(ApiError::from)?;
    Ok(Json(campaigns))
}
