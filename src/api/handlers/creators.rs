//! Public creator discovery.

use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::domain::{CreatorFilter, CreatorPublic};
use crate::server::AppState;
use crate::store::ProfileStore;

/// GET /creators?niche=&minScore= - Public creator listing, reputation
/// descending. Only public profile fields are exposed.
pub async fn list_creators(
    State(state): State<AppState>,
    Query(filter): Query<CreatorFilter>,
) -> Result<Json<Vec<CreatorPublic>>, ApiError> {
    let creators = state
        .store
        .list_creators(filter)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(creators.iter().map(|c| c.public()).collect()))
}
