//! REST API route tables.

use axum::routing::{get, post};
use axum::Router;

use crate::api::handlers::{
    create_campaign, list_campaign_proposals, list_campaigns, list_creators,
    payment_provider_webhook, rescore_proposal, submit_proposal,
};
use crate::server::AppState;

/// Routes requiring an authenticated principal. The session middleware is
/// layered on top of this router by the server bootstrap.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/campaigns", post(create_campaign))
        .route(
            "/campaigns/:id/proposals",
            post(submit_proposal).get(list_campaign_proposals),
        )
}

/// Routes reachable without a session: open discovery, the provider webhook
/// (authenticated by its signature, not a session), and the worker-driven
/// rescore endpoint (authenticated inside the handler).
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/campaigns", get(list_campaigns))
        .route("/creators", get(list_creators))
        .route("/proposals/:id/rescore", post(rescore_proposal))
        .route("/webhooks/payment-provider", post(payment_provider_webhook))
}
