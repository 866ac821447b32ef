//! Payment provider webhook handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::api::error::ApiError;
use crate::server::AppState;

/// Signature header carrying `hex(HMAC_SHA512(secret, raw_body))`.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// POST /webhooks/payment-provider - Provider payment event callback.
///
/// The handler takes the raw body bytes: verification must run over the
/// exact payload as received, never a re-serialised form. Once the signature
/// verifies, every outcome (confirmed, duplicate, unknown reference, ignored
/// event) acknowledges with 200 so the provider stops retrying; only a bad
/// signature (401) or an unparseable body (500) is non-2xx.
pub async fn payment_provider_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    state
        .settlement
        .handle(&body, signature)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(serde_json::json!({ "received": true })))
}
