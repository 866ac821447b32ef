//! Authentication middleware for Axum.
//!
//! Resolves the bearer token into a [`Principal`] and attaches it to the
//! request as an extension. Applied to the protected router only; public
//! routes (discovery, webhooks) never pass through here.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::domain::Role;

use super::{AuthError, Principal, SessionValidator};

/// Principal extension attached to authenticated requests.
#[derive(Clone)]
pub struct PrincipalExt(pub Principal);

/// Authentication middleware configuration/state.
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub sessions: Arc<SessionValidator>,
    /// If false, unauthenticated requests run as a synthetic dev principal.
    pub require_auth: bool,
}

/// Authentication middleware for the protected router.
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|header| header.strip_prefix("Bearer ").unwrap_or(header));

    let principal = match token {
        Some(token) => match state.sessions.validate(token) {
            Ok(principal) => principal,
            Err(e) => {
                if state.require_auth {
                    return auth_error_response(e);
                }
                dev_principal()
            }
        },
        None => {
            if state.require_auth {
                return auth_error_response(AuthError::MissingAuth);
            }
            dev_principal()
        }
    };

    request.extensions_mut().insert(PrincipalExt(principal));
    next.run(request).await
}

fn dev_principal() -> Principal {
    Principal::new("dev@localhost", Role::Brand)
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingAuth => "Missing authentication",
        AuthError::InvalidToken => "Invalid session token",
    };

    (
        StatusCode::UNAUTHORIZED,
        axum::Json(serde_json::json!({
            "error": message,
            "code": format!("{:?}", error).to_lowercase(),
        })),
    )
        .into_response()
}
