//! Authentication for the marketplace core.
//!
//! The identity provider is an external collaborator: it authenticates a
//! request and yields a principal carrying an email and a role. This module
//! is the narrow adapter — a bearer session-token validator plus the Axum
//! middleware that resolves tokens into a [`Principal`] request extension.
//! No handler reaches into ambient session state.

mod middleware;
mod session;

pub use middleware::{auth_middleware, AuthMiddlewareState, PrincipalExt};
pub use session::{SessionValidator, SESSION_TOKEN_PREFIX};

use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// The authenticated identity making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }
}

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing authentication")]
    MissingAuth,
    #[error("invalid session token")]
    InvalidToken,
}
