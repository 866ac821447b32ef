//! Bearer session-token validation.
//!
//! Stand-in for the external identity provider: tokens are opaque strings
//! formatted `gv_<random>`, stored hashed, and resolved to a principal. The
//! production deployment registers tokens out-of-band (or runs with
//! `AUTH_MODE=disabled` behind a trusted gateway); tests mint them directly.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;

use super::{AuthError, Principal};

/// Session token prefix.
pub const SESSION_TOKEN_PREFIX: &str = "gv_";

/// In-memory session-token validator.
pub struct SessionValidator {
    /// token hash -> principal. Plaintext tokens are never stored.
    sessions: RwLock<HashMap<String, Principal>>,
}

impl SessionValidator {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Hash a token for storage.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Mint a fresh token for a principal and register it.
    /// Returns the plaintext token; only its hash is retained.
    pub fn issue(&self, principal: Principal) -> String {
        use rand::Rng;
        let random_bytes: [u8; 24] = rand::thread_rng().gen();
        let token = format!("{}{}", SESSION_TOKEN_PREFIX, hex::encode(random_bytes));
        self.register(&token, principal);
        token
    }

    /// Register an externally supplied token for a principal.
    pub fn register(&self, token: &str, principal: Principal) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(Self::hash_token(token), principal);
    }

    /// Validate a bearer token and return the principal it belongs to.
    pub fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        if !token.starts_with(SESSION_TOKEN_PREFIX) {
            return Err(AuthError::InvalidToken);
        }
        let sessions = self.sessions.read().unwrap();
        sessions
            .get(&Self::hash_token(token))
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }

    /// Invalidate a token.
    pub fn revoke(&self, token: &str) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(&Self::hash_token(token));
    }
}

impl Default for SessionValidator {
    fn default() -> Self {
        Self::new()
    }
}
