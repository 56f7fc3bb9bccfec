//! Failure taxonomy of the authentication core.
use thiserror::Error;

use crate::storage::StoreError;

/// Errors raised by token handling, login and the auth gate.
///
/// Every variant is terminal for the current request; none is retried.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed, mis-signed, expired or wrong-scope token
    #[error("Invalid token")]
    InvalidToken,

    /// Presented refresh token is not the one on record; the session was revoked
    #[error("Refresh token reuse detected")]
    RefreshReuseDetected,

    /// Token was valid but its subject no longer resolves to an account
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Unknown identity or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token issue failed: {0}")]
    TokenIssue(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Failures caused by the server rather than by what the caller presented
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::TokenIssue(_) | AuthError::Store(_))
    }
}
