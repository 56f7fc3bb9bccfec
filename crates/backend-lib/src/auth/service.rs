use async_trait::async_trait;
use contacts_common::{TokenPair, UserResponse};

use super::AuthError;
use crate::error::AppError;

/// Account and token operations used by the HTTP layer
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account; fails with `AccountExists` when the identity is taken
    async fn register(&self, email: &str, password: String) -> Result<UserResponse, AppError>;

    /// Check a password and issue a fresh token pair, replacing any live refresh token
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Rotate a refresh token into a new pair
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Resolve an access token to the identity it was issued for
    async fn authenticate(&self, access_token: &str) -> Result<String, AuthError>;
}
