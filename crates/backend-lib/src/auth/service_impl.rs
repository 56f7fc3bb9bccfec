use async_trait::async_trait;
use contacts_common::{TokenPair, UserResponse};
use metrics::counter;
use tracing::{debug, info, warn};

use super::password::{hash_password_secure, verify_password};
use super::{AuthError, AuthService, TokenService};
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::{RotateOutcome, UserStore};
use crate::validation::{validate_email, validate_password};

/// Auth service over any [`UserStore`]
pub struct DefaultAuth<U> {
    store: U,
    tokens: TokenService,
}

impl<U: UserStore> DefaultAuth<U> {
    pub fn new(store: U, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn store(&self) -> &U {
        &self.store
    }

    fn issue_pair(&self, subject: &str) -> Result<TokenPair, AuthError> {
        Ok(TokenPair::bearer(
            self.tokens.issue_access(subject)?,
            self.tokens.issue_refresh(subject)?,
        ))
    }
}

#[async_trait]
impl<U: UserStore> AuthService for DefaultAuth<U> {
    async fn register(&self, email: &str, mut password: String) -> Result<UserResponse, AppError> {
        validate_email(email)?;
        validate_password(&password)?;

        let (password_hash, salt) = hash_password_secure(&mut password);
        let credential = self
            .store
            .persist_new_credential(email, password_hash, salt)
            .await?;

        counter!(keys::USER_REGISTERED).increment(1);
        info!(identity = %credential.identity, "account registered");
        Ok(UserResponse {
            email: credential.identity,
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(credential) = self.store.find_by_identity(email).await? else {
            counter!(keys::LOGIN_FAILURE).increment(1);
            debug!(identity = %email, "login for unknown identity");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&credential.password_hash, &credential.salt, password) {
            counter!(keys::LOGIN_FAILURE).increment(1);
            debug!(identity = %email, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.issue_pair(&credential.identity)?;
        self.store
            .persist_refresh_token(&credential.identity, Some(pair.refresh_token.clone()))
            .await?;

        counter!(keys::LOGIN_SUCCESS).increment(1);
        info!(identity = %credential.identity, "login succeeded");
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let subject = self.tokens.verify_refresh(refresh_token)?;
        let pair = self.issue_pair(&subject)?;

        match self
            .store
            .rotate_refresh_token(&subject, refresh_token, pair.refresh_token.clone())
            .await?
        {
            RotateOutcome::Rotated => {
                counter!(keys::REFRESH_ROTATED).increment(1);
                debug!(identity = %subject, "refresh token rotated");
                Ok(pair)
            },
            RotateOutcome::Mismatch => {
                counter!(keys::REFRESH_REUSE_DETECTED).increment(1);
                warn!(identity = %subject, "superseded refresh token presented, session revoked");
                Err(AuthError::RefreshReuseDetected)
            },
            RotateOutcome::Missing => {
                debug!(identity = %subject, "refresh for deleted account");
                Err(AuthError::Unauthenticated)
            },
        }
    }

    async fn authenticate(&self, access_token: &str) -> Result<String, AuthError> {
        let subject = self
            .tokens
            .verify_access(access_token)
            .map_err(|_| AuthError::Unauthenticated)?;

        if self.store.find_by_identity(&subject).await?.is_none() {
            debug!(identity = %subject, "token subject no longer exists");
            return Err(AuthError::Unauthenticated);
        }
        Ok(subject)
    }
}
