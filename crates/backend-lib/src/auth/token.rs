// ============================
// contacts-backend-lib/src/auth/token.rs
// ============================
//! Signed access and refresh tokens.
//!
//! Both kinds are JWTs carrying the same fixed claim set; the `scope` claim
//! keeps one from being accepted where the other is expected.
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::config::{AuthSettings, ConfigError};

/// Access token lifetime (30 minutes)
pub const ACCESS_TOKEN_TTL_SECS: u64 = 30 * 60;

/// Refresh token lifetime (7 days)
pub const REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Which kind of token a claim set belongs to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Access,
    Refresh,
}

/// Claims carried by every token; unknown scopes fail at decode time
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject identity
    pub sub: String,
    /// Expiry, seconds since the Unix epoch
    pub exp: u64,
    pub scope: Scope,
    /// Unique token id; two tokens issued in the same second still differ
    pub jti: String,
}

/// Issues and verifies tokens with a process-wide key
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from an HMAC secret
    pub fn new(
        secret: &[u8],
        algorithm: Algorithm,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Build from validated settings
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, ConfigError> {
        let algorithm = settings.algorithm()?;
        if settings.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self::new(
            settings.jwt_secret.as_bytes(),
            algorithm,
            secs(settings.access_token_ttl_secs)?,
            secs(settings.refresh_token_ttl_secs)?,
        ))
    }

    pub fn issue_access(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_access_at(subject, Utc::now())
    }

    pub fn issue_refresh(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_refresh_at(subject, Utc::now())
    }

    /// Issue an access token as if the current time were `now`
    pub fn issue_access_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        self.issue(subject, Scope::Access, now, self.access_ttl)
    }

    /// Issue a refresh token as if the current time were `now`
    pub fn issue_refresh_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        self.issue(subject, Scope::Refresh, now, self.refresh_ttl)
    }

    /// Return the subject of a valid, unexpired access token
    pub fn verify_access(&self, token: &str) -> Result<String, AuthError> {
        self.verify(token, Scope::Access)
    }

    /// Return the subject of a valid, unexpired refresh token
    pub fn verify_refresh(&self, token: &str) -> Result<String, AuthError> {
        self.verify(token, Scope::Refresh)
    }

    fn issue(
        &self,
        subject: &str,
        scope: Scope,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::TokenIssue("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: u64::try_from(expires.timestamp()).unwrap_or(0),
            scope,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    fn verify(&self, token: &str, expected: Scope) -> Result<String, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        // Signature, format and expiry failures all surface as InvalidToken
        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AuthError::InvalidToken
        })?;

        if data.claims.scope != expected {
            tracing::debug!(?expected, got = ?data.claims.scope, "token scope mismatch");
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims.sub)
    }
}

fn secs(value: u64) -> Result<Duration, ConfigError> {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ConfigError::InvalidTtl(format!("{value} seconds is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl(value: u64) -> Duration {
        secs(value).unwrap()
    }

    fn service() -> TokenService {
        TokenService::new(
            b"test-secret",
            Algorithm::HS256,
            ttl(ACCESS_TOKEN_TTL_SECS),
            ttl(REFRESH_TOKEN_TTL_SECS),
        )
    }

    #[test]
    fn test_access_round_trip() {
        let tokens = service();
        let token = tokens.issue_access("a@x.com").unwrap();
        assert_eq!(tokens.verify_access(&token).unwrap(), "a@x.com");
    }

    #[test]
    fn test_refresh_round_trip() {
        let tokens = service();
        let token = tokens.issue_refresh("a@x.com").unwrap();
        assert_eq!(tokens.verify_refresh(&token).unwrap(), "a@x.com");
    }

    #[test]
    fn test_tokens_issued_together_differ() {
        let tokens = service();
        let first = tokens.issue_refresh("a@x.com").unwrap();
        let second = tokens.issue_refresh("a@x.com").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_scopes_are_not_interchangeable() {
        let tokens = service();
        let access = tokens.issue_access("a@x.com").unwrap();
        let refresh = tokens.issue_refresh("a@x.com").unwrap();

        assert!(matches!(tokens.verify_refresh(&access), Err(AuthError::InvalidToken)));
        assert!(matches!(tokens.verify_access(&refresh), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_access_expires_after_ttl() {
        let tokens = service();
        let fresh = tokens
            .issue_access_at("a@x.com", Utc::now() - Duration::minutes(29))
            .unwrap();
        assert!(tokens.verify_access(&fresh).is_ok());

        let stale = tokens
            .issue_access_at("a@x.com", Utc::now() - Duration::minutes(31))
            .unwrap();
        assert!(matches!(tokens.verify_access(&stale), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_refresh_expires_after_ttl() {
        let tokens = service();
        let stale = tokens
            .issue_refresh_at("a@x.com", Utc::now() - Duration::days(8))
            .unwrap();
        assert!(matches!(tokens.verify_refresh(&stale), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let other = TokenService::new(
            b"another-secret",
            Algorithm::HS256,
            ttl(ACCESS_TOKEN_TTL_SECS),
            ttl(REFRESH_TOKEN_TTL_SECS),
        );
        let token = other.issue_access("a@x.com").unwrap();
        assert!(matches!(service().verify_access(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let hs512 = TokenService::new(
            b"test-secret",
            Algorithm::HS512,
            ttl(ACCESS_TOKEN_TTL_SECS),
            ttl(REFRESH_TOKEN_TTL_SECS),
        );
        let token = hs512.issue_access("a@x.com").unwrap();
        assert!(service().verify_access(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = service();
        for junk in ["", "abc", "a.b.c", "Bearer xyz"] {
            assert!(matches!(tokens.verify_access(junk), Err(AuthError::InvalidToken)));
        }
    }

    #[test]
    fn test_unknown_scope_rejected_at_decode() {
        #[derive(Serialize)]
        struct Loose<'a> {
            sub: &'a str,
            exp: u64,
            scope: &'a str,
            jti: &'a str,
        }
        let exp = u64::try_from((Utc::now() + Duration::minutes(5)).timestamp()).unwrap();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Loose { sub: "a@x.com", exp, scope: "admin", jti: "j" },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(service().verify_access(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expiry_past_calendar_range_is_an_error() {
        let tokens = service();
        let err = tokens
            .issue_access_at("a@x.com", DateTime::<Utc>::MAX_UTC)
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenIssue(_)));
    }

    #[test]
    fn test_from_settings_rejects_unrepresentable_ttl() {
        let settings = AuthSettings {
            jwt_secret: "test-secret".to_string(),
            refresh_token_ttl_secs: 10_u64.pow(16),
            ..AuthSettings::default()
        };
        assert!(matches!(
            TokenService::from_settings(&settings),
            Err(ConfigError::InvalidTtl(_))
        ));
        assert!(secs(u64::MAX).is_err());
    }
}
