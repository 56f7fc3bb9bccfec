// ============================
// contacts-backend-lib/src/config/mod.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::token::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "contacts.toml";

/// Prefix of overriding environment variables; nested keys split on `__`
pub const ENV_PREFIX: &str = "CONTACTS_";

/// Longest accepted token lifetime (100 years)
pub const MAX_TOKEN_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration validation failures
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("auth.jwt_secret must be set")]
    MissingSecret,

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid token lifetime: {0}")]
    InvalidTtl(String),

    #[error("invalid rate limit: {0}")]
    InvalidRateLimit(String),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level, overridden by `RUST_LOG` when set
    pub log_level: String,
    /// Credential directory; in-memory storage when unset
    pub data_dir: Option<PathBuf>,
    pub auth: AuthSettings,
    pub rate_limit: RateLimitSettings,
}

/// Token signing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC signing secret; there is no built-in default
    pub jwt_secret: String,
    /// One of HS256, HS384, HS512
    pub jwt_algorithm: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
}

/// Fixed-window admission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Requests admitted per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
    /// Upper bound on tracked clients
    pub max_clients: usize,
    /// Period of the stale-window sweep
    pub sweep_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            log_level: "info".to_string(),
            data_dir: None,
            auth: AuthSettings::default(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_algorithm: "HS256".to_string(),
            access_token_ttl_secs: ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: REFRESH_TOKEN_TTL_SECS,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 3,
            window_secs: 120,
            max_clients: 10_000,
            sweep_interval_secs: 60,
        }
    }
}

impl AuthSettings {
    /// Parse the configured algorithm, accepting only HMAC variants
    pub fn algorithm(&self) -> Result<Algorithm, ConfigError> {
        match Algorithm::from_str(&self.jwt_algorithm) {
            Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
            _ => Err(ConfigError::UnsupportedAlgorithm(self.jwt_algorithm.clone())),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        self.algorithm()?;
        if self.access_token_ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl("access token ttl is zero".into()));
        }
        if self.access_token_ttl_secs > MAX_TOKEN_TTL_SECS
            || self.refresh_token_ttl_secs > MAX_TOKEN_TTL_SECS
        {
            return Err(ConfigError::InvalidTtl(format!(
                "token ttl cannot exceed {MAX_TOKEN_TTL_SECS} seconds"
            )));
        }
        if self.refresh_token_ttl_secs <= self.access_token_ttl_secs {
            return Err(ConfigError::InvalidTtl(
                "refresh token ttl must exceed access token ttl".into(),
            ));
        }
        Ok(())
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests == 0 {
            return Err(ConfigError::InvalidRateLimit("max_requests is zero".into()));
        }
        if self.window_secs == 0 {
            return Err(ConfigError::InvalidRateLimit("window_secs is zero".into()));
        }
        if self.max_clients == 0 {
            return Err(ConfigError::InvalidRateLimit("max_clients is zero".into()));
        }
        Ok(())
    }
}

impl Settings {
    /// Layered sources: defaults, then the TOML file, then `CONTACTS_*` variables
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate settings from the default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load and validate settings, reading `path` instead of `contacts.toml`
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let settings: Settings = Self::figment(path).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        self.auth.validate()?;
        self.rate_limit.validate()
    }
}
