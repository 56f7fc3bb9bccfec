// ============================
// contacts-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the contacts server.

pub mod auth;
pub mod config;
pub mod contacts;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth, TokenService};
use crate::config::{ConfigError, Settings};
use crate::contacts::ContactBook;
use crate::middleware::rate_limit::RateLimiter;
use crate::storage::{FlatFileUserStore, MemoryUserStore, UserStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Contact storage
    pub contacts: Arc<ContactBook>,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
    /// Rate limiter for the contacts routes
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Create a new application state over the given credential store
    pub fn new<U: UserStore + 'static>(store: U, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let tokens = TokenService::from_settings(&settings.auth)?;
        let rate_limiter = Arc::new(RateLimiter::from_settings(&settings.rate_limit));

        Ok(Self {
            auth: Arc::new(DefaultAuth::new(store, tokens)),
            contacts: Arc::new(ContactBook::new()),
            settings: Arc::new(settings),
            rate_limiter,
        })
    }

    /// Create the state, storing credentials on disk when `data_dir` is set
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let state = match settings.data_dir.clone() {
            Some(dir) => Self::new(FlatFileUserStore::new(dir)?, settings)?,
            None => Self::new(MemoryUserStore::new(), settings)?,
        };
        Ok(state)
    }
}
