// crates/backend-lib/src/middleware/mod.rs

//! Middleware and extractors guarding the contacts API.

pub mod auth;
pub mod rate_limit;

pub use auth::{bearer_token, CurrentUser};
pub use rate_limit::{rate_limit, RateLimiter};
