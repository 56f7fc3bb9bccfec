// ============================
// contacts-backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

mod error;
pub mod password;
mod service;
mod service_impl;
pub mod token;

pub use error::AuthError;
pub use password::{generate_salt, hash_password, verify_password, Salt};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{Claims, Scope, TokenService};
