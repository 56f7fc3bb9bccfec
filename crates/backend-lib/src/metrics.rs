// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_FAILURE: &str = "auth.login.failure";
pub const USER_REGISTERED: &str = "auth.user.registered";
pub const REFRESH_ROTATED: &str = "auth.refresh.rotated";
pub const REFRESH_REUSE_DETECTED: &str = "auth.refresh.reuse_detected";
pub const RATELIMIT_DENIED: &str = "ratelimit.denied";
pub const RATELIMIT_EVICTED: &str = "ratelimit.evicted";
pub const CONTACT_CREATED: &str = "contacts.created";
pub const CONTACT_DELETED: &str = "contacts.deleted";
