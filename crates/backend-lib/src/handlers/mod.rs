// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers. Each one delegates straight to the auth service or contact book.

pub mod contacts;
pub mod users;

use axum::Json;
use contacts_common::HealthStatus;

/// `GET /`
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK".to_string(),
    })
}
