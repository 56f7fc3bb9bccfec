// ============================
// contacts-backend-lib/src/router.rs
// ============================
//! HTTP router.
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{self, contacts, users};
use crate::middleware::rate_limit;
use crate::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/users/register/", post(users::register))
        .route("/users/login/", post(users::login))
        .route("/users/refresh_token", get(users::refresh_token));

    let contact_routes = Router::new()
        .route(
            "/contacts/",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route(
            "/contacts/{id}",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .route_layer(from_fn_with_state(state.clone(), rate_limit));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health_check))
        .merge(user_routes)
        .merge(contact_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
