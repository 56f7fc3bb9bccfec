//! Contact CRUD handlers, scoped to the authenticated identity.
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use contacts_common::{Contact, ContactCreate, ContactUpdate};
use metrics::counter;

use crate::{
    error::AppError,
    metrics as keys,
    middleware::CurrentUser,
    validation::{validate_contact_create, validate_contact_update},
    AppState,
};

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("contact {id}"))
}

/// `GET /contacts/`
pub async fn list_contacts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Json<Vec<Contact>> {
    Json(state.contacts.list(user.identity()))
}

/// `GET /contacts/{id}`
pub async fn get_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<u64>,
) -> Result<Json<Contact>, AppError> {
    state
        .contacts
        .get(user.identity(), id)
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// `POST /contacts/`
pub async fn create_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<ContactCreate>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    validate_contact_create(&body)?;
    let contact = state.contacts.create(user.identity(), body);
    counter!(keys::CONTACT_CREATED).increment(1);
    Ok((StatusCode::CREATED, Json(contact)))
}

/// `PUT /contacts/{id}`
pub async fn update_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(body): Json<ContactUpdate>,
) -> Result<Json<Contact>, AppError> {
    validate_contact_update(&body)?;
    state
        .contacts
        .update(user.identity(), id, body)
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// `DELETE /contacts/{id}`
pub async fn delete_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<u64>,
) -> Result<Json<Contact>, AppError> {
    let removed = state
        .contacts
        .remove(user.identity(), id)
        .ok_or_else(|| not_found(id))?;
    counter!(keys::CONTACT_DELETED).increment(1);
    Ok(Json(removed))
}
