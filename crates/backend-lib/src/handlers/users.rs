//! Account handlers: register, login, refresh.
use axum::{extract::State, http::HeaderMap, http::StatusCode, Form, Json};
use contacts_common::{LoginForm, RegisterRequest, TokenPair, UserResponse};

use crate::{auth::AuthError, error::AppError, middleware::bearer_token, AppState};

/// `POST /users/register/`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state.auth.register(&body.email, body.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /users/login/`
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state.auth.login(&form.username, &form.password).await?;
    Ok(Json(pair))
}

/// `GET /users/refresh_token`, presenting the refresh token as the bearer credential
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenPair>, AppError> {
    let token = bearer_token(&headers).ok_or(AuthError::InvalidToken)?;
    let pair = state.auth.refresh(token).await?;
    Ok(Json(pair))
}
