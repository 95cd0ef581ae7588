//! Registration and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use styledna_db::{get_creator_by_username, insert_creator};

use crate::auth::{create_access_token, hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Register a new creator account.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let password_hash = hash_password(&request.password);
    let creator = insert_creator(
        &state.pool,
        request.username.trim(),
        Some(request.email.trim()),
        Some(&password_hash),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: creator.id,
            username: creator.username,
            email: creator.email,
        }),
    ))
}

/// Login and get an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let creator = get_creator_by_username(&state.pool, &request.username).await?;

    let valid = creator
        .as_ref()
        .and_then(|c| c.password_hash.as_deref())
        .map(|hash| verify_password(&request.password, hash))
        .unwrap_or(false);

    if !valid {
        return Err(ApiError::unauthorized("Incorrect username or password"));
    }

    let access_token = create_access_token(
        &request.username,
        &state.config.jwt_secret,
        state.config.token_expiry_days,
    )?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// Get the current authenticated creator.
pub async fn me(AuthUser(creator): AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        id: creator.id,
        username: creator.username,
        email: creator.email,
    })
}
