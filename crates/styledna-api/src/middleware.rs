//! Auth extractors.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use styledna_db::{get_creator_by_username, CreatorRow};

use crate::auth::decode_access_token;
use crate::error::ApiError;
use crate::state::AppState;

/// Required authentication: rejects with 401 when the bearer token is
/// missing or invalid.
pub struct AuthUser(pub CreatorRow);

/// Optional authentication: `None` when no (valid) bearer token is
/// present. Used on /analyze so an authenticated caller becomes the
/// owning creator.
pub struct MaybeAuthUser(pub Option<CreatorRow>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}

async fn load_user(state: &AppState, token: &str) -> Result<CreatorRow, ApiError> {
    let username = decode_access_token(token, &state.config.jwt_secret)?;
    get_creator_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
        Ok(AuthUser(load_user(state, token).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(MaybeAuthUser(None));
        };
        Ok(MaybeAuthUser(load_user(state, token).await.ok()))
    }
}
