//! Creator profile endpoints.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::SqlitePool;
use tracing::info;

use styledna_db::{get_creator_by_username, list_analyses_for_creator, CreatorRow};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VideoSummaryResponse {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub master_profile: JsonValue,
    pub videos_count: usize,
    pub videos: Vec<VideoSummaryResponse>,
}

async fn build_profile_response(pool: &SqlitePool, creator: CreatorRow) -> ApiResult<ProfileResponse> {
    let videos: Vec<VideoSummaryResponse> = list_analyses_for_creator(pool, creator.id)
        .await?
        .into_iter()
        .map(|row| VideoSummaryResponse {
            id: row.id,
            title: row.title,
            url: row.youtube_url,
            views: row.stats.0["view_count"].as_u64().unwrap_or(0),
            created_at: row.created_at,
        })
        .collect();

    Ok(ProfileResponse {
        username: creator.username,
        master_profile: creator.master_profile.0,
        videos_count: videos.len(),
        videos,
    })
}

async fn creator_or_404(pool: &SqlitePool, username: &str) -> ApiResult<CreatorRow> {
    get_creator_by_username(pool, username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("creator '{}'", username)))
}

/// Get a creator's profile: Master Profile plus analyzed-video list.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let creator = creator_or_404(&state.pool, &username).await?;
    Ok(Json(build_profile_response(&state.pool, creator).await?))
}

/// Force a re-synthesis of the creator's Master Profile.
///
/// Unlike the post-analysis housekeeping pass, an explicit refresh
/// surfaces synthesis failures to the caller.
pub async fn refresh_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let creator = creator_or_404(&state.pool, &username).await?;

    info!(username = %username, "Refreshing Master Profile");
    state
        .synthesizer
        .synthesize(creator.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to refresh profile: {}", e)))?;

    let reloaded = creator_or_404(&state.pool, &username).await?;
    Ok(Json(build_profile_response(&state.pool, reloaded).await?))
}
