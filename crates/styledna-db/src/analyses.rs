//! Database operations for the `video_analyses` table.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `video_analyses` table. Immutable once written.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoAnalysisRow {
    pub id: i64,
    pub creator_id: i64,
    pub youtube_url: String,
    pub title: String,
    /// Engagement snapshot taken at analysis time.
    pub stats: Json<JsonValue>,
    /// The per-video Style Passport document.
    pub analysis_result: Json<JsonValue>,
    pub created_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str =
    "id, creator_id, youtube_url, title, stats, analysis_result, created_at";

/// Insert one analysis row and return its id.
///
/// The owning creator must already be committed; the foreign key rejects
/// orphan rows.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn insert_video_analysis(
    pool: &SqlitePool,
    creator_id: i64,
    youtube_url: &str,
    title: &str,
    stats: &JsonValue,
    analysis_result: &JsonValue,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO video_analyses (creator_id, youtube_url, title, stats, analysis_result, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         RETURNING id",
    )
    .bind(creator_id)
    .bind(youtube_url)
    .bind(title)
    .bind(Json(stats))
    .bind(Json(analysis_result))
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Get one analysis row by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such row exists.
pub async fn get_video_analysis(pool: &SqlitePool, id: i64) -> Result<VideoAnalysisRow, DbError> {
    sqlx::query_as::<_, VideoAnalysisRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM video_analyses WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// List every analysis for a creator, oldest first.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn list_analyses_for_creator(
    pool: &SqlitePool,
    creator_id: i64,
) -> Result<Vec<VideoAnalysisRow>, DbError> {
    Ok(sqlx::query_as::<_, VideoAnalysisRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM video_analyses WHERE creator_id = ?1 ORDER BY created_at, id"
    ))
    .bind(creator_id)
    .fetch_all(pool)
    .await?)
}

/// Count analyses for a creator.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn count_analyses_for_creator(pool: &SqlitePool, creator_id: i64) -> Result<i64, DbError> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(*) FROM video_analyses WHERE creator_id = ?1")
            .bind(creator_id)
            .fetch_one(pool)
            .await?,
    )
}
