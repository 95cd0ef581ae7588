//! Database operations for the `creators` table.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::debug;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `creators` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreatorRow {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    /// Synthesized Master Profile document; `{}` until first synthesis.
    pub master_profile: Json<JsonValue>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CreatorRow {
    /// Whether a Master Profile has ever been synthesized.
    pub fn has_master_profile(&self) -> bool {
        self.master_profile
            .0
            .as_object()
            .map(|o| !o.is_empty())
            .unwrap_or(false)
    }
}

const SELECT_COLUMNS: &str = "id, username, email, password_hash, master_profile, last_updated, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Get a creator by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such creator exists.
pub async fn get_creator(pool: &SqlitePool, id: i64) -> Result<CreatorRow, DbError> {
    sqlx::query_as::<_, CreatorRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM creators WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Get a creator by unique username, if one exists.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn get_creator_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<CreatorRow>, DbError> {
    Ok(sqlx::query_as::<_, CreatorRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM creators WHERE username = ?1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?)
}

/// Insert a creator explicitly (registration flow).
///
/// # Errors
///
/// Returns [`DbError::Conflict`] when the username is already taken.
pub async fn insert_creator(
    pool: &SqlitePool,
    username: &str,
    email: Option<&str>,
    password_hash: Option<&str>,
) -> Result<CreatorRow, DbError> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO creators (username, email, password_hash, master_profile, last_updated, created_at) \
         VALUES (?1, ?2, ?3, '{}', ?4, ?4)",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => get_creator_by_username(pool, username)
            .await?
            .ok_or(DbError::NotFound),
        Err(e) if is_unique_violation(&e) => {
            Err(DbError::Conflict(format!("username '{}' already registered", username)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Find a creator by username, creating it if absent.
///
/// Race-safe under concurrent first-time analyses for the same identity:
/// the insert is `ON CONFLICT(username) DO NOTHING` against the unique
/// index, and the unconditional re-select converges every caller on the
/// single surviving row. Never check-then-insert.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn find_or_create_creator(pool: &SqlitePool, username: &str) -> Result<CreatorRow, DbError> {
    let now = Utc::now();

    let inserted = sqlx::query(
        "INSERT INTO creators (username, master_profile, last_updated, created_at) \
         VALUES (?1, '{}', ?2, ?2) \
         ON CONFLICT(username) DO NOTHING",
    )
    .bind(username)
    .bind(now)
    .execute(pool)
    .await?;

    if inserted.rows_affected() > 0 {
        debug!(username = username, "Created new creator");
    }

    get_creator_by_username(pool, username)
        .await?
        .ok_or(DbError::NotFound)
}

/// Replace a creator's Master Profile wholesale and bump `last_updated`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such creator exists.
pub async fn update_master_profile(
    pool: &SqlitePool,
    id: i64,
    profile: &JsonValue,
) -> Result<(), DbError> {
    let updated = sqlx::query(
        "UPDATE creators SET master_profile = ?1, last_updated = ?2 WHERE id = ?3",
    )
    .bind(Json(profile))
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}
