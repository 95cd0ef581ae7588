//! Video analysis endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::info;

use styledna_models::{TranscriptSegment, VideoStats};

use crate::error::{ApiError, ApiResult};
use crate::middleware::MaybeAuthUser;
use crate::security::validate_video_url;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ArtifactPathsResponse {
    pub video: String,
    pub audio: String,
    pub frames: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub video_id: i64,
    pub username: String,
    pub transcript_text: String,
    pub segments: Vec<TranscriptSegment>,
    pub paths: ArtifactPathsResponse,
    pub style_passport: JsonValue,
    pub meta_stats: VideoStats,
}

/// Analyze a video: download, extract, transcribe, AI-analyze, persist,
/// and re-synthesize the owning creator's Master Profile.
pub async fn analyze(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let url = validate_video_url(&request.url).map_err(ApiError::bad_request)?;

    info!(url = %url, authenticated = caller.is_some(), "Received analyze request");

    let creator_id_override = caller.map(|c| c.id);
    let report = state.pipeline.run(&url, creator_id_override).await?;

    Ok(Json(AnalyzeResponse {
        status: "success",
        video_id: report.video_row_id,
        username: report.creator_username,
        transcript_text: report.transcript.full_text,
        segments: report.transcript.segments,
        paths: ArtifactPathsResponse {
            video: report.paths.video.display().to_string(),
            audio: report.paths.audio.display().to_string(),
            frames: report.paths.frames.display().to_string(),
        },
        style_passport: report.style_passport,
        meta_stats: report.stats,
    }))
}
