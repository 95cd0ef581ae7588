//! Script generation endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub username: String,
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub status: &'static str,
    pub script_data: JsonValue,
}

/// Generate a new script in a creator's established style.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    info!(
        username = %request.username,
        topic = %request.topic,
        "Received generate request"
    );

    let script_data = state
        .generator
        .generate(&request.username, &request.topic)
        .await?;

    Ok(Json(GenerateResponse {
        status: "success",
        script_data,
    }))
}
