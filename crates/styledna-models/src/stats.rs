//! Engagement statistics snapshot.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// View count above which a video is treated as having gone viral; the
/// analysis prompt asks the model to call out the specific triggers.
pub const VIRAL_VIEW_THRESHOLD: u64 = 100_000;

/// Immutable engagement snapshot taken when a video is analyzed.
///
/// Stored verbatim on the analysis row; never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoStats {
    pub title: String,
    pub uploader: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub duration_seconds: f64,
}

impl VideoStats {
    /// Whether the viral-trigger instruction should be included in prompts.
    pub fn is_viral(&self) -> bool {
        self.view_count > VIRAL_VIEW_THRESHOLD
    }
}
