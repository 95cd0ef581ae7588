//! Remote source metadata models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::stats::VideoStats;

/// Metadata describing a remote video resource, as reported by the
/// download collaborator's metadata-only probe.
///
/// Counter fields are optional because some platforms (and some cached
/// probes) omit them; the fetcher re-probes when required fields are
/// missing and normalizes the result into [`VideoStats`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SourceMetadata {
    /// Stable identifier of the remote resource (de-duplication key).
    pub source_id: String,

    /// Container extension the download would produce (e.g. "mp4").
    #[serde(default)]
    pub ext: Option<String>,

    pub title: Option<String>,

    /// Channel / account that published the video.
    pub uploader: Option<String>,

    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,

    /// Duration in seconds.
    pub duration_seconds: Option<f64>,
}

impl SourceMetadata {
    /// Whether the probe returned everything an analysis needs.
    ///
    /// A cached artifact from a prior session can leave the fetcher with a
    /// metadata record that predates the probe fields we now require; such
    /// records trigger a re-probe.
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.uploader.is_some() && self.view_count.is_some()
    }

    /// Normalize into an immutable stats snapshot with defaults filled in.
    pub fn to_stats(&self) -> VideoStats {
        VideoStats {
            title: self.title.clone().unwrap_or_else(|| "Unknown Title".to_string()),
            uploader: self
                .uploader
                .clone()
                .unwrap_or_else(|| "Unknown Author".to_string()),
            view_count: self.view_count.unwrap_or(0),
            like_count: self.like_count.unwrap_or(0),
            comment_count: self.comment_count.unwrap_or(0),
            duration_seconds: self.duration_seconds.unwrap_or(0.0),
        }
    }
}

/// A downloaded (or cache-reused) video artifact plus its metadata.
#[derive(Debug, Clone)]
pub struct FetchedVideo {
    /// Path of the local media file inside the shared artifact directory.
    pub local_path: PathBuf,

    /// Stable source identifier the artifact is keyed by.
    pub source_id: String,

    /// Normalized engagement snapshot taken at fetch time.
    pub stats: VideoStats,
}
