//! The analysis pipeline orchestrator.
//!
//! Runs download -> extraction -> transcription -> analysis in sequence,
//! aborting on the first hard failure and reporting the failing stage.
//! Profile synthesis afterwards is best-effort: its failures are logged
//! and never surfaced.

use std::path::PathBuf;

use serde_json::Value as JsonValue;
use tracing::{info, warn};

use styledna_media::{Fetcher, MediaExtractor, Transcriber, FRAME_INTERVAL_SECONDS};
use styledna_models::{Transcript, VideoStats};

use crate::analyzer::StyleAnalyzer;
use crate::error::{PipelineError, PipelineResult};
use crate::synthesizer::ProfileSynthesizer;

/// Local artifact locations produced for one analyzed video.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub frames: PathBuf,
}

/// Everything a completed analysis run reports back.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub video_row_id: i64,
    pub creator_id: i64,
    pub creator_username: String,
    pub transcript: Transcript,
    pub paths: ArtifactPaths,
    pub style_passport: JsonValue,
    pub stats: VideoStats,
}

/// Sequences the pipeline stages over the collaborator wrappers.
pub struct AnalysisPipeline {
    fetcher: Fetcher,
    extractor: MediaExtractor,
    transcriber: Transcriber,
    analyzer: StyleAnalyzer,
    synthesizer: ProfileSynthesizer,
    frame_interval_seconds: u32,
}

impl AnalysisPipeline {
    pub fn new(
        fetcher: Fetcher,
        extractor: MediaExtractor,
        transcriber: Transcriber,
        analyzer: StyleAnalyzer,
        synthesizer: ProfileSynthesizer,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            transcriber,
            analyzer,
            synthesizer,
            frame_interval_seconds: FRAME_INTERVAL_SECONDS,
        }
    }

    pub fn with_frame_interval(mut self, seconds: u32) -> Self {
        self.frame_interval_seconds = seconds;
        self
    }

    /// Run the full pipeline for one video URL.
    ///
    /// `creator_id_override` carries the authenticated caller's creator id
    /// when present; it takes precedence over the detected uploader name.
    pub async fn run(
        &self,
        url: &str,
        creator_id_override: Option<i64>,
    ) -> PipelineResult<AnalysisReport> {
        info!(url = %url, "Step 1/5: Downloading video");
        let fetched = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| PipelineError::from(e).at_stage("download"))?;

        info!(source_id = %fetched.source_id, "Step 2/5: Extracting audio and frames");
        let audio = self
            .extractor
            .extract_audio(&fetched.local_path, &fetched.source_id)
            .await
            .map_err(|e| PipelineError::from(e).at_stage("extraction"))?;
        let frames = self
            .extractor
            .extract_frames(&fetched.local_path, &fetched.source_id, self.frame_interval_seconds)
            .await
            .map_err(|e| PipelineError::from(e).at_stage("extraction"))?;

        info!("Step 3/5: Transcribing");
        let transcript = self
            .transcriber
            .transcribe(&audio)
            .await
            .map_err(|e| PipelineError::from(e).at_stage("transcription"))?;

        info!("Step 4/5: Analyzing style");
        let outcome = self
            .analyzer
            .analyze(
                &transcript.full_text,
                &frames,
                &fetched.stats,
                url,
                creator_id_override,
            )
            .await
            .map_err(|e| e.at_stage("analysis"))?;

        info!("Step 5/5: Updating Master Profile");
        if let Err(e) = self.synthesizer.synthesize(outcome.creator_id).await {
            // Best-effort housekeeping; the analysis itself succeeded.
            warn!(creator_id = outcome.creator_id, "Profile synthesis failed: {}", e);
        }

        info!(video_row_id = outcome.video_row_id, "Analysis flow completed");

        Ok(AnalysisReport {
            video_row_id: outcome.video_row_id,
            creator_id: outcome.creator_id,
            creator_username: outcome.creator_username,
            transcript,
            paths: ArtifactPaths {
                video: fetched.local_path,
                audio,
                frames,
            },
            style_passport: outcome.passport,
            stats: fetched.stats,
        })
    }
}
