//! Master Profile synthesis.
//!
//! Aggregates every persisted analysis for a creator into one style
//! document. The profile is replaced wholesale on success and left
//! untouched on any failure; callers that treat synthesis as best-effort
//! housekeeping log the error instead of propagating it.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use styledna_ai::{build_master_profile_prompt, generate_json, AnalysisSummary, GenerationBackend, RetryPolicy};
use styledna_db::{get_creator, list_analyses_for_creator, update_master_profile};

use crate::error::PipelineResult;

/// Result of a synthesis attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// The Master Profile was replaced.
    Updated,
    /// The creator has no analyzed videos yet; nothing to synthesize.
    NoVideos,
}

/// Synthesizes a creator's Master Profile from all their analyses.
pub struct ProfileSynthesizer {
    backend: Arc<dyn GenerationBackend>,
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl ProfileSynthesizer {
    pub fn new(backend: Arc<dyn GenerationBackend>, pool: SqlitePool) -> Self {
        Self {
            backend,
            pool,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Re-synthesize the Master Profile for `creator_id`.
    pub async fn synthesize(&self, creator_id: i64) -> PipelineResult<SynthesisOutcome> {
        let creator = get_creator(&self.pool, creator_id).await?;
        let analyses = list_analyses_for_creator(&self.pool, creator_id).await?;

        if analyses.is_empty() {
            info!(creator = %creator.username, "No analyzed videos yet, skipping synthesis");
            return Ok(SynthesisOutcome::NoVideos);
        }

        info!(
            creator = %creator.username,
            videos = analyses.len(),
            "Synthesizing Master Profile"
        );

        let summaries: Vec<AnalysisSummary> = analyses
            .into_iter()
            .map(|row| AnalysisSummary {
                title: row.title,
                views: row.stats.0["view_count"].as_u64().unwrap_or(0),
                analysis: row.analysis_result.0,
            })
            .collect();

        let prompt = build_master_profile_prompt(&creator.username, &summaries);
        let profile = generate_json(self.backend.as_ref(), &prompt, &self.retry).await?;

        update_master_profile(&self.pool, creator_id, &profile).await?;

        info!(
            creator = %creator.username,
            core_identity = %profile["core_identity"].as_str().unwrap_or(""),
            "Master Profile updated"
        );

        Ok(SynthesisOutcome::Updated)
    }
}
