//! Per-video style analysis.
//!
//! Builds the multimodal Style Passport request, resolves the owning
//! creator, and persists the analysis row. Any terminal failure leaves no
//! partial row behind: the insert is the last step.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::SqlitePool;
use tracing::{info, warn};

use styledna_ai::{
    build_style_passport_prompt, generate_json, list_frames, normalize_frame, select_frames,
    GenerationBackend, RetryPolicy, MAX_FRAMES,
};
use styledna_db::{find_or_create_creator, get_creator, insert_video_analysis};
use styledna_models::VideoStats;

use crate::error::{PipelineError, PipelineResult};

/// Successful analysis result.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// The per-video Style Passport document.
    pub passport: JsonValue,
    pub video_row_id: i64,
    pub creator_id: i64,
    pub creator_username: String,
}

/// Analyzes one video's style with the vision backend and persists the
/// result.
pub struct StyleAnalyzer {
    backend: Arc<dyn GenerationBackend>,
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl StyleAnalyzer {
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

    /// Analyze a video and persist the resulting Style Passport.
    ///
    /// When `creator_id_override` is present (authenticated caller), that
    /// creator owns the analysis and must exist; otherwise the creator is
    /// resolved by uploader name with a race-safe find-or-create.
    pub async fn analyze(
        &self,
        transcript_text: &str,
        frames_dir: &Path,
        stats: &VideoStats,
        source_url: &str,
        creator_id_override: Option<i64>,
    ) -> PipelineResult<AnalysisOutcome> {
        let frames = list_frames(frames_dir).map_err(|e| {
            PipelineError::not_found(format!("frames directory {}: {}", frames_dir.display(), e))
        })?;
        if frames.is_empty() {
            return Err(PipelineError::not_found(format!(
                "No frames found in {}",
                frames_dir.display()
            )));
        }

        let selected = select_frames(&frames, MAX_FRAMES);
        let mut images = Vec::with_capacity(selected.len());
        for path in &selected {
            match normalize_frame(path) {
                Ok(image) => images.push(image),
                Err(e) => warn!("Skipping frame: {}", e),
            }
        }
        info!(
            available = frames.len(),
            selected = images.len(),
            "Selected frames for analysis"
        );

        let mut prompt = build_style_passport_prompt(transcript_text, stats);
        prompt.images = images;

        let passport = generate_json(self.backend.as_ref(), &prompt, &self.retry).await?;

        // Creator must be committed before the analysis row references it.
        let creator = match creator_id_override {
            Some(id) => get_creator(&self.pool, id).await?,
            None => find_or_create_creator(&self.pool, &stats.uploader).await?,
        };

        let stats_value = serde_json::to_value(stats)
            .map_err(|e| PipelineError::internal(format!("failed to serialize stats: {}", e)))?;

        let video_row_id = insert_video_analysis(
            &self.pool,
            creator.id,
            source_url,
            &stats.title,
            &stats_value,
            &passport,
        )
        .await?;

        info!(
            video_row_id = video_row_id,
            creator = %creator.username,
            "Saved video analysis"
        );

        Ok(AnalysisOutcome {
            passport,
            video_row_id,
            creator_id: creator.id,
            creator_username: creator.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{ImageBuffer, Rgb};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use styledna_ai::{AiError, AiResult, GenerationPrompt};
    use styledna_db::{connect_pool, count_analyses_for_creator, run_migrations, PoolConfig};
    use tempfile::TempDir;

    struct FakeBackend {
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for FakeBackend {
        async fn generate(&self, prompt: &GenerationPrompt) -> AiResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(!prompt.images.is_empty(), "analysis prompt should carry frames");
            Ok(r#"{"hook_analysis": "strong open", "virality_score": 8}"#.to_string())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl GenerationBackend for FailingBackend {
        async fn generate(&self, _prompt: &GenerationPrompt) -> AiResult<String> {
            Err(AiError::backend("model unavailable"))
        }
    }

    async fn test_pool() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let pool = connect_pool(&url, PoolConfig::default()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (dir, pool)
    }

    fn write_frames(dir: &Path, count: usize) {
        std::fs::create_dir_all(dir).unwrap();
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(16, 16, Rgb([7, 7, 7]));
        for i in 1..=count {
            img.save(dir.join(format!("frame_{:04}.jpg", i))).unwrap();
        }
    }

    fn stats() -> VideoStats {
        VideoStats {
            title: "Test Video".into(),
            uploader: "new-channel".into(),
            view_count: 1234,
            like_count: 56,
            comment_count: 7,
            duration_seconds: 30.0,
        }
    }

    #[tokio::test]
    async fn test_analyze_persists_row_and_creator() {
        let (dir, pool) = test_pool().await;
        let frames_dir = dir.path().join("frames");
        write_frames(&frames_dir, 10);

        let analyzer = StyleAnalyzer::new(Arc::new(FakeBackend::new()), pool.clone());
        let outcome = analyzer
            .analyze("a transcript", &frames_dir, &stats(), "https://youtu.be/abc123def45", None)
            .await
            .unwrap();

        assert_eq!(outcome.creator_username, "new-channel");
        assert_eq!(outcome.passport["virality_score"], 8);

        let row = styledna_db::get_video_analysis(&pool, outcome.video_row_id)
            .await
            .unwrap();
        assert_eq!(row.creator_id, outcome.creator_id);
        assert_eq!(row.title, "Test Video");
        assert_eq!(row.stats.0["view_count"], 1234);
    }

    #[tokio::test]
    async fn test_concurrent_analyses_share_one_creator() {
        let (dir, pool) = test_pool().await;
        let frames_dir = dir.path().join("frames");
        write_frames(&frames_dir, 4);

        let analyzer = Arc::new(StyleAnalyzer::new(Arc::new(FakeBackend::new()), pool.clone()));
        let a2 = Arc::clone(&analyzer);
        let f2 = frames_dir.clone();

        let s1 = stats();
        let s2 = stats();
        let (a, b) = tokio::join!(
            analyzer.analyze("t1", &frames_dir, &s1, "https://youtu.be/aaaaaaaaaaa", None),
            a2.analyze("t2", &f2, &s2, "https://youtu.be/bbbbbbbbbbb", None),
        );
        let a = a.unwrap();
        let b = b.unwrap();

        assert_eq!(a.creator_id, b.creator_id);
        assert_ne!(a.video_row_id, b.video_row_id);
        assert_eq!(count_analyses_for_creator(&pool, a.creator_id).await.unwrap(), 2);

        let creators: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM creators")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(creators, 1);
    }

    #[tokio::test]
    async fn test_empty_frames_dir_is_not_found() {
        let (dir, pool) = test_pool().await;
        let frames_dir = dir.path().join("frames");
        std::fs::create_dir_all(&frames_dir).unwrap();

        let analyzer = StyleAnalyzer::new(Arc::new(FakeBackend::new()), pool);
        let err = analyzer
            .analyze("t", &frames_dir, &stats(), "https://youtu.be/abc123def45", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_terminal_backend_failure_persists_nothing() {
        let (dir, pool) = test_pool().await;
        let frames_dir = dir.path().join("frames");
        write_frames(&frames_dir, 3);

        let analyzer = StyleAnalyzer::new(Arc::new(FailingBackend), pool.clone());
        let err = analyzer
            .analyze("t", &frames_dir, &stats(), "https://youtu.be/abc123def45", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Ai(_)));

        let creators: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM creators")
            .fetch_one(&pool)
            .await
            .unwrap();
        let analyses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM video_analyses")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(creators, 0);
        assert_eq!(analyses, 0);
    }

    #[tokio::test]
    async fn test_override_creator_must_exist() {
        let (dir, pool) = test_pool().await;
        let frames_dir = dir.path().join("frames");
        write_frames(&frames_dir, 3);

        let analyzer = StyleAnalyzer::new(Arc::new(FakeBackend::new()), pool);
        let err = analyzer
            .analyze("t", &frames_dir, &stats(), "https://youtu.be/abc123def45", Some(999))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Db(styledna_db::DbError::NotFound)));
    }

    #[tokio::test]
    async fn test_override_creator_wins_over_uploader() {
        let (dir, pool) = test_pool().await;
        let frames_dir = dir.path().join("frames");
        write_frames(&frames_dir, 3);

        let me = styledna_db::insert_creator(&pool, "authed-user", None, None)
            .await
            .unwrap();

        let analyzer = StyleAnalyzer::new(Arc::new(FakeBackend::new()), pool.clone());
        let outcome = analyzer
            .analyze("t", &frames_dir, &stats(), "https://youtu.be/abc123def45", Some(me.id))
            .await
            .unwrap();

        assert_eq!(outcome.creator_username, "authed-user");
        // No creator row was made for the uploader name.
        assert!(styledna_db::get_creator_by_username(&pool, "new-channel")
            .await
            .unwrap()
            .is_none());
    }
}
