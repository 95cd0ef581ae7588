//! End-to-end pipeline flow over fake collaborators and a real SQLite store.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use image::{ImageBuffer, Rgb};
use sqlx::SqlitePool;
use tempfile::TempDir;

use styledna_ai::{AiError, AiResult, GenerationBackend, GenerationPrompt};
use styledna_db::{connect_pool, get_creator, run_migrations, PoolConfig};
use styledna_media::{
    Fetcher, MediaExtractor, MediaResult, RawTranscription, SpeechEngine, Transcoder, Transcriber,
    VideoSource,
};
use styledna_models::{SourceMetadata, TranscriptSegment};
use styledna_pipeline::{AnalysisPipeline, ProfileSynthesizer, StyleAnalyzer};

struct FakeSource {
    fail: bool,
}

#[async_trait]
impl VideoSource for FakeSource {
    async fn probe(&self, _url: &str) -> MediaResult<SourceMetadata> {
        if self.fail {
            return Err(styledna_media::MediaError::download_failed("host unreachable"));
        }
        Ok(SourceMetadata {
            source_id: "abc123def45".to_string(),
            ext: Some("mp4".to_string()),
            title: Some("Pipeline Test".to_string()),
            uploader: Some("pipeline-channel".to_string()),
            view_count: Some(150_000),
            like_count: Some(900),
            comment_count: Some(44),
            duration_seconds: Some(20.0),
        })
    }

    async fn download(&self, _url: &str, dest: &Path) -> MediaResult<()> {
        tokio::fs::write(dest, b"video-bytes").await?;
        Ok(())
    }
}

struct FakeTranscoder;

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn extract_audio(&self, _video: &Path, dest: &Path) -> MediaResult<()> {
        tokio::fs::write(dest, b"mp3-bytes").await?;
        Ok(())
    }

    async fn extract_frames(
        &self,
        _video: &Path,
        dest_dir: &Path,
        _interval_seconds: u32,
    ) -> MediaResult<()> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(32, 32, Rgb([9, 9, 9]));
        for i in 1..=10 {
            img.save(dest_dir.join(format!("frame_{:04}.jpg", i)))
                .map_err(|e| styledna_media::MediaError::extraction_failed(e.to_string(), None))?;
        }
        Ok(())
    }
}

struct FakeEngine {
    fail: bool,
}

#[async_trait]
impl SpeechEngine for FakeEngine {
    async fn transcribe(&self, _audio: &Path) -> MediaResult<RawTranscription> {
        if self.fail {
            return Err(styledna_media::MediaError::transcription_failed("decoder crashed"));
        }
        Ok(RawTranscription {
            segments: vec![
                TranscriptSegment { start: 0.0, end: 1.0, text: "A.".into() },
                TranscriptSegment { start: 1.0, end: 2.0, text: "B.".into() },
                TranscriptSegment { start: 2.0, end: 3.0, text: "C.".into() },
            ],
            language: "en".to_string(),
            language_confidence: 0.99,
        })
    }
}

/// Routes analysis prompts to a passport and synthesis prompts to a
/// profile document, optionally failing the latter.
struct RouterBackend {
    fail_synthesis: bool,
}

#[async_trait]
impl GenerationBackend for RouterBackend {
    async fn generate(&self, prompt: &GenerationPrompt) -> AiResult<String> {
        if prompt.text.contains("Master Style DNA") {
            if self.fail_synthesis {
                return Err(AiError::backend("synthesis model down"));
            }
            return Ok(r#"{"core_identity": "fast-cut tech explainer"}"#.to_string());
        }
        Ok(r#"{"hook_analysis": "cold open", "virality_score": 9}"#.to_string())
    }
}

async fn test_pool(dir: &TempDir) -> SqlitePool {
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = connect_pool(&url, PoolConfig::default()).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

fn build_pipeline(
    dir: &TempDir,
    pool: SqlitePool,
    source_fails: bool,
    engine_fails: bool,
    synthesis_fails: bool,
) -> AnalysisPipeline {
    let media_dir = dir.path().join("media");
    let backend: Arc<dyn GenerationBackend> = Arc::new(RouterBackend {
        fail_synthesis: synthesis_fails,
    });

    AnalysisPipeline::new(
        Fetcher::new(Arc::new(FakeSource { fail: source_fails }), media_dir.clone()),
        MediaExtractor::new(Arc::new(FakeTranscoder), media_dir),
        Transcriber::new(Arc::new(FakeEngine { fail: engine_fails })),
        StyleAnalyzer::new(Arc::clone(&backend), pool.clone()),
        ProfileSynthesizer::new(backend, pool),
    )
}

#[tokio::test]
async fn test_full_run_persists_analysis_and_profile() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir).await;
    let pipeline = build_pipeline(&dir, pool.clone(), false, false, false);

    let report = pipeline
        .run("https://youtu.be/abc123def45", None)
        .await
        .unwrap();

    assert_eq!(report.creator_username, "pipeline-channel");
    assert_eq!(report.transcript.full_text, "A. B. C.");
    assert_eq!(report.style_passport["virality_score"], 9);
    assert_eq!(report.stats.view_count, 150_000);
    assert!(report.paths.video.exists());
    assert!(report.paths.audio.exists());
    assert!(report.paths.frames.join("frame_0001.jpg").exists());

    let row = styledna_db::get_video_analysis(&pool, report.video_row_id)
        .await
        .unwrap();
    assert_eq!(row.creator_id, report.creator_id);

    let creator = get_creator(&pool, report.creator_id).await.unwrap();
    assert_eq!(creator.master_profile.0["core_identity"], "fast-cut tech explainer");
}

#[tokio::test]
async fn test_synthesis_failure_never_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir).await;
    let pipeline = build_pipeline(&dir, pool.clone(), false, false, true);

    let report = pipeline
        .run("https://youtu.be/abc123def45", None)
        .await
        .unwrap();

    // Analysis persisted, profile still empty.
    let creator = get_creator(&pool, report.creator_id).await.unwrap();
    assert!(!creator.has_master_profile());
    assert_eq!(
        styledna_db::count_analyses_for_creator(&pool, report.creator_id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_download_failure_short_circuits() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir).await;
    let pipeline = build_pipeline(&dir, pool.clone(), true, false, false);

    let err = pipeline
        .run("https://youtu.be/abc123def45", None)
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("download failed:"), "got: {msg}");
    assert!(msg.contains("host unreachable"));

    let creators: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM creators")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(creators, 0);
}

#[tokio::test]
async fn test_transcription_failure_reports_its_stage() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir).await;
    let pipeline = build_pipeline(&dir, pool.clone(), false, true, false);

    let err = pipeline
        .run("https://youtu.be/abc123def45", None)
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("transcription failed:"), "got: {msg}");
    assert!(msg.contains("decoder crashed"));
}
