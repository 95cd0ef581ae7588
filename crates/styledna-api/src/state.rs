//! Application state.

use std::sync::Arc;

use sqlx::SqlitePool;

use styledna_ai::{GeminiBackend, GenerationBackend, GroqBackend};
use styledna_db::{connect_pool, run_migrations, PoolConfig};
use styledna_media::{
    Fetcher, FfmpegTranscoder, MediaExtractor, Transcriber, WhisperCli, YtDlpSource,
};
use styledna_pipeline::{AnalysisPipeline, ProfileSynthesizer, ScriptGenerator, StyleAnalyzer};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pool: SqlitePool,
    pub pipeline: Arc<AnalysisPipeline>,
    pub generator: Arc<ScriptGenerator>,
    pub synthesizer: Arc<ProfileSynthesizer>,
}

impl AppState {
    /// Create new application state, wiring real collaborators.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        tokio::fs::create_dir_all(&config.media_dir).await?;

        let pool = connect_pool(&config.database_url, PoolConfig::from_env()).await?;
        run_migrations(&pool).await?;

        let vision: Arc<dyn GenerationBackend> = Arc::new(GeminiBackend::from_env()?);
        let text: Arc<dyn GenerationBackend> = Arc::new(GroqBackend::from_env()?);

        let fetcher = Fetcher::new(Arc::new(YtDlpSource::new()), config.media_dir.clone());
        let extractor =
            MediaExtractor::new(Arc::new(FfmpegTranscoder::new()), config.media_dir.clone());
        let transcriber = Transcriber::new(Arc::new(WhisperCli::default()));

        let analyzer = StyleAnalyzer::new(Arc::clone(&vision), pool.clone());
        let pipeline_synthesizer = ProfileSynthesizer::new(Arc::clone(&text), pool.clone());

        let pipeline = AnalysisPipeline::new(
            fetcher,
            extractor,
            transcriber,
            analyzer,
            pipeline_synthesizer,
        );

        Ok(Self {
            config,
            pool: pool.clone(),
            pipeline: Arc::new(pipeline),
            generator: Arc::new(ScriptGenerator::new(Arc::clone(&text), pool.clone())),
            synthesizer: Arc::new(ProfileSynthesizer::new(text, pool)),
        })
    }
}
