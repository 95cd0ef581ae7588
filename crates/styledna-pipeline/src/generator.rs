//! Script generation from a creator's Master Profile.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::SqlitePool;
use tracing::info;

use styledna_ai::{build_script_prompt, generate_json, GenerationBackend, RetryPolicy};
use styledna_db::get_creator_by_username;

use crate::error::{PipelineError, PipelineResult};

/// Generates new video scripts in a creator's established style.
pub struct ScriptGenerator {
    backend: Arc<dyn GenerationBackend>,
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl ScriptGenerator {
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

    /// Generate a script on `topic` in `username`'s style.
    pub async fn generate(&self, username: &str, topic: &str) -> PipelineResult<JsonValue> {
        let creator = get_creator_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("creator '{}'", username)))?;

        if !creator.has_master_profile() {
            return Err(PipelineError::ProfileMissing(username.to_string()));
        }

        info!(creator = %username, topic = %topic, "Generating script");

        let prompt = build_script_prompt(username, topic, &creator.master_profile.0);
        generate_json(self.backend.as_ref(), &prompt, &self.retry).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use styledna_ai::{AiResult, GenerationPrompt};
    use styledna_db::{connect_pool, find_or_create_creator, run_migrations, update_master_profile, PoolConfig};
    use tempfile::TempDir;

    struct FakeBackend;

    #[async_trait]
    impl GenerationBackend for FakeBackend {
        async fn generate(&self, prompt: &GenerationPrompt) -> AiResult<String> {
            assert!(prompt.text.contains("screenwriter"));
            Ok(r#"{"title": "A Script", "script": [], "viral_tips": "cut fast"}"#.to_string())
        }
    }

    async fn test_pool() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let pool = connect_pool(&url, PoolConfig::default()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn test_generate_requires_profile() {
        let (_dir, pool) = test_pool().await;
        find_or_create_creator(&pool, "channel").await.unwrap();

        let generator = ScriptGenerator::new(Arc::new(FakeBackend), pool);
        let err = generator.generate("channel", "topic").await.unwrap_err();
        assert!(matches!(err, PipelineError::ProfileMissing(_)));
    }

    #[tokio::test]
    async fn test_generate_unknown_creator_is_not_found() {
        let (_dir, pool) = test_pool().await;
        let generator = ScriptGenerator::new(Arc::new(FakeBackend), pool);
        let err = generator.generate("nobody", "topic").await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_generate_returns_script_document() {
        let (_dir, pool) = test_pool().await;
        let creator = find_or_create_creator(&pool, "channel").await.unwrap();
        update_master_profile(&pool, creator.id, &serde_json::json!({"tone_of_voice": "calm"}))
            .await
            .unwrap();

        let generator = ScriptGenerator::new(Arc::new(FakeBackend), pool);
        let script = generator.generate("channel", "passive income").await.unwrap();
        assert_eq!(script["title"], "A Script");
    }
}
