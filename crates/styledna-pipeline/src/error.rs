//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A pipeline stage failed; carries the stage name and the failing
    /// collaborator's message verbatim.
    #[error("{stage} failed: {message}")]
    Stage {
        stage: &'static str,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Script generation requested for a creator with no synthesized
    /// profile yet.
    #[error("No Master Profile found for creator '{0}'. Analyze at least one video first.")]
    ProfileMissing(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Media(#[from] styledna_media::MediaError),

    #[error(transparent)]
    Db(#[from] styledna_db::DbError),

    #[error(transparent)]
    Ai(#[from] styledna_ai::AiError),
}

impl PipelineError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Tag an error with the pipeline stage it occurred in.
    pub fn at_stage(self, stage: &'static str) -> Self {
        match self {
            already @ PipelineError::Stage { .. } => already,
            other => PipelineError::Stage {
                stage,
                message: other.to_string(),
            },
        }
    }
}
