//! Speech-to-text transcription.
//!
//! Wraps an external speech engine (Whisper CLI by default) behind the
//! [`SpeechEngine`] contract and normalizes its output into a time-ordered
//! [`Transcript`].

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use styledna_models::{Transcript, TranscriptSegment};

use crate::error::{MediaError, MediaResult};

/// Raw engine output before normalization.
#[derive(Debug, Clone)]
pub struct RawTranscription {
    pub segments: Vec<TranscriptSegment>,
    pub language: String,
    /// Language detection confidence in [0, 1].
    pub language_confidence: f64,
}

/// Speech engine collaborator contract.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> MediaResult<RawTranscription>;
}

/// Whisper CLI implementation of [`SpeechEngine`].
#[derive(Debug, Clone)]
pub struct WhisperCli {
    binary: String,
    model: String,
}

impl Default for WhisperCli {
    fn default() -> Self {
        Self {
            binary: "whisper".to_string(),
            model: "small".to_string(),
        }
    }
}

impl WhisperCli {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

/// Whisper's `--output_format json` document.
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    language: Option<String>,
    language_probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

#[async_trait]
impl SpeechEngine for WhisperCli {
    async fn transcribe(&self, audio: &Path) -> MediaResult<RawTranscription> {
        which::which(&self.binary).map_err(|_| MediaError::WhisperNotFound)?;

        let workdir = tempfile::tempdir()?;

        info!(audio = %audio.display(), model = %self.model, "Starting transcription");

        let output = Command::new(&self.binary)
            .arg(audio)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_format")
            .arg("json")
            .arg("--output_dir")
            .arg(workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::transcription_failed(format!(
                "whisper failed: {}",
                stderr.lines().last().unwrap_or("Unknown error")
            )));
        }

        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let json_path = workdir.path().join(format!("{}.json", stem));

        let raw = tokio::fs::read(&json_path).await.map_err(|_| {
            MediaError::transcription_failed(format!(
                "whisper produced no output at {}",
                json_path.display()
            ))
        })?;
        let parsed: WhisperOutput = serde_json::from_slice(&raw)?;

        debug!(
            segments = parsed.segments.len(),
            language = parsed.language.as_deref().unwrap_or("unknown"),
            "Transcription finished"
        );

        Ok(RawTranscription {
            segments: parsed
                .segments
                .into_iter()
                .map(|s| TranscriptSegment {
                    start: s.start,
                    end: s.end,
                    text: s.text,
                })
                .collect(),
            language: parsed.language.unwrap_or_else(|| "unknown".to_string()),
            language_confidence: parsed.language_probability.unwrap_or(1.0),
        })
    }
}

/// Transcriber over a speech engine collaborator.
pub struct Transcriber {
    engine: Arc<dyn SpeechEngine>,
}

impl Transcriber {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self { engine }
    }

    /// Transcribe an audio file into a time-ordered transcript.
    ///
    /// Fails with a not-found error before invoking the engine if the
    /// audio path does not exist.
    pub async fn transcribe(&self, audio_path: &Path) -> MediaResult<Transcript> {
        if !audio_path.exists() {
            return Err(MediaError::FileNotFound(audio_path.to_path_buf()));
        }

        let raw = self.engine.transcribe(audio_path).await?;

        info!(
            language = %raw.language,
            confidence = raw.language_confidence,
            segments = raw.segments.len(),
            "Transcription completed"
        );

        Ok(Transcript::from_segments(
            raw.segments,
            raw.language,
            raw.language_confidence,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FakeEngine;

    #[async_trait]
    impl SpeechEngine for FakeEngine {
        async fn transcribe(&self, _audio: &Path) -> MediaResult<RawTranscription> {
            Ok(RawTranscription {
                segments: vec![
                    TranscriptSegment {
                        start: 0.0,
                        end: 1.0,
                        text: " A. ".to_string(),
                    },
                    TranscriptSegment {
                        start: 1.0,
                        end: 2.0,
                        text: "B.".to_string(),
                    },
                    TranscriptSegment {
                        start: 2.0,
                        end: 3.0,
                        text: "C.".to_string(),
                    },
                ],
                language: "en".to_string(),
                language_confidence: 0.97,
            })
        }
    }

    #[tokio::test]
    async fn test_full_text_join() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("a.mp3");
        tokio::fs::write(&audio, b"mp3").await.unwrap();

        let transcriber = Transcriber::new(Arc::new(FakeEngine));
        let transcript = transcriber.transcribe(&audio).await.unwrap();

        assert_eq!(transcript.full_text, "A. B. C.");
        assert_eq!(transcript.language, "en");
        assert!((transcript.language_confidence - 0.97).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_audio_is_not_found() {
        let transcriber = Transcriber::new(Arc::new(FakeEngine));
        let err = transcriber
            .transcribe(Path::new("/nonexistent/a.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
