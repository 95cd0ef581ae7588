//! Audio and frame extraction from video files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Default sampling interval between extracted frames, in seconds.
pub const FRAME_INTERVAL_SECONDS: u32 = 2;

/// Transcoder collaborator contract.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Derive an audio stream from `video` into `dest`.
    async fn extract_audio(&self, video: &Path, dest: &Path) -> MediaResult<()>;

    /// Sample one still image every `interval_seconds` into `dest_dir`
    /// (sequentially numbered `frame_%04d.jpg`).
    async fn extract_frames(
        &self,
        video: &Path,
        dest_dir: &Path,
        interval_seconds: u32,
    ) -> MediaResult<()>;
}

/// FFmpeg implementation of [`Transcoder`].
#[derive(Debug, Default)]
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn extract_audio(&self, video: &Path, dest: &Path) -> MediaResult<()> {
        let cmd = FfmpegCommand::new(video, dest)
            .no_video()
            .audio_codec("libmp3lame")
            .audio_quality(2);

        FfmpegRunner::new().run(&cmd).await
    }

    async fn extract_frames(
        &self,
        video: &Path,
        dest_dir: &Path,
        interval_seconds: u32,
    ) -> MediaResult<()> {
        // Deterministic 1/interval Hz sampling; frame count follows duration.
        if let Ok(info) = probe_video(video).await {
            debug!(
                duration = info.duration,
                expected_frames = (info.duration / f64::from(interval_seconds.max(1))).ceil(),
                "Sampling frames"
            );
        }

        let pattern = dest_dir.join("frame_%04d.jpg");
        let cmd = FfmpegCommand::new(video, &pattern)
            .video_filter(format!("fps=1/{}", interval_seconds.max(1)))
            .video_quality(2);

        FfmpegRunner::new().run(&cmd).await
    }
}

/// Wraps the transcoder with the shared artifact layout and integrity checks.
pub struct MediaExtractor {
    transcoder: Arc<dyn Transcoder>,
    media_dir: PathBuf,
}

impl MediaExtractor {
    pub fn new(transcoder: Arc<dyn Transcoder>, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            transcoder,
            media_dir: media_dir.into(),
        }
    }

    /// Extract the audio track to `<media_dir>/<id>.mp3`.
    ///
    /// Re-running with the same id overwrites the prior output.
    pub async fn extract_audio(&self, video_path: &Path, id: &str) -> MediaResult<PathBuf> {
        if !video_path.exists() {
            return Err(MediaError::FileNotFound(video_path.to_path_buf()));
        }

        let dest = self.media_dir.join(format!("{}.mp3", id));
        info!(video = %video_path.display(), dest = %dest.display(), "Extracting audio");

        self.transcoder.extract_audio(video_path, &dest).await?;

        if !dest.exists() {
            return Err(MediaError::integrity(format!(
                "audio extraction for {} produced no output",
                id
            )));
        }

        Ok(dest)
    }

    /// Extract frames to `<media_dir>/frames/<id>/`, one image every
    /// `interval_seconds`.
    pub async fn extract_frames(
        &self,
        video_path: &Path,
        id: &str,
        interval_seconds: u32,
    ) -> MediaResult<PathBuf> {
        if !video_path.exists() {
            return Err(MediaError::FileNotFound(video_path.to_path_buf()));
        }

        let dest_dir = self.media_dir.join("frames").join(id);
        tokio::fs::create_dir_all(&dest_dir).await?;

        info!(
            video = %video_path.display(),
            dir = %dest_dir.display(),
            interval = interval_seconds,
            "Extracting frames"
        );

        self.transcoder
            .extract_frames(video_path, &dest_dir, interval_seconds)
            .await?;

        Ok(dest_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FakeTranscoder;

    #[async_trait]
    impl Transcoder for FakeTranscoder {
        async fn extract_audio(&self, _video: &Path, dest: &Path) -> MediaResult<()> {
            tokio::fs::write(dest, b"mp3").await?;
            Ok(())
        }

        async fn extract_frames(
            &self,
            _video: &Path,
            dest_dir: &Path,
            _interval_seconds: u32,
        ) -> MediaResult<()> {
            for i in 1..=3 {
                tokio::fs::write(dest_dir.join(format!("frame_{:04}.jpg", i)), b"jpg").await?;
            }
            Ok(())
        }
    }

    struct FailingTranscoder;

    #[async_trait]
    impl Transcoder for FailingTranscoder {
        async fn extract_audio(&self, _video: &Path, _dest: &Path) -> MediaResult<()> {
            Err(MediaError::extraction_failed(
                "FFmpeg exited with status 1",
                Some("moov atom not found".to_string()),
            ))
        }

        async fn extract_frames(
            &self,
            _video: &Path,
            _dest_dir: &Path,
            _interval_seconds: u32,
        ) -> MediaResult<()> {
            unreachable!()
        }
    }

    async fn setup(transcoder: Arc<dyn Transcoder>) -> (TempDir, MediaExtractor, PathBuf) {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("abc.mp4");
        tokio::fs::write(&video, b"video").await.unwrap();
        let extractor = MediaExtractor::new(transcoder, dir.path().to_path_buf());
        (dir, extractor, video)
    }

    #[tokio::test]
    async fn test_extract_audio_layout_and_idempotence() {
        let (dir, extractor, video) = setup(Arc::new(FakeTranscoder)).await;

        let first = extractor.extract_audio(&video, "abc").await.unwrap();
        let second = extractor.extract_audio(&video, "abc").await.unwrap();

        assert_eq!(first, dir.path().join("abc.mp3"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_extract_frames_layout() {
        let (dir, extractor, video) = setup(Arc::new(FakeTranscoder)).await;

        let frames_dir = extractor.extract_frames(&video, "abc", 2).await.unwrap();
        assert_eq!(frames_dir, dir.path().join("frames").join("abc"));
        assert!(frames_dir.join("frame_0001.jpg").exists());
    }

    #[tokio::test]
    async fn test_missing_video_is_not_found() {
        let dir = TempDir::new().unwrap();
        let extractor = MediaExtractor::new(Arc::new(FakeTranscoder), dir.path().to_path_buf());

        let err = extractor
            .extract_audio(&dir.path().join("missing.mp4"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_transcoder_diagnostics_are_surfaced() {
        let (_dir, extractor, video) = setup(Arc::new(FailingTranscoder)).await;

        let err = extractor.extract_audio(&video, "abc").await.unwrap_err();
        match err {
            MediaError::ExtractionFailed { stderr, .. } => {
                assert!(stderr.unwrap().contains("moov atom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
