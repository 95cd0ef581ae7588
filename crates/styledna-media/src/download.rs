//! Video download using yt-dlp.
//!
//! The [`Fetcher`] wraps the download collaborator with per-source locking,
//! artifact caching, and detection of partially-downloaded files left by a
//! concurrent or crashed attempt. At most one download per source id is
//! in flight at any time; callers for the same id either reuse the cached
//! artifact or wait for the in-flight download to finish.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use styledna_models::{FetchedVideo, SourceMetadata};

use crate::error::{MediaError, MediaResult};
use crate::lock::ResourceLock;

/// Default budget for waiting on another caller's in-progress download.
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Polling interval while waiting for a partial artifact to resolve.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Download collaborator contract.
///
/// `probe` must not download anything; `download` must leave a partial-file
/// marker (`<dest>.part` / `<dest>.ytdl`) while in progress so concurrent
/// fetchers can detect unfinished work.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Metadata-only probe of the remote resource.
    async fn probe(&self, url: &str) -> MediaResult<SourceMetadata>;

    /// Download the video to `dest`.
    async fn download(&self, url: &str, dest: &Path) -> MediaResult<()>;
}

/// yt-dlp implementation of [`VideoSource`].
#[derive(Debug, Default)]
pub struct YtDlpSource;

impl YtDlpSource {
    pub fn new() -> Self {
        Self
    }
}

/// Subset of yt-dlp's `--dump-single-json` output we care about.
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: String,
    ext: Option<String>,
    title: Option<String>,
    uploader: Option<String>,
    view_count: Option<u64>,
    like_count: Option<u64>,
    comment_count: Option<u64>,
    duration: Option<f64>,
}

impl From<YtDlpInfo> for SourceMetadata {
    fn from(info: YtDlpInfo) -> Self {
        SourceMetadata {
            source_id: info.id,
            ext: info.ext,
            title: info.title,
            uploader: info.uploader,
            view_count: info.view_count,
            like_count: info.like_count,
            comment_count: info.comment_count,
            duration_seconds: info.duration,
        }
    }
}

#[async_trait]
impl VideoSource for YtDlpSource {
    async fn probe(&self, url: &str) -> MediaResult<SourceMetadata> {
        which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

        debug!(url = %url, "Probing source metadata with yt-dlp");

        let output = Command::new("yt-dlp")
            .args(["--dump-single-json", "--no-download", "--no-playlist", url])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::download_failed(format!(
                "yt-dlp probe failed: {}",
                stderr.lines().last().unwrap_or("Unknown error")
            )));
        }

        let info: YtDlpInfo = serde_json::from_slice(&output.stdout)?;
        Ok(info.into())
    }

    async fn download(&self, url: &str, dest: &Path) -> MediaResult<()> {
        which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

        info!(url = %url, dest = %dest.display(), "Downloading video with yt-dlp");

        let dest_str = dest.to_string_lossy();
        let mut args = vec![
            "--no-playlist",
            "--quiet",
            "-f",
            "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
            "-o",
        ];
        args.push(&dest_str);
        args.push(url);

        let output = Command::new("yt-dlp")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(MediaError::download_failed(format!(
                "yt-dlp failed: {}",
                stderr.lines().last().unwrap_or("Unknown error")
            )));
        }

        if !dest.exists() {
            return Err(MediaError::download_failed("Output file not created"));
        }

        let size = dest.metadata()?.len();
        info!(
            dest = %dest.display(),
            size_mb = size as f64 / (1024.0 * 1024.0),
            "Downloaded video successfully"
        );

        Ok(())
    }
}

/// Fetcher with per-source locking and idempotent artifact caching.
pub struct Fetcher {
    source: Arc<dyn VideoSource>,
    locks: Arc<ResourceLock>,
    media_dir: PathBuf,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl Fetcher {
    pub fn new(source: Arc<dyn VideoSource>, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            locks: Arc::new(ResourceLock::new()),
            media_dir: media_dir.into(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the partial-artifact wait parameters.
    pub fn with_wait(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.wait_timeout = timeout;
        self.poll_interval = poll_interval;
        self
    }

    /// Fetch a video, reusing the cached artifact when one exists.
    ///
    /// Exactly one media file per distinct source id is ever written to
    /// the shared artifact directory; files are never deleted here.
    pub async fn fetch(&self, url: &str) -> MediaResult<FetchedVideo> {
        let mut metadata = self.source.probe(url).await?;
        let source_id = metadata.source_id.clone();

        let _guard = self.locks.acquire(&source_id).await;

        let artifact = self.artifact_path(&metadata);

        if has_partial_marker(&artifact) {
            info!(source_id = %source_id, "Partial artifact present, waiting for in-progress download");
            self.wait_for_partial(&artifact).await?;
            if !artifact.exists() {
                return Err(MediaError::integrity(format!(
                    "download for {} completed but artifact is missing",
                    source_id
                )));
            }
        } else if artifact.exists() {
            debug!(source_id = %source_id, path = %artifact.display(), "Reusing cached artifact");
        } else {
            tokio::fs::create_dir_all(&self.media_dir).await?;
            self.source.download(url, &artifact).await?;
            if !artifact.exists() {
                return Err(MediaError::integrity(format!(
                    "download for {} reported success but artifact is missing",
                    source_id
                )));
            }
        }

        // A cached artifact can carry a stale probe from a prior session.
        if !metadata.is_complete() {
            warn!(source_id = %source_id, "Probe metadata incomplete, re-probing");
            metadata = self.source.probe(url).await?;
        }

        Ok(FetchedVideo {
            local_path: artifact,
            source_id,
            stats: metadata.to_stats(),
        })
    }

    fn artifact_path(&self, metadata: &SourceMetadata) -> PathBuf {
        let ext = metadata.ext.as_deref().unwrap_or("mp4");
        self.media_dir.join(format!("{}.{}", metadata.source_id, ext))
    }

    /// Poll until the partial marker disappears or the budget is exhausted.
    async fn wait_for_partial(&self, artifact: &Path) -> MediaResult<()> {
        let deadline = Instant::now() + self.wait_timeout;

        while has_partial_marker(artifact) {
            if Instant::now() >= deadline {
                warn!(path = %artifact.display(), "Timed out waiting for in-progress download");
                return Err(MediaError::WaitTimeout(self.wait_timeout.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Ok(())
    }
}

/// Partial-file marker conventions left by yt-dlp next to the artifact.
fn has_partial_marker(artifact: &Path) -> bool {
    partial_markers(artifact).iter().any(|m| m.exists())
}

fn partial_markers(artifact: &Path) -> [PathBuf; 2] {
    let base = artifact.to_string_lossy();
    [
        PathBuf::from(format!("{}.part", base)),
        PathBuf::from(format!("{}.ytdl", base)),
    ]
}
