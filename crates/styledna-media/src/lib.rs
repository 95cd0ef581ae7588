//! External-tool wrappers for the StyleDNA analysis pipeline.
//!
//! Everything that shells out lives here:
//! - [`download`]: yt-dlp probe + fetch with per-source locking and caching
//! - [`extract`]: FFmpeg audio/frame extraction
//! - [`transcribe`]: Whisper speech-to-text
//! - [`lock`]: process-wide keyed mutual exclusion
//! - [`command`]: FFmpeg command builder/runner
//! - [`probe`]: FFprobe video information

pub mod command;
pub mod download;
pub mod error;
pub mod extract;
pub mod lock;
pub mod probe;
pub mod transcribe;

pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, FfmpegCommand, FfmpegRunner};
pub use download::{Fetcher, VideoSource, YtDlpSource};
pub use error::{MediaError, MediaResult};
pub use extract::{FfmpegTranscoder, MediaExtractor, Transcoder, FRAME_INTERVAL_SECONDS};
pub use lock::ResourceLock;
pub use probe::{probe_video, VideoInfo};
pub use transcribe::{RawTranscription, SpeechEngine, Transcriber, WhisperCli};
