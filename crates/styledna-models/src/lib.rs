//! Shared data models for the StyleDNA backend.
//!
//! This crate provides Serde-serializable types for:
//! - Remote source metadata and fetch results
//! - Engagement statistics snapshots
//! - Transcripts and time-stamped segments
//! - Style documents (per-video Style Passport, per-creator Master Profile)

pub mod source;
pub mod stats;
pub mod transcript;
pub mod utils;

// Re-export common types
pub use source::{FetchedVideo, SourceMetadata};
pub use stats::{VideoStats, VIRAL_VIEW_THRESHOLD};
pub use transcript::{Transcript, TranscriptSegment};
pub use utils::{extract_source_id, SourceIdError, SourceIdResult};
