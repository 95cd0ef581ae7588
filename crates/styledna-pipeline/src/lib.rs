//! StyleDNA analysis pipeline.
//!
//! Threads a video URL through download, media extraction, transcription,
//! multimodal style analysis, persistence, and best-effort Master Profile
//! re-synthesis.

pub mod analyzer;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod synthesizer;

pub use analyzer::{AnalysisOutcome, StyleAnalyzer};
pub use error::{PipelineError, PipelineResult};
pub use generator::ScriptGenerator;
pub use pipeline::{AnalysisPipeline, AnalysisReport, ArtifactPaths};
pub use synthesizer::{ProfileSynthesizer, SynthesisOutcome};
