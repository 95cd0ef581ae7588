//! Generation backends and prompt construction for StyleDNA.
//!
//! Two backends: Gemini (vision + text) for per-video style analysis and
//! Groq (text-only) for profile synthesis and script generation. Both
//! speak JSON-document replies and surface rate-limit-class failures
//! distinctly so the call wrapper can retry exactly once.

pub mod backend;
pub mod error;
pub mod frames;
pub mod gemini;
pub mod groq;
pub mod prompts;

pub use backend::{
    generate_json, parse_json_reply, GenerationBackend, GenerationPrompt, InlineImage, RetryPolicy,
};
pub use error::{is_rate_limit_message, AiError, AiResult};
pub use frames::{list_frames, normalize_frame, select_frames, select_indices, MAX_FRAMES};
pub use gemini::GeminiBackend;
pub use groq::GroqBackend;
pub use prompts::{
    build_master_profile_prompt, build_script_prompt, build_style_passport_prompt,
    truncate_transcript, AnalysisSummary, TRANSCRIPT_CHAR_BUDGET,
};
