//! Prompt construction for the three generation calls.
//!
//! The JSON shapes spelled out here are contracts with the generation
//! backends; handlers and persistence treat the documents as opaque.

use serde::Serialize;
use serde_json::Value as JsonValue;

use styledna_models::{VideoStats, VIRAL_VIEW_THRESHOLD};

use crate::backend::GenerationPrompt;

/// Character budget for transcript text embedded in prompts.
pub const TRANSCRIPT_CHAR_BUDGET: usize = 12_000;

/// Marker appended when a transcript is cut at the budget.
pub const TRUNCATION_MARKER: &str = " …[truncated]";

/// Truncate a transcript to `budget` characters, appending the marker.
pub fn truncate_transcript(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(budget).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Per-video summary handed to the Master Profile synthesis call.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub title: String,
    pub views: u64,
    pub analysis: JsonValue,
}

/// Build the Style Passport analysis prompt (frames are attached by the
/// caller).
pub fn build_style_passport_prompt(transcript: &str, stats: &VideoStats) -> GenerationPrompt {
    let stats_context = format!(
        r#"VIDEO STATISTICS:
- Views: {views}
- Likes: {likes}
- Comments: {comments}
- Author: {author}

IMPORTANT: These statistics indicate the video's actual performance.
If views > {threshold}, explicitly look for and analyze the specific 'viral triggers' that caused this success."#,
        views = stats.view_count,
        likes = stats.like_count,
        comments = stats.comment_count,
        author = stats.uploader,
        threshold = VIRAL_VIEW_THRESHOLD,
    );

    let system = format!(
        r#"You are a professional video editor and viral content marketer.
Analyze the provided video frames and audio transcription to create a "Style Passport".

{stats_context}

Output MUST be valid JSON with this exact structure:
{{
    "hook_analysis": "String. Analyze the first 5 seconds. Why does it grab attention? (Visuals/Audio)",
    "pacing_wpm": "Number. Estimated words per minute or perceived speed (1-10 scale where 10 is super fast).",
    "visual_style": "String. Describe color grading, camera angles, dynamic/static shots.",
    "audio_tone": "String. Describe the speaker's tone (energetic, calm, sarcastic, etc).",
    "structure": [
        {{"time": "String (e.g. 00:00-00:05)", "block": "Hook/Body/CTA", "description": "String"}}
    ],
    "virality_score": "Number (1-10). How likely is this to go viral on Shorts/Reels?",
    "key_elements": ["String", "String"],
    "stats_analysis": "String. Brief comment on how the style correlates with the view count."
}}"#
    );

    let transcript = truncate_transcript(transcript, TRANSCRIPT_CHAR_BUDGET);

    GenerationPrompt {
        system: Some(system),
        text: format!("TRANSCRIPT:\n{transcript}\n\nVISUALS (Attached Frames):"),
        images: Vec::new(),
    }
}

/// Build the Master Profile synthesis prompt from all of a creator's
/// analyzed videos.
pub fn build_master_profile_prompt(username: &str, summaries: &[AnalysisSummary]) -> GenerationPrompt {
    let history = serde_json::to_string_pretty(summaries).unwrap_or_else(|_| "[]".to_string());

    let text = format!(
        r#"You are an expert AI analyst specializing in the creator economy.
Your task is to synthesize a "Master Style DNA" profile for a creator based on the analysis of their videos.

Creator: {username}
Analyzed Videos: {history}

Analyze patterns across these videos. What is consistent? What makes their most viewed videos successful?

Output MUST be valid JSON with this exact structure:
{{
    "core_identity": "String. One sentence describing the essence of this creator.",
    "winning_formula": ["String", "String"],
    "tone_of_voice": "String. The consistent audio/verbal style.",
    "visual_signature": "String. The consistent visual elements (colors, editing speed).",
    "avg_pacing_wpm": "Number",
    "best_hooks": ["String", "String"],
    "weaknesses": "String. What to improve, based on the less successful videos (if any)."
}}"#
    );

    GenerationPrompt::text_only(
        "You are an expert AI analyst. You always answer with a single JSON object.",
        text,
    )
}

/// Build the script-generation prompt from a creator's Master Profile.
pub fn build_script_prompt(username: &str, topic: &str, master_profile: &JsonValue) -> GenerationPrompt {
    let profile = serde_json::to_string_pretty(master_profile).unwrap_or_else(|_| "{}".to_string());

    let text = format!(
        r#"You are a top-tier Reels/Shorts screenwriter acting as the creator '{username}'.
Your task is to write a VIRAL script on the topic: '{topic}'.

You MUST strictly follow your own style DNA described in your Master Profile:
{profile}

INSTRUCTIONS:
1. Tone & Pacing: Match your 'tone_of_voice' and 'avg_pacing_wpm'.
2. Signature: Incorporate elements from 'winning_formula' and 'visual_signature'.
3. Hook: Use a hook structure similar to your 'best_hooks'.

Output MUST be valid JSON with this exact structure:
{{
  "title": "String. A catchy video title.",
  "script": [
    {{"time": "00:00-00:03", "visual": "String. Shot description.", "audio": "String. Voiceover or dialogue."}}
  ],
  "viral_tips": "String. Concrete filming/editing advice so the result matches the Master Profile."
}}"#
    );

    GenerationPrompt::text_only(
        "You are an expert screenwriter. You always answer with a single JSON object.",
        text,
    )
}
