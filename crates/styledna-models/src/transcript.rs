//! Transcript models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One time-stamped segment of speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Segment start in seconds.
    pub start: f64,
    /// Segment end in seconds.
    pub end: f64,
    pub text: String,
}

/// Full transcription result for one audio file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Transcript {
    /// Space-joined segment texts, in time order.
    pub full_text: String,
    /// Segments in increasing time order.
    pub segments: Vec<TranscriptSegment>,
    /// Detected language code (e.g. "en").
    pub language: String,
    /// Language detection confidence in [0, 1].
    pub language_confidence: f64,
}

impl Transcript {
    /// Build a transcript from raw engine segments.
    ///
    /// Segments are sorted by start time before joining so `full_text`
    /// reads in time order even if the engine emitted them out of order.
    pub fn from_segments(
        mut segments: Vec<TranscriptSegment>,
        language: impl Into<String>,
        language_confidence: f64,
    ) -> Self {
        segments.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));
        for segment in &mut segments {
            segment.text = segment.text.trim().to_string();
        }

        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            full_text,
            segments,
            language: language.into(),
            language_confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_full_text_is_space_joined_in_time_order() {
        let transcript = Transcript::from_segments(
            vec![segment(0.0, 1.0, "A."), segment(1.0, 2.0, "B."), segment(2.0, 3.0, "C.")],
            "en",
            0.98,
        );
        assert_eq!(transcript.full_text, "A. B. C.");
    }

    #[test]
    fn test_out_of_order_segments_are_sorted() {
        let transcript = Transcript::from_segments(
            vec![segment(2.0, 3.0, "C."), segment(0.0, 1.0, "A."), segment(1.0, 2.0, "B.")],
            "en",
            0.9,
        );
        assert_eq!(transcript.full_text, "A. B. C.");
        assert_eq!(transcript.segments[0].text, "A.");
    }

    #[test]
    fn test_segment_texts_are_trimmed() {
        let transcript =
            Transcript::from_segments(vec![segment(0.0, 1.0, "  hello "), segment(1.0, 2.0, "world")], "en", 1.0);
        assert_eq!(transcript.full_text, "hello world");
    }
}
