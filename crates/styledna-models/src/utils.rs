//! URL parsing utilities.
//!
//! The stable source id extracted here doubles as the download
//! de-duplication and lock key, so extraction must be deterministic for
//! every URL shape pointing at the same video.

/// Errors that can occur during source id extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceIdError {
    #[error("URL is not a supported video URL")]
    UnsupportedUrl,
    #[error("Video id has invalid format")]
    InvalidId,
    #[error("Video id not found in URL")]
    IdNotFound,
}

/// Result type for source id extraction.
pub type SourceIdResult<T> = Result<T, SourceIdError>;

/// Extract the YouTube video id from a URL.
///
/// Supported shapes:
/// - `https://youtube.com/watch?v=VIDEO_ID`
/// - `https://youtu.be/VIDEO_ID`
/// - `https://youtube.com/embed/VIDEO_ID`
/// - `https://youtube.com/shorts/VIDEO_ID`
///
/// Query parameters and fragments after the id are ignored.
pub fn extract_source_id(url: &str) -> SourceIdResult<String> {
    let url = url.trim();

    if !is_youtube_domain(url) {
        return Err(SourceIdError::UnsupportedUrl);
    }

    let candidate = extract_query_v(url)
        .or_else(|| extract_after(url, "youtu.be/"))
        .or_else(|| extract_after(url, "/embed/"))
        .or_else(|| extract_after(url, "/shorts/"));

    match candidate {
        Some(id) => validate_id(id),
        None => Err(SourceIdError::IdNotFound),
    }
}

fn is_youtube_domain(url: &str) -> bool {
    let url = url.to_ascii_lowercase();
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// Extract the id from a `?v=` or `&v=` query parameter.
fn extract_query_v(url: &str) -> Option<String> {
    let pos = url.find("?v=").or_else(|| url.find("&v="))?;
    id_segment(&url[pos + 3..])
}

/// Extract the path segment following `marker`.
fn extract_after(url: &str, marker: &str) -> Option<String> {
    let pos = url.find(marker)?;
    let start = pos + marker.len();
    if start >= url.len() {
        return None;
    }
    id_segment(&url[start..])
}

/// Take characters up to the next delimiter.
fn id_segment(segment: &str) -> Option<String> {
    let end = segment
        .find(|c| ['&', '#', '?', '/'].contains(&c))
        .unwrap_or(segment.len());
    let id = segment[..end].trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// YouTube ids are exactly 11 chars of [A-Za-z0-9_-].
fn validate_id(id: String) -> SourceIdResult<String> {
    if id.len() != 11 {
        return Err(SourceIdError::InvalidId);
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(SourceIdError::InvalidId);
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_source_id_success_cases() {
        assert_eq!(
            extract_source_id("https://youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_source_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLx").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(extract_source_id("https://youtu.be/dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");
        assert_eq!(
            extract_source_id("https://youtu.be/dQw4w9WgXcQ?t=30").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_source_id("https://youtube.com/embed/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_source_id("https://youtube.com/shorts/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_source_id("  https://youtube.com/watch?v=dQw4w9WgXcQ  ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_extract_source_id_error_cases() {
        assert_eq!(
            extract_source_id("https://example.com/watch?v=dQw4w9WgXcQ"),
            Err(SourceIdError::UnsupportedUrl)
        );
        assert_eq!(extract_source_id("https://youtube.com/watch"), Err(SourceIdError::IdNotFound));
        assert_eq!(extract_source_id("https://youtu.be/"), Err(SourceIdError::IdNotFound));
        assert_eq!(
            extract_source_id("https://youtube.com/watch?v=short"),
            Err(SourceIdError::InvalidId)
        );
        assert_eq!(
            extract_source_id("https://youtube.com/watch?v=abc123def!!"),
            Err(SourceIdError::InvalidId)
        );
    }
}
