//! Input validation for analysis requests.
//!
//! Video URLs are checked against a platform whitelist and blocked
//! internal-endpoint patterns before anything is handed to the downloader.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::Url;

/// Maximum URL length.
const MAX_URL_LENGTH: usize = 2048;

/// Allowed video URL domains (whitelist for SSRF protection).
static ALLOWED_DOMAINS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "youtube.com",
        "www.youtube.com",
        "m.youtube.com",
        "youtu.be",
    ])
});

/// Blocked URL patterns (internal IPs, metadata endpoints).
static BLOCKED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"^https?://127\.").unwrap(),
        Regex::new(r"^https?://localhost").unwrap(),
        Regex::new(r"^https?://10\.").unwrap(),
        Regex::new(r"^https?://172\.(1[6-9]|2[0-9]|3[0-1])\.").unwrap(),
        Regex::new(r"^https?://192\.168\.").unwrap(),
        Regex::new(r"^https?://169\.254\.").unwrap(),
        Regex::new(r"^https?://\[::1\]").unwrap(),
        Regex::new(r"^https?://metadata\.").unwrap(),
    ]
});

/// Validate a video URL: length, protocol, blocked patterns, whitelist.
///
/// Returns the trimmed URL on success, a human-readable reason on failure.
pub fn validate_video_url(url: &str) -> Result<String, String> {
    if url.len() > MAX_URL_LENGTH {
        return Err(format!("URL exceeds maximum length of {} characters", MAX_URL_LENGTH));
    }

    let url = url.trim();
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    let parsed = Url::parse(url).map_err(|e| format!("Invalid URL format: {}", e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!(
                "Invalid protocol '{}'. Only HTTP and HTTPS are allowed.",
                scheme
            ))
        }
    }

    for pattern in BLOCKED_PATTERNS.iter() {
        if pattern.is_match(url) {
            warn!(url = %url, "Blocked URL pattern detected");
            return Err("URL appears to target an internal or restricted endpoint".to_string());
        }
    }

    let domain = parsed
        .host_str()
        .ok_or_else(|| "URL must have a valid domain".to_string())?
        .to_lowercase();

    if !ALLOWED_DOMAINS.contains(domain.as_str()) {
        return Err(format!(
            "Domain '{}' is not allowed. Please use a supported video platform.",
            domain
        ));
    }

    Ok(url.to_string())
}
