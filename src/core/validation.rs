//! Instagram post URL validation and shortcode extraction
//!
//! Both functions are pure and total: no network access, no panics, and safe
//! to run synchronously on arbitrary untrusted strings.
//!
//! Supported shapes: `/p/<id>`, `/reel/<id>`, `/reels/<id>`, `/tv/<id>` on
//! `instagram.com` or `www.instagram.com`. A shortcode is made of ASCII word
//! characters and hyphens.

use lazy_regex::{lazy_regex, Lazy, Regex};

/// Anchored pattern a post URL must match to be accepted.
static POST_URL_REGEX: Lazy<Regex> =
    lazy_regex!(r"^https?://(?:www\.)?instagram\.com/(?:p|reel|reels|tv)/[A-Za-z0-9_-]+");

// Extraction patterns, tried in this order. The host must start a domain label
// so look-alike domains such as `notinstagram.com` never match.
static POST_SHORTCODE_REGEX: Lazy<Regex> = lazy_regex!(r"(?:^|[^A-Za-z0-9-])instagram\.com/p/([A-Za-z0-9_-]+)");
static REEL_SHORTCODE_REGEX: Lazy<Regex> = lazy_regex!(r"(?:^|[^A-Za-z0-9-])instagram\.com/reel/([A-Za-z0-9_-]+)");
static REELS_SHORTCODE_REGEX: Lazy<Regex> =
    lazy_regex!(r"(?:^|[^A-Za-z0-9-])instagram\.com/reels/([A-Za-z0-9_-]+)");
static TV_SHORTCODE_REGEX: Lazy<Regex> = lazy_regex!(r"(?:^|[^A-Za-z0-9-])instagram\.com/tv/([A-Za-z0-9_-]+)");

/// Checks that `raw` is a supported Instagram post, reel, reels or IGTV URL.
///
/// # Examples
/// ```
/// use reelgrab::core::validation::is_valid_post_url;
///
/// assert!(is_valid_post_url("https://www.instagram.com/reel/ABC123/"));
/// assert!(is_valid_post_url("http://instagram.com/p/DEF-456_x"));
///
/// assert!(!is_valid_post_url("https://www.instagram.com/cristiano/"));
/// assert!(!is_valid_post_url("https://www.youtube.com/watch?v=abc"));
/// ```
pub fn is_valid_post_url(raw: &str) -> bool {
    POST_URL_REGEX.is_match(raw)
}

/// Extracts the post shortcode from `raw`.
///
/// Patterns are tried in the fixed order `p`, `reel`, `reels`, `tv`; the first
/// capture wins. Returns `None` if no pattern matches.
///
/// # Examples
/// ```
/// use reelgrab::core::validation::extract_shortcode;
///
/// assert_eq!(extract_shortcode("https://www.instagram.com/tv/JKL012/").as_deref(), Some("JKL012"));
/// assert_eq!(extract_shortcode("https://www.instagram.com/explore/"), None);
/// ```
pub fn extract_shortcode(raw: &str) -> Option<String> {
    let patterns: [&Regex; 4] = [
        &POST_SHORTCODE_REGEX,
        &REEL_SHORTCODE_REGEX,
        &REELS_SHORTCODE_REGEX,
        &TV_SHORTCODE_REGEX,
    ];

    patterns
        .iter()
        .find_map(|pattern| pattern.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
