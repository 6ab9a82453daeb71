use serde::{Deserialize, Serialize};

use crate::core::validation;
use crate::download::error::ResolveError;

/// Quality label reported for every resolved asset. Not measured.
pub const QUALITY_HD: &str = "HD";

/// A validated Instagram post URL together with its shortcode.
///
/// Only constructible through [`PostReference::parse`], so the shortcode is
/// always non-empty and comes from a supported URL shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReference {
    url: String,
    shortcode: String,
}

impl PostReference {
    /// Validates `raw` and extracts its shortcode.
    ///
    /// # Errors
    /// `ResolveError::InvalidUrl` if `raw` is not a supported post URL.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let raw = raw.trim();
        if !validation::is_valid_post_url(raw) {
            return Err(ResolveError::InvalidUrl(raw.to_string()));
        }

        let shortcode = validation::extract_shortcode(raw).ok_or_else(|| ResolveError::InvalidUrl(raw.to_string()))?;

        Ok(Self {
            url: raw.to_string(),
            shortcode,
        })
    }

    /// The URL as submitted (trimmed).
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn shortcode(&self) -> &str {
        &self.shortcode
    }
}

/// A resolved, directly playable video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    /// Absolute URL of the video file
    pub video_url: String,
    /// Absolute URL of a preview image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Quality label (currently always "HD")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Duration as `minutes:seconds`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}
