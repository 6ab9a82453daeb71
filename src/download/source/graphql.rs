//! GraphQlStrategy: structured query endpoint keyed by shortcode.
//!
//! Cheapest and most structured path: one GET to Instagram's persisted
//! GraphQL query with the shortcode as the only variable. The response nests
//! the post under `data.shortcode_media` (older shape) or
//! `data.xdt_shortcode_media` (newer shape).
//!
//! The query hash rotates upstream every few weeks; it is configurable via
//! `INSTAGRAM_QUERY_HASH`.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use serde_json::Value;

use crate::core::config;
use crate::core::types::{PostReference, QUALITY_HD};
use crate::core::utils::{format_duration, log_excerpt};
use crate::download::error::StrategyError;
use crate::download::source::{AssetCandidate, ResolveStrategy};

pub struct GraphQlStrategy {
    client: Client,
    web_origin: String,
    query_hash: String,
}

impl GraphQlStrategy {
    pub fn new(client: Client, web_origin: impl Into<String>, query_hash: impl Into<String>) -> Self {
        Self {
            client,
            web_origin: web_origin.into(),
            query_hash: query_hash.into(),
        }
    }

    /// Full query URL for a shortcode.
    fn query_url(&self, shortcode: &str) -> String {
        let variables = serde_json::json!({ "shortcode": shortcode }).to_string();
        format!(
            "{}/graphql/query/?query_hash={}&variables={}",
            self.web_origin.trim_end_matches('/'),
            urlencoding::encode(&self.query_hash),
            urlencoding::encode(&variables)
        )
    }
}

/// Extract a candidate from a GraphQL response body.
///
/// Returns `None` if the media object or its `video_url` is missing (photo
/// posts, login walls, expired query hash).
pub(crate) fn parse_shortcode_media(body: &Value) -> Option<AssetCandidate> {
    let media = ["/data/shortcode_media", "/data/xdt_shortcode_media"]
        .iter()
        .filter_map(|pointer| body.pointer(pointer))
        .find(|media| media.is_object())?;

    let non_empty_str = |key: &str| {
        media
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let video_url = non_empty_str("video_url")?;
    let thumbnail = non_empty_str("display_url").or_else(|| non_empty_str("thumbnail_src"));
    let duration = media
        .get("video_duration")
        .and_then(Value::as_f64)
        .and_then(format_duration);

    Some(AssetCandidate {
        video_url: Some(video_url),
        thumbnail,
        quality: Some(QUALITY_HD.to_string()),
        duration,
    })
}

#[async_trait]
impl ResolveStrategy for GraphQlStrategy {
    fn name(&self) -> &str {
        "graphql"
    }

    async fn attempt(&self, post: &PostReference) -> Result<Option<AssetCandidate>, StrategyError> {
        let endpoint = self.query_url(post.shortcode());
        log::debug!("GraphQlStrategy: GET {}", endpoint);

        let response = self
            .client
            .get(&endpoint)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, config::network::ACCEPT_LANGUAGE)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StrategyError::Status(response.status()));
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).map_err(|e| {
            log::debug!("GraphQlStrategy: non-JSON response: {}", log_excerpt(&text, 300));
            StrategyError::Json(e)
        })?;

        if let Some(message) = body.get("message").and_then(Value::as_str) {
            log::warn!("GraphQlStrategy: upstream message for {}: {}", post.shortcode(), message);
        }

        Ok(parse_shortcode_media(&body))
    }
}
