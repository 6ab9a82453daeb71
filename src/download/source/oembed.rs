//! OEmbedStrategy: public embed metadata.
//!
//! The oEmbed endpoint exposes a thumbnail but never a direct video URL, so
//! this strategy can only ever produce a thumbnail-only candidate and never
//! satisfies the chain's win condition on its own. It is kept in the chain to
//! record thumbnail availability (visible in logs and the `miss` counter)
//! between the structured query and the page scrape.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use serde::Deserialize;

use crate::core::config;
use crate::core::types::PostReference;
use crate::download::error::StrategyError;
use crate::download::source::{AssetCandidate, ResolveStrategy};

/// The subset of the oEmbed response we read.
#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    thumbnail_url: Option<String>,
}

pub struct OEmbedStrategy {
    client: Client,
    oembed_url: String,
}

impl OEmbedStrategy {
    pub fn new(client: Client, oembed_url: impl Into<String>) -> Self {
        Self {
            client,
            oembed_url: oembed_url.into(),
        }
    }

    fn request_url(&self, post_url: &str) -> String {
        format!("{}?url={}", self.oembed_url, urlencoding::encode(post_url))
    }
}

#[async_trait]
impl ResolveStrategy for OEmbedStrategy {
    fn name(&self) -> &str {
        "oembed"
    }

    async fn attempt(&self, post: &PostReference) -> Result<Option<AssetCandidate>, StrategyError> {
        let endpoint = self.request_url(post.url());
        log::debug!("OEmbedStrategy: GET {}", endpoint);

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
        let body: OEmbedResponse = serde_json::from_str(&text)?;

        Ok(body.thumbnail_url.filter(|url| !url.is_empty()).map(|thumbnail| AssetCandidate {
            thumbnail: Some(thumbnail),
            ..AssetCandidate::default()
        }))
    }
}
