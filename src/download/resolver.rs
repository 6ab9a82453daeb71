//! The resolution pipeline: validate, extract the shortcode, run the chain.

use std::sync::Arc;
use std::time::Instant;

use crate::core::config;
use crate::core::error::AppResult;
use crate::core::metrics::ResolveMetrics;
use crate::core::types::{PostReference, VideoAsset};
use crate::download::error::ResolveError;
use crate::download::http::{build_client, ClientSettings};
use crate::download::source::{GraphQlStrategy, OEmbedStrategy, PageScrapeStrategy, StrategyChain};

/// Where each built-in strategy sends its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstagramEndpoints {
    /// Origin of the structured query endpoint (`/graphql/query/`)
    pub web_origin: String,
    /// Full URL of the oEmbed endpoint
    pub oembed_url: String,
    /// When set, post pages are fetched from this origin instead of the
    /// host in the submitted URL
    pub page_origin: Option<String>,
    pub query_hash: String,
}

impl Default for InstagramEndpoints {
    fn default() -> Self {
        Self {
            web_origin: config::instagram::WEB_ORIGIN.clone(),
            oembed_url: config::instagram::OEMBED_URL.clone(),
            page_origin: None,
            query_hash: config::instagram::QUERY_HASH.clone(),
        }
    }
}

impl InstagramEndpoints {
    /// Point every strategy at a single origin (mock servers, staging).
    pub fn with_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            web_origin: origin.to_string(),
            oembed_url: format!("{}/oembed/", origin),
            page_origin: Some(origin.to_string()),
            query_hash: config::instagram::QUERY_HASH.clone(),
        }
    }
}

/// Resolves post URLs into directly playable videos.
///
/// Strategies run strictly in sequence: structured query, embed metadata,
/// page scrape. The first one producing a video URL wins.
pub struct InstagramResolver {
    chain: StrategyChain,
    metrics: Arc<ResolveMetrics>,
}

impl InstagramResolver {
    /// Builds the resolver with the built-in strategy chain.
    pub fn new(endpoints: InstagramEndpoints, metrics: Arc<ResolveMetrics>) -> AppResult<Self> {
        let client = build_client(&ClientSettings::default())?;

        let chain = StrategyChain::new()
            .with(Arc::new(GraphQlStrategy::new(
                client.clone(),
                endpoints.web_origin,
                endpoints.query_hash,
            )))
            .with(Arc::new(OEmbedStrategy::new(client.clone(), endpoints.oembed_url)))
            .with(Arc::new(PageScrapeStrategy::new(client, endpoints.page_origin)));

        log::info!("InstagramResolver: strategy chain {:?}", chain.names());

        Ok(Self::with_chain(chain, metrics))
    }

    /// Builds a resolver around a custom chain.
    pub fn with_chain(chain: StrategyChain, metrics: Arc<ResolveMetrics>) -> Self {
        Self { chain, metrics }
    }

    pub fn metrics(&self) -> &Arc<ResolveMetrics> {
        &self.metrics
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.chain.names()
    }

    /// Resolve a raw post URL.
    ///
    /// # Errors
    /// - `ResolveError::InvalidUrl` when `raw` is not a supported post URL. No
    ///   network request is made. The URL must carry an `http(s)://` scheme and
    ///   be on `instagram.com` or `www.instagram.com`, so scheme-less input such
    ///   as `instagram.com/p/ABC` and other subdomains such as
    ///   `m.instagram.com` are rejected even though a shortcode could be read
    ///   from them.
    /// - `ResolveError::Unreachable` when every strategy failed.
    pub async fn resolve(&self, raw: &str) -> Result<VideoAsset, ResolveError> {
        let started = Instant::now();

        let post = match PostReference::parse(raw) {
            Ok(post) => post,
            Err(e) => {
                log::info!("Rejected input as invalid post URL: {}", raw.trim());
                self.metrics.record_resolve(e.kind(), started.elapsed());
                return Err(e);
            }
        };

        log::info!("Resolving shortcode={} from {}", post.shortcode(), post.url());

        let result = self.chain.run(&post, &self.metrics).await.ok_or(ResolveError::Unreachable);

        let elapsed = started.elapsed();
        match &result {
            Ok(asset) => {
                log::info!(
                    "Resolved shortcode={} in {:.2}s: {}",
                    post.shortcode(),
                    elapsed.as_secs_f64(),
                    asset.video_url
                );
                self.metrics.record_resolve("success", elapsed);
            }
            Err(e) => {
                log::warn!(
                    "All strategies failed for shortcode={} after {:.2}s",
                    post.shortcode(),
                    elapsed.as_secs_f64()
                );
                self.metrics.record_resolve(e.kind(), elapsed);
            }
        }

        result
    }
}
