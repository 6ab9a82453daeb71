//! Resolution strategies and the ordered chain that runs them.
//!
//! Provides the `ResolveStrategy` trait for pluggable ways of turning a post
//! reference into a video candidate, and a `StrategyChain` that tries them in
//! priority order. New strategies are added by implementing `ResolveStrategy`
//! and registering them in the chain.
//!
//! Built-in strategies, cheapest and most structured first:
//! - `GraphQlStrategy`: structured query endpoint keyed by shortcode
//! - `OEmbedStrategy`: public embed metadata (thumbnail only)
//! - `PageScrapeStrategy`: raw post HTML with pattern extraction

pub mod graphql;
pub mod oembed;
pub mod page_scrape;

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::metrics::{ResolveMetrics, StrategyOutcome};
use crate::core::types::{PostReference, VideoAsset};
use crate::download::error::StrategyError;

pub use graphql::GraphQlStrategy;
pub use oembed::OEmbedStrategy;
pub use page_scrape::PageScrapeStrategy;

/// Possibly partial result produced by a single strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetCandidate {
    pub video_url: Option<String>,
    pub thumbnail: Option<String>,
    pub quality: Option<String>,
    pub duration: Option<String>,
}

impl AssetCandidate {
    /// Whether this candidate satisfies the win condition: a video URL that is
    /// not blank (whitespace-only counts as blank).
    pub fn is_playable(&self) -> bool {
        self.video_url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }

    /// Converts a playable candidate into an asset, field for field.
    ///
    /// Returns `None` if there is no usable video URL.
    pub fn into_asset(self) -> Option<VideoAsset> {
        if !self.is_playable() {
            return None;
        }
        Some(VideoAsset {
            video_url: self.video_url?,
            thumbnail: self.thumbnail,
            quality: self.quality,
            duration: self.duration,
        })
    }
}

/// One self-contained way of resolving a post into a video candidate.
///
/// Implementations must not retry and must not swallow transport errors
/// silently: return `Err` and let the chain log and fall through.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// Short stable name used in logs and metric labels (e.g., "graphql")
    fn name(&self) -> &str;

    /// Try to resolve `post`.
    ///
    /// `Ok(None)` means the upstream answered but had nothing usable.
    async fn attempt(&self, post: &PostReference) -> Result<Option<AssetCandidate>, StrategyError>;
}

/// Ordered list of strategies tried strictly in sequence.
///
/// The first strategy returning a playable candidate wins. Candidates without
/// a video URL are discarded; their thumbnails are never merged into a later
/// winner.
pub struct StrategyChain {
    strategies: Vec<Arc<dyn ResolveStrategy>>,
}

impl StrategyChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self { strategies: Vec::new() }
    }

    /// Register a strategy. Strategies are tried in insertion order.
    pub fn register(&mut self, strategy: Arc<dyn ResolveStrategy>) {
        self.strategies.push(strategy);
    }

    /// Builder-style variant of [`StrategyChain::register`].
    pub fn with(mut self, strategy: Arc<dyn ResolveStrategy>) -> Self {
        self.register(strategy);
        self
    }

    /// Strategy names in trial order.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies in order until one produces a playable candidate.
    ///
    /// Every per-strategy failure is recovered here.
    pub async fn run(&self, post: &PostReference, metrics: &ResolveMetrics) -> Option<VideoAsset> {
        for strategy in &self.strategies {
            let name = strategy.name();
            match strategy.attempt(post).await {
                Ok(Some(candidate)) if candidate.is_playable() => {
                    log::info!("StrategyChain: {} resolved shortcode={}", name, post.shortcode());
                    metrics.record_strategy(name, StrategyOutcome::Hit);
                    return candidate.into_asset();
                }
                Ok(Some(candidate)) => {
                    if let Some(ref thumbnail) = candidate.thumbnail {
                        log::debug!(
                            "StrategyChain: {} returned a thumbnail only for shortcode={} ({}), trying next",
                            name,
                            post.shortcode(),
                            thumbnail
                        );
                    } else {
                        log::debug!("StrategyChain: {} returned an empty candidate, trying next", name);
                    }
                    metrics.record_strategy(name, StrategyOutcome::Miss);
                }
                Ok(None) => {
                    log::debug!("StrategyChain: {} found nothing for shortcode={}", name, post.shortcode());
                    metrics.record_strategy(name, StrategyOutcome::Miss);
                }
                Err(e) => {
                    log::warn!("StrategyChain: {} failed for shortcode={}: {}", name, post.shortcode(), e);
                    metrics.record_strategy(name, StrategyOutcome::Error);
                }
            }
        }

        None
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// What a scripted strategy answers with.
    pub enum Script {
        Candidate(AssetCandidate),
        Nothing,
        Fail,
    }

    /// Strategy with a canned answer and a call counter.
    pub struct ScriptedStrategy {
        name: &'static str,
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedStrategy {
        pub fn new(name: &'static str, script: Script) -> Arc<Self> {
            Arc::new(Self {
                name,
                script,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResolveStrategy for ScriptedStrategy {
        fn name(&self) -> &str {
            self.name
        }

        async fn attempt(&self, _post: &PostReference) -> Result<Option<AssetCandidate>, StrategyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Candidate(candidate) => Ok(Some(candidate.clone())),
                Script::Nothing => Ok(None),
                Script::Fail => Err(StrategyError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)),
            }
        }
    }

    pub fn video(url: &str) -> AssetCandidate {
        AssetCandidate {
            video_url: Some(url.to_string()),
            thumbnail: Some("https://cdn/thumb.jpg".to_string()),
            quality: Some("HD".to_string()),
            duration: Some("0:42".to_string()),
        }
    }

    pub fn thumbnail_only(url: &str) -> AssetCandidate {
        AssetCandidate {
            thumbnail: Some(url.to_string()),
            ..AssetCandidate::default()
        }
    }
}
