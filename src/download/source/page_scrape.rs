//! PageScrapeStrategy: raw post HTML with pattern extraction.
//!
//! Last resort, and the most brittle: fetch the public post page and look for
//! the video URL in two tiers.
//!
//! 1. `"video_url":"..."` inside inline JSON.
//! 2. Meta tags: `og:video`, or any `<meta content="...mp4...">`.
//!
//! The thumbnail comes from `"display_url"` or `"thumbnail_src"`. Scraped URLs
//! are JSON-escaped, so `\u0026` and `\/` are unescaped before use. Pages
//! without any match are an ordinary miss.

use async_trait::async_trait;
use lazy_regex::{lazy_regex, Lazy, Regex};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::Client;
use url::Url;

use crate::core::config;
use crate::core::types::{PostReference, QUALITY_HD};
use crate::download::error::StrategyError;
use crate::download::source::{AssetCandidate, ResolveStrategy};

static VIDEO_URL_JSON: Lazy<Regex> = lazy_regex!(r#""video_url":"([^"]+)""#);
static DISPLAY_URL_JSON: Lazy<Regex> = lazy_regex!(r#""display_url":"([^"]+)""#);
static THUMBNAIL_SRC_JSON: Lazy<Regex> = lazy_regex!(r#""thumbnail_src":"([^"]+)""#);
static OG_VIDEO_META: Lazy<Regex> = lazy_regex!(r#"property="og:video"[^>]*content="([^"]+)""#);
static MP4_META: Lazy<Regex> = lazy_regex!(r#"meta[^>]*content="([^"]+\.mp4[^"]*)""#);

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

pub struct PageScrapeStrategy {
    client: Client,
    /// Replaces scheme/host/port of the post URL when set (staging, tests).
    page_origin: Option<String>,
}

impl PageScrapeStrategy {
    pub fn new(client: Client, page_origin: Option<String>) -> Self {
        Self { client, page_origin }
    }

    /// URL of the post page to fetch.
    fn page_url(&self, post: &PostReference) -> Result<String, StrategyError> {
        let Some(origin) = self.page_origin.as_deref() else {
            return Ok(post.url().to_string());
        };

        let parsed = Url::parse(post.url())?;
        let rebased = Url::parse(origin)?.join(parsed.path())?;
        let mut rebased = rebased;
        rebased.set_query(parsed.query());
        Ok(rebased.to_string())
    }
}

/// Undo the JSON escaping Instagram applies to URLs embedded in the page.
pub(crate) fn unescape_url(raw: &str) -> String {
    raw.replace("\\u0026", "&").replace("\\/", "/")
}

fn first_capture(regex: &Regex, html: &str) -> Option<String> {
    regex
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| unescape_url(m.as_str()))
}

/// Extract a candidate from post page HTML.
pub(crate) fn extract_from_html(html: &str) -> Option<AssetCandidate> {
    let video_url = first_capture(&VIDEO_URL_JSON, html)
        .or_else(|| first_capture(&OG_VIDEO_META, html))
        .or_else(|| first_capture(&MP4_META, html))?;

    let thumbnail = first_capture(&DISPLAY_URL_JSON, html).or_else(|| first_capture(&THUMBNAIL_SRC_JSON, html));

    Some(AssetCandidate {
        video_url: Some(video_url),
        thumbnail,
        quality: Some(QUALITY_HD.to_string()),
        duration: None,
    })
}

#[async_trait]
impl ResolveStrategy for PageScrapeStrategy {
    fn name(&self) -> &str {
        "page_scrape"
    }

    async fn attempt(&self, post: &PostReference) -> Result<Option<AssetCandidate>, StrategyError> {
        let page_url = self.page_url(post)?;
        log::debug!("PageScrapeStrategy: GET {}", page_url);

        let response = self
            .client
            .get(&page_url)
            .header(ACCEPT, HTML_ACCEPT)
            .header(ACCEPT_LANGUAGE, config::network::ACCEPT_LANGUAGE)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StrategyError::Status(response.status()));
        }

        let html = response.text().await?;
        let candidate = extract_from_html(&html);
        if candidate.is_none() {
            log::debug!(
                "PageScrapeStrategy: no video pattern in {} bytes of HTML for {}",
                html.len(),
                post.shortcode()
            );
        }

        Ok(candidate)
    }
}
