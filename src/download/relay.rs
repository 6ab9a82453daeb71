//! Download relay: streams a CDN video back to the caller.
//!
//! Browsers cannot download Instagram CDN URLs directly (CORS, missing
//! attachment disposition), so the service fetches the file itself and
//! forwards the body unbuffered. Only hosts on the allow-list are fetched,
//! and redirects are only followed to hosts on the same allow-list.

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use url::Url;

use crate::core::config;
use crate::core::error::AppResult;
use crate::download::error::RelayError;
use crate::download::http::{build_client_with_redirects, ClientSettings, MAX_REDIRECTS};

const VIDEO_ACCEPT: &str = "video/mp4,video/*;q=0.9,*/*;q=0.8";
const INSTAGRAM_REFERER: &str = "https://www.instagram.com/";

/// Which hosts the relay may fetch from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyPolicy {
    allowed_host_suffixes: Vec<String>,
}

impl Default for ProxyPolicy {
    fn default() -> Self {
        Self::new(config::instagram::CDN_HOST_SUFFIXES.iter().copied())
    }
}

impl ProxyPolicy {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_host_suffixes: suffixes
                .into_iter()
                .map(|s| s.into().trim_start_matches('.').to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Whether `raw` is an http(s) URL on an allowed host.
    ///
    /// A host matches a suffix when it equals it or is a subdomain of it, so
    /// `scontent.cdninstagram.com` matches `cdninstagram.com` but
    /// `evilcdninstagram.com` does not.
    pub fn allows(&self, raw: &str) -> bool {
        let Ok(url) = Url::parse(raw.trim()) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        self.allowed_host_suffixes
            .iter()
            .any(|suffix| host == *suffix || host.ends_with(&format!(".{}", suffix)))
    }
}

/// Fetches allowed CDN URLs with browser-like headers.
pub struct VideoRelay {
    client: Client,
    policy: ProxyPolicy,
}

impl VideoRelay {
    pub fn new(policy: ProxyPolicy) -> AppResult<Self> {
        let client = build_client_with_redirects(&ClientSettings::default(), redirect_policy(policy.clone()))?;
        Ok(Self::with_client(client, policy))
    }

    pub fn with_client(client: Client, policy: ProxyPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &ProxyPolicy {
        &self.policy
    }

    /// Start fetching `url`. The body is left unread for streaming.
    ///
    /// # Errors
    /// - `RelayError::ForbiddenHost` if the host is not allowed (nothing is
    ///   sent), or the CDN redirects to a host that is not allowed
    /// - `RelayError::Upstream` if the CDN answered with a non-success status
    /// - `RelayError::Http` on transport failure
    pub async fn fetch(&self, url: &str) -> Result<Response, RelayError> {
        let url = url.trim();
        if !self.policy.allows(url) {
            log::warn!("VideoRelay: refusing to fetch non-CDN URL {}", url);
            return Err(RelayError::ForbiddenHost);
        }

        log::debug!("VideoRelay: GET {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, VIDEO_ACCEPT)
            .header(ACCEPT_LANGUAGE, config::network::ACCEPT_LANGUAGE)
            .header(REFERER, INSTAGRAM_REFERER)
            .send()
            .await?;

        let status = response.status();
        if status.is_redirection() || !self.policy.allows(response.url().as_str()) {
            log::warn!(
                "VideoRelay: {} redirected to non-CDN URL {}",
                url,
                response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or(response.url().as_str())
            );
            return Err(RelayError::ForbiddenHost);
        }
        if !status.is_success() {
            log::warn!("VideoRelay: CDN returned {} for {}", status, url);
            return Err(RelayError::Upstream(status));
        }

        Ok(response)
    }
}

/// Redirect policy that follows hops only to hosts `policy` allows.
///
/// A hop to any other host stops the chain, leaving the 3xx response as the
/// final one.
fn redirect_policy(policy: ProxyPolicy) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if policy.allows(attempt.url().as_str()) {
            attempt.follow()
        } else {
            attempt.stop()
        }
    })
}

/// Attachment filename for a relayed video.
pub fn attachment_filename() -> String {
    format!("instagram-video-{}.mp4", chrono::Utc::now().timestamp_millis())
}
