//! Shared outbound HTTP client.
//!
//! Every upstream request goes out with a desktop browser user agent and
//! follows redirects. Timeouts live here, at the transport level; the
//! resolution pipeline itself never caps a strategy.

use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

use crate::core::config;
use crate::core::error::AppResult;

/// Maximum redirects followed per request.
pub(crate) const MAX_REDIRECTS: usize = 10;

/// Transport settings for the shared client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            user_agent: config::network::USER_AGENT.clone(),
            timeout: config::network::timeout(),
            connect_timeout: config::network::connect_timeout(),
        }
    }
}

/// Build the client shared by every strategy.
pub fn build_client(settings: &ClientSettings) -> AppResult<Client> {
    build_client_with_redirects(settings, Policy::limited(MAX_REDIRECTS))
}

/// Build a client with a caller-supplied redirect policy.
pub fn build_client_with_redirects(settings: &ClientSettings, redirects: Policy) -> AppResult<Client> {
    let client = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.timeout)
        .connect_timeout(settings.connect_timeout)
        .redirect(redirects)
        .build()?;

    Ok(client)
}
