use reqwest::StatusCode;
use thiserror::Error;

/// Outcome of a failed resolution, as seen by callers of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Input does not match any supported post URL shape. Never retried.
    #[error("Invalid Instagram URL: {0}")]
    InvalidUrl(String),
    /// Every strategy was tried and none produced a video URL
    #[error("Unable to fetch video. The post may be private or unavailable.")]
    Unreachable,
    /// Caller exceeded its request budget before the pipeline ran
    #[error("Too many requests. Please wait a moment and try again.")]
    RateLimited,
}

impl ResolveError {
    /// Returns the label used in metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::InvalidUrl(_) => "invalid_url",
            ResolveError::Unreachable => "unreachable",
            ResolveError::RateLimited => "rate_limited",
        }
    }

    /// HTTP status the service answers with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResolveError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ResolveError::Unreachable => StatusCode::NOT_FOUND,
            ResolveError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

/// Failure inside a single strategy.
///
/// Always recovered by the strategy chain: it is logged, counted, and the next
/// strategy runs. It never reaches callers of the pipeline.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Transport failure (DNS, connect, TLS, timeout, body read)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Upstream answered with a non-success status
    #[error("upstream returned HTTP {0}")]
    Status(StatusCode),
    /// Upstream body was not the JSON we asked for (often a login page)
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Post URL could not be rebased onto the configured page origin
    #[error("cannot build page URL: {0}")]
    PageUrl(#[from] url::ParseError),
}

/// Failure while relaying a video from the CDN.
#[derive(Debug, Error)]
pub enum RelayError {
    /// URL does not point at an allowed CDN host
    #[error("Invalid video URL")]
    ForbiddenHost,
    /// CDN answered with a non-success status
    #[error("Failed to fetch video")]
    Upstream(StatusCode),
    /// Transport failure talking to the CDN
    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_kind() {
        assert_eq!(ResolveError::InvalidUrl(String::new()).kind(), "invalid_url");
        assert_eq!(ResolveError::Unreachable.kind(), "unreachable");
        assert_eq!(ResolveError::RateLimited.kind(), "rate_limited");
    }

    #[test]
    fn test_resolve_error_status_code() {
        assert_eq!(ResolveError::InvalidUrl(String::new()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ResolveError::Unreachable.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ResolveError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_resolve_error_display() {
        assert_eq!(
            ResolveError::Unreachable.to_string(),
            "Unable to fetch video. The post may be private or unavailable."
        );
        assert_eq!(
            ResolveError::InvalidUrl("x".into()).to_string(),
            "Invalid Instagram URL: x"
        );
    }

    #[test]
    fn test_strategy_error_status_display() {
        let err = StrategyError::Status(StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.to_string(), "upstream returned HTTP 429 Too Many Requests");
    }
}
