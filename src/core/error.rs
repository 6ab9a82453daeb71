use thiserror::Error;

use crate::download::error::ResolveError;

/// Centralized error types for the application
///
/// Everything outside the resolution contract is converted to this enum.
/// `ResolveError` stays the only error type the HTTP layer maps to a specific
/// status code; the remaining variants surface as a generic 500.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resolution pipeline outcome (invalid URL, unreachable, rate limited)
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// HTTP client errors (client construction, relay transport)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors (socket bind, log file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Prometheus registry errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Logger initialization errors
    #[error("Logger error: {0}")]
    Logger(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
