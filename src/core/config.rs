use log::LevelFilter;
use once_cell::sync::Lazy;
use std::env;

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: unset (console only)
pub static LOG_FILE_PATH: Lazy<Option<String>> =
    Lazy::new(|| env::var("LOG_FILE_PATH").ok().filter(|path| !path.trim().is_empty()));

/// Log level
/// Read from LOG_LEVEL environment variable (error, warn, info, debug, trace, off)
/// Default: info
pub static LOG_LEVEL: Lazy<LevelFilter> = Lazy::new(|| {
    env::var("LOG_LEVEL")
        .map(|raw| crate::core::logging::parse_level(&raw))
        .unwrap_or(LevelFilter::Info)
});

/// HTTP server configuration
pub mod server {
    use once_cell::sync::Lazy;
    use std::env;

    /// Address the HTTP server binds to
    /// Read from BIND_ADDR environment variable
    /// Default: 0.0.0.0
    pub static BIND_ADDR: Lazy<String> = Lazy::new(|| env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()));

    /// Port for the HTTP server
    /// Read from PORT environment variable
    /// Default: 3000
    pub static PORT: Lazy<u16> = Lazy::new(|| env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000));

    /// Interval between sweeps of expired rate-limit windows (in seconds)
    pub const RATE_LIMIT_PRUNE_INTERVAL_SECS: u64 = 300;
}

/// Rate limiting configuration for the public download endpoint
pub mod rate_limit {
    use once_cell::sync::Lazy;
    use std::env;
    use std::time::Duration;

    /// Requests allowed per client within one window
    /// Read from RATE_LIMIT_MAX_REQUESTS environment variable
    /// Default: 10
    pub static MAX_REQUESTS: Lazy<u32> = Lazy::new(|| {
        env::var("RATE_LIMIT_MAX_REQUESTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(10)
    });

    /// Window length in seconds
    /// Read from RATE_LIMIT_WINDOW_SECS environment variable
    /// Default: 60
    pub static WINDOW_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(60)
    });

    /// Window duration
    pub fn window() -> Duration {
        Duration::from_secs(*WINDOW_SECS)
    }
}

/// Network configuration for outbound requests
pub mod network {
    use once_cell::sync::Lazy;
    use std::env;
    use std::time::Duration;

    /// Desktop Chrome user agent presented to every upstream
    pub const DEFAULT_USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    /// Accept-Language sent with every upstream request
    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

    /// User agent override
    /// Read from HTTP_USER_AGENT environment variable
    pub static USER_AGENT: Lazy<String> =
        Lazy::new(|| env::var("HTTP_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()));

    /// Whole-request timeout (in seconds)
    /// Read from HTTP_REQUEST_TIMEOUT_SECS environment variable
    /// Default: 30
    pub static REQUEST_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("HTTP_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30)
    });

    /// Connect timeout (in seconds)
    /// Read from HTTP_CONNECT_TIMEOUT_SECS environment variable
    /// Default: 10
    pub static CONNECT_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("HTTP_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10)
    });

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(*REQUEST_TIMEOUT_SECS)
    }

    /// Connect timeout duration
    pub fn connect_timeout() -> Duration {
        Duration::from_secs(*CONNECT_TIMEOUT_SECS)
    }
}

/// Instagram upstream endpoints
pub mod instagram {
    use once_cell::sync::Lazy;
    use std::env;

    /// Web origin hosting the structured query endpoint
    /// Read from INSTAGRAM_WEB_ORIGIN environment variable
    pub static WEB_ORIGIN: Lazy<String> =
        Lazy::new(|| env::var("INSTAGRAM_WEB_ORIGIN").unwrap_or_else(|_| "https://www.instagram.com".to_string()));

    /// Public embed-metadata (oEmbed) endpoint
    /// Read from INSTAGRAM_OEMBED_URL environment variable
    pub static OEMBED_URL: Lazy<String> =
        Lazy::new(|| env::var("INSTAGRAM_OEMBED_URL").unwrap_or_else(|_| "https://api.instagram.com/oembed/".to_string()));

    /// Persisted query hash for the shortcode media query.
    /// Instagram rotates these; override via INSTAGRAM_QUERY_HASH without a rebuild.
    pub static QUERY_HASH: Lazy<String> = Lazy::new(|| {
        env::var("INSTAGRAM_QUERY_HASH").unwrap_or_else(|_| "b3055c01b4b222b8a47dc12b090e4e64".to_string())
    });

    /// Host suffixes the download relay is allowed to fetch from
    pub const CDN_HOST_SUFFIXES: &[&str] = &["instagram.com", "cdninstagram.com", "fbcdn.net"];
}
