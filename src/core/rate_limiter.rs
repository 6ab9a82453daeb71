use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::core::config;

/// Fixed-window request counter for a single client.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// Rate limiter for the public download endpoint.
///
/// Counts requests per client key (forwarded IP or `"unknown"`) inside a fixed
/// window. The first request opens a window; once `limit` requests were
/// accepted, further requests are refused until the window has elapsed.
///
/// Constructed once at start-up and shared through the server state.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    /// Creates a limiter allowing `limit` requests per `window` for each client.
    ///
    /// # Example
    ///
    /// ```
    /// use reelgrab::core::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let limiter = RateLimiter::new(10, Duration::from_secs(60));
    /// assert_eq!(limiter.limit(), 10);
    /// ```
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            limit,
            window,
        }
    }

    /// Creates a limiter from `RATE_LIMIT_MAX_REQUESTS` / `RATE_LIMIT_WINDOW_SECS`.
    pub fn from_config() -> Self {
        Self::new(*config::rate_limit::MAX_REQUESTS, config::rate_limit::window())
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Records a request for `key` and reports whether it is allowed.
    ///
    /// Returns `true` if the request fits in the current window, `false` if the
    /// client is throttled.
    pub async fn check(&self, key: &str) -> bool {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        match windows.get_mut(key) {
            Some(window) if now.duration_since(window.started) <= self.window => {
                if window.count >= self.limit {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                windows.insert(key.to_string(), Window { count: 1, started: now });
                true
            }
        }
    }

    /// Time left until the current window of a throttled client resets.
    ///
    /// Returns `None` if the client is not currently throttled.
    pub async fn remaining_time(&self, key: &str) -> Option<Duration> {
        let windows = self.windows.lock().await;
        let window = windows.get(key)?;
        if window.count < self.limit {
            return None;
        }
        let resets_at = window.started + self.window;
        let now = Instant::now();
        (now < resets_at).then(|| resets_at - now)
    }

    /// Drops windows that have already elapsed. Returns how many were removed.
    pub async fn prune(&self) -> usize {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        let before = windows.len();
        windows.retain(|_, window| now.duration_since(window.started) <= self.window);
        before - windows.len()
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }
}
