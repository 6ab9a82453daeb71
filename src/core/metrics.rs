//! Prometheus metrics for the resolution pipeline
//!
//! Each `ResolveMetrics` owns its own registry, so tests can build as many
//! instances as they need without colliding in the process-global one.

use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

use crate::core::error::AppResult;

/// Outcome of a single strategy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// Produced a candidate with a usable video URL
    Hit,
    /// Answered, but without a usable video URL
    Miss,
    /// Failed (transport, status, parse)
    Error,
}

impl StrategyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyOutcome::Hit => "hit",
            StrategyOutcome::Miss => "miss",
            StrategyOutcome::Error => "error",
        }
    }
}

pub struct ResolveMetrics {
    registry: Registry,
    resolve_total: IntCounterVec,
    strategy_attempts_total: IntCounterVec,
    resolve_duration_seconds: Histogram,
}

impl ResolveMetrics {
    pub fn new() -> AppResult<Self> {
        let registry = Registry::new();

        // Labels: outcome (success/invalid_url/unreachable/rate_limited)
        let resolve_total = IntCounterVec::new(
            Opts::new("reelgrab_resolve_total", "Total number of resolution requests by outcome"),
            &["outcome"],
        )?;

        // Labels: strategy (graphql/oembed/page_scrape), outcome (hit/miss/error)
        let strategy_attempts_total = IntCounterVec::new(
            Opts::new(
                "reelgrab_strategy_attempts_total",
                "Total number of strategy attempts by strategy and outcome",
            ),
            &["strategy", "outcome"],
        )?;

        let resolve_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "reelgrab_resolve_duration_seconds",
                "Time spent resolving a post URL across all strategies",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(resolve_total.clone()))?;
        registry.register(Box::new(strategy_attempts_total.clone()))?;
        registry.register(Box::new(resolve_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            resolve_total,
            strategy_attempts_total,
            resolve_duration_seconds,
        })
    }

    pub fn record_strategy(&self, strategy: &str, outcome: StrategyOutcome) {
        self.strategy_attempts_total
            .with_label_values(&[strategy, outcome.as_str()])
            .inc();
    }

    pub fn record_resolve(&self, outcome: &str, elapsed: Duration) {
        self.resolve_total.with_label_values(&[outcome]).inc();
        self.resolve_duration_seconds.observe(elapsed.as_secs_f64());
    }

    /// Number of recorded attempts for a strategy/outcome pair.
    pub fn strategy_attempts(&self, strategy: &str, outcome: StrategyOutcome) -> u64 {
        self.strategy_attempts_total
            .with_label_values(&[strategy, outcome.as_str()])
            .get()
    }

    /// Number of recorded resolutions with the given outcome.
    pub fn resolutions(&self, outcome: &str) -> u64 {
        self.resolve_total.with_label_values(&[outcome]).get()
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn encode(&self) -> AppResult<String> {
        let encoder = TextEncoder::new();
        Ok(encoder.encode_to_string(&self.registry.gather())?)
    }
}
