use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use reelgrab::cli::{Cli, Commands};
use reelgrab::core::metrics::ResolveMetrics;
use reelgrab::core::rate_limiter::RateLimiter;
use reelgrab::core::web_server::{start_web_server, AppState};
use reelgrab::core::{config, init_logger};
use reelgrab::download::{InstagramEndpoints, InstagramResolver, ProxyPolicy, VideoRelay};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the selected subcommand. Without a
/// subcommand the HTTP API is started with settings from the environment.
///
/// # Errors
/// Returns an error if initialization fails (logging, HTTP client, socket bind).
#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before any config static is read
    let _ = dotenv();

    let cli = Cli::parse_args();

    init_logger(config::LOG_FILE_PATH.as_deref(), *config::LOG_LEVEL)?;

    match cli.command {
        Some(Commands::Serve { bind, port }) => run_server(bind, port).await,
        Some(Commands::Resolve { url }) => resolve_once(&url).await,
        None => run_server(None, None).await,
    }
}

fn build_resolver() -> Result<Arc<InstagramResolver>> {
    let metrics = Arc::new(ResolveMetrics::new()?);
    let resolver = InstagramResolver::new(InstagramEndpoints::default(), metrics)?;
    Ok(Arc::new(resolver))
}

async fn run_server(bind: Option<String>, port: Option<u16>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config::server::BIND_ADDR.clone());
    let port = port.unwrap_or(*config::server::PORT);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", bind, port))?;

    let resolver = build_resolver()?;
    let relay = Arc::new(VideoRelay::new(ProxyPolicy::default())?);
    let rate_limiter = RateLimiter::from_config();

    log::info!(
        "Rate limit: {} requests per {}s per client",
        rate_limiter.limit(),
        *config::rate_limit::WINDOW_SECS
    );

    // Expired windows are only replaced on the next request from the same
    // client, so sweep them periodically.
    let limiter_for_prune = rate_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(config::server::RATE_LIMIT_PRUNE_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            let removed = limiter_for_prune.prune().await;
            if removed > 0 {
                log::debug!("Pruned {} expired rate-limit windows", removed);
            }
        }
    });

    let state = AppState::new(resolver, relay, rate_limiter);
    start_web_server(addr, state).await?;

    Ok(())
}

async fn resolve_once(url: &str) -> Result<()> {
    let resolver = build_resolver()?;
    let asset = resolver.resolve(url).await?;
    println!("{}", serde_json::to_string_pretty(&asset)?);
    Ok(())
}
