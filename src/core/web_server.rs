//! Public HTTP API.
//!
//! Routes:
//! - `POST /api/download`: resolve a post URL into a video asset
//! - `POST /api/proxy-download`: stream a CDN video back as an attachment
//! - `GET /health`: liveness with uptime
//! - `GET /metrics`: Prometheus text exposition

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, RETRY_AFTER},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::core::error::AppResult;
use crate::core::rate_limiter::RateLimiter;
use crate::core::types::VideoAsset;
use crate::core::validation;
use crate::download::error::{RelayError, ResolveError};
use crate::download::relay::{attachment_filename, VideoRelay};
use crate::download::resolver::InstagramResolver;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<InstagramResolver>,
    pub relay: Arc<VideoRelay>,
    pub rate_limiter: RateLimiter,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(resolver: Arc<InstagramResolver>, relay: Arc<VideoRelay>, rate_limiter: RateLimiter) -> Self {
        Self {
            resolver,
            relay,
            rate_limiter,
            start_time: Instant::now(),
        }
    }
}

/// Request body shared by both POST endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
struct DownloadResponse {
    success: bool,
    #[serde(flatten)]
    asset: VideoAsset,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/download", post(download_handler))
        .route("/api/proxy-download", post(proxy_download_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl+C.
pub async fn start_web_server(addr: SocketAddr, state: AppState) -> AppResult<()> {
    let app = router(state);

    log::info!("Starting web server on http://{}", addr);
    log::info!("  POST /api/download        - Resolve post URL");
    log::info!("  POST /api/proxy-download  - Relay CDN video");
    log::info!("  GET  /health              - Health check");
    log::info!("  GET  /metrics             - Prometheus metrics");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    log::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

/// Rate-limit key for a request: first `x-forwarded-for` entry, then
/// `x-real-ip`, then `"unknown"`.
pub fn client_key(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"))
        .unwrap_or("unknown")
        .to_string()
}

/// Pull a non-empty URL out of a request body; malformed bodies count as missing.
fn requested_url(body: Result<Json<UrlRequest>, JsonRejection>) -> Option<String> {
    let Json(request) = body
        .map_err(|rejection| log::debug!("Rejected request body: {}", rejection))
        .ok()?;
    request.url.map(|url| url.trim().to_string()).filter(|url| !url.is_empty())
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

/// POST /api/download
async fn download_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<UrlRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let client = client_key(&headers);

    if !state.rate_limiter.check(&client).await {
        log::warn!("Rate limit exceeded for client {}", client);
        let metrics = state.resolver.metrics();
        metrics.record_resolve(ResolveError::RateLimited.kind(), started.elapsed());

        let mut response = failure(StatusCode::TOO_MANY_REQUESTS, &ResolveError::RateLimited.to_string());
        if let Some(wait) = state.rate_limiter.remaining_time(&client).await {
            let secs = wait.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        return response;
    }

    let Some(url) = requested_url(body) else {
        return failure(StatusCode::BAD_REQUEST, "URL is required");
    };

    if !validation::is_valid_post_url(&url) {
        return failure(StatusCode::BAD_REQUEST, "Invalid Instagram URL format");
    }

    match state.resolver.resolve(&url).await {
        Ok(asset) => (StatusCode::OK, Json(DownloadResponse { success: true, asset })).into_response(),
        Err(ResolveError::InvalidUrl(_)) => failure(StatusCode::BAD_REQUEST, "Invalid Instagram URL format"),
        Err(e) => failure(e.status_code(), &e.to_string()),
    }
}

/// POST /api/proxy-download
async fn proxy_download_handler(
    State(state): State<AppState>,
    body: Result<Json<UrlRequest>, JsonRejection>,
) -> Response {
    let Some(url) = requested_url(body) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "URL is required" }))).into_response();
    };

    let upstream = match state.relay.fetch(&url).await {
        Ok(upstream) => upstream,
        Err(RelayError::ForbiddenHost) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid video URL" }))).into_response();
        }
        Err(RelayError::Upstream(status)) => {
            return (status, Json(json!({ "error": "Failed to fetch video" }))).into_response();
        }
        Err(e @ RelayError::Http(_)) => {
            log::error!("Proxy download failed for {}: {}", url, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Download failed" }))).into_response();
        }
    };

    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("video/mp4"));
    let content_length = upstream.content_length();
    let disposition = format!("attachment; filename=\"{}\"", attachment_filename());

    let stream = upstream
        .bytes_stream()
        .inspect_err(|e| log::warn!("Proxy download stream interrupted: {}", e));

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_DISPOSITION, disposition);
    if let Some(length) = content_length {
        builder = builder.header(CONTENT_LENGTH, length);
    }

    builder.body(Body::from_stream(stream)).unwrap_or_else(|e| {
        log::error!("Failed to build proxy response: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Download failed" }))).into_response()
    })
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let health_status = json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "strategies": state.resolver.strategy_names(),
        "version": env!("CARGO_PKG_VERSION"),
    });

    (StatusCode::OK, Json(health_status))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.resolver.metrics().encode() {
        Ok(text) => ([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], text).into_response(),
        Err(e) => {
            log::error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to encode metrics: {}", e)).into_response()
        }
    }
}
