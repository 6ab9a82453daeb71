//! HTTP API tests: the axum router driven with `tower::ServiceExt::oneshot`,
//! upstreams mocked with wiremock.
//!
//! Run with: cargo test --test web_server_test

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{graphql_video_body, resolver_for, LOGIN_PAGE_HTML, REEL_URL};
use reelgrab::core::rate_limiter::RateLimiter;
use reelgrab::core::web_server::{router, AppState};
use reelgrab::download::{ProxyPolicy, VideoRelay};

fn app_with_limit(server: &MockServer, limit: u32) -> Router {
    let relay = VideoRelay::new(ProxyPolicy::new(["127.0.0.1"])).unwrap();
    let state = AppState::new(
        resolver_for(server),
        Arc::new(relay),
        RateLimiter::new(limit, Duration::from_secs(60)),
    );
    router(state)
}

fn app(server: &MockServer) -> Router {
    app_with_limit(server, 100)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn mount_unreachable(server: &MockServer) {
    Mock::given(path("/graphql/query/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
    Mock::given(path("/oembed/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    Mock::given(path("/reel/ABC123/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE_HTML))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_download_success() {
    let server = MockServer::start().await;
    Mock::given(path("/graphql/query/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(graphql_video_body(
            "https://cdn/v.mp4",
            "https://cdn/t.jpg",
            125.0,
        )))
        .mount(&server)
        .await;

    let response = app(&server)
        .oneshot(post_json("/api/download", json!({ "url": REEL_URL })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "success": true,
            "video_url": "https://cdn/v.mp4",
            "thumbnail": "https://cdn/t.jpg",
            "quality": "HD",
            "duration": "2:05"
        })
    );
}

#[tokio::test]
async fn test_download_requires_url() {
    let server = MockServer::start().await;

    for body in [json!({}), json!({ "url": "" }), json!({ "url": "   " }), json!({ "link": REEL_URL })] {
        let response = app(&server).oneshot(post_json("/api/download", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "success": false, "error": "URL is required" })
        );
    }
}

#[tokio::test]
async fn test_download_rejects_malformed_body() {
    let server = MockServer::start().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/download")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "URL is required");
}

#[tokio::test]
async fn test_download_rejects_non_post_url() {
    let server = MockServer::start().await;

    let response = app(&server)
        .oneshot(post_json("/api/download", json!({ "url": "https://www.instagram.com/cristiano/" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "success": false, "error": "Invalid Instagram URL format" })
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_download_unreachable_is_not_found() {
    let server = MockServer::start().await;
    mount_unreachable(&server).await;

    let response = app(&server)
        .oneshot(post_json("/api/download", json!({ "url": REEL_URL })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({
            "success": false,
            "error": "Unable to fetch video. The post may be private or unavailable."
        })
    );
}

#[tokio::test]
async fn test_download_rate_limited() {
    let server = MockServer::start().await;
    let app = app_with_limit(&server, 2);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/api/download", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .clone()
        .oneshot(post_json("/api/download", json!({ "url": REEL_URL })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    assert_eq!(
        json_body(response).await,
        json!({
            "success": false,
            "error": "Too many requests. Please wait a moment and try again."
        })
    );

    // A different client still has its own budget.
    let request = Request::builder()
        .method("POST")
        .uri("/api/download")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-real-ip", "198.51.100.2")
        .body(Body::from(json!({}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_proxy_download_streams_video() {
    let server = MockServer::start().await;
    let payload = vec![7u8; 64 * 1024];
    Mock::given(method("GET"))
        .and(path("/v/t50/video.mp4"))
        .and(header_matcher("referer", "https://www.instagram.com/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(payload.clone()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/v/t50/video.mp4", server.uri());
    let response = app(&server)
        .oneshot(post_json("/api/proxy-download", json!({ "url": url })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(response.headers()[header::CONTENT_LENGTH], payload.len().to_string().as_str());
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"instagram-video-"));
    assert!(disposition.ends_with(".mp4\""));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.len(), payload.len());
    assert!(bytes.iter().all(|b| *b == 7));
}

#[tokio::test]
async fn test_proxy_download_rejects_forbidden_host() {
    let server = MockServer::start().await;

    let response = app(&server)
        .oneshot(post_json("/api/proxy-download", json!({ "url": "https://evil.example.com/a.mp4" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "Invalid video URL" }));

    let response = app(&server)
        .oneshot(post_json("/api/proxy-download", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "URL is required" }));
}

#[tokio::test]
async fn test_proxy_download_refuses_redirect_off_allow_list() {
    let server = MockServer::start().await;
    let port = server.address().port();
    Mock::given(path("/v.mp4"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", format!("http://localhost:{}/secret", port)))
        .mount(&server)
        .await;
    Mock::given(path("/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let url = format!("http://127.0.0.1:{}/v.mp4", port);
    let response = app(&server)
        .oneshot(post_json("/api/proxy-download", json!({ "url": url })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "Invalid video URL" }));
}

#[tokio::test]
async fn test_proxy_download_forwards_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(path("/expired.mp4"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let url = format!("{}/expired.mp4", server.uri());
    let response = app(&server)
        .oneshot(post_json("/api/proxy-download", json!({ "url": url })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await, json!({ "error": "Failed to fetch video" }));
}

#[tokio::test]
async fn test_health_and_metrics() {
    let server = MockServer::start().await;
    mount_unreachable(&server).await;
    let app = app(&server);

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health = json_body(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["strategies"], json!(["graphql", "oembed", "page_scrape"]));
    assert!(health["uptime_seconds"].is_u64());

    let response = app
        .clone()
        .oneshot(post_json("/api/download", json!({ "url": REEL_URL })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("reelgrab_resolve_total{outcome=\"unreachable\"} 1"));
    assert!(text
        .lines()
        .any(|line| line.starts_with("reelgrab_strategy_attempts_total") && line.contains("strategy=\"graphql\"")));
}
