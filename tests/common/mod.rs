//! Shared fixtures for integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

use reelgrab::core::metrics::ResolveMetrics;
use reelgrab::{InstagramEndpoints, InstagramResolver};

pub const REEL_URL: &str = "https://www.instagram.com/reel/ABC123/";
pub const SHORTCODE: &str = "ABC123";

/// Resolver whose strategies all talk to `server`.
pub fn resolver_for(server: &MockServer) -> Arc<InstagramResolver> {
    let metrics = Arc::new(ResolveMetrics::new().expect("metrics registry"));
    let resolver =
        InstagramResolver::new(InstagramEndpoints::with_origin(&server.uri()), metrics).expect("resolver");
    Arc::new(resolver)
}

/// GraphQL body in the older `shortcode_media` shape.
pub fn graphql_video_body(video_url: &str, display_url: &str, duration: f64) -> Value {
    json!({
        "data": {
            "shortcode_media": {
                "__typename": "GraphVideo",
                "shortcode": SHORTCODE,
                "is_video": true,
                "video_url": video_url,
                "display_url": display_url,
                "video_duration": duration
            }
        },
        "status": "ok"
    })
}

/// Post page as served to logged-out browsers: JSON-escaped URLs inline.
pub const POST_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en"><head>
<meta property="og:image" content="https://scontent.cdninstagram.com/og.jpg" />
<meta property="og:video" content="https://scontent.cdninstagram.com/og.mp4" />
</head><body>
<script type="application/json">{"items":[{"display_url":"https:\/\/scontent.cdninstagram.com\/t.jpg?stp=1\u0026sig=2","video_url":"https:\/\/scontent.cdninstagram.com\/v.mp4?oh=abc\u0026oe=def"}]}</script>
</body></html>"#;

/// Login wall: no video anywhere.
pub const LOGIN_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html><head><meta property="og:title" content="Login • Instagram" /></head>
<body><div id="react-root"></div></body></html>"#;
