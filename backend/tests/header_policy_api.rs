use axum::http::{header, StatusCode};
use studio_backend::router;
use tower::ServiceExt;

mod support;

#[tokio::test]
async fn liveness_line_carries_the_full_header_pipeline() {
    let app = router(support::test_state(support::test_config()));

    let response = app
        .oneshot(support::get_request("/"))
        .await
        .expect("health request");

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();

    // cache policy: "/" is an extensionless page
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=3600, s-maxage=604800"
    );
    assert_eq!(
        headers.get("cdn-cache-control").unwrap(),
        "public, max-age=604800"
    );
    assert_eq!(headers.get(header::VARY).unwrap(), "Cookie, Accept-Language");
    assert_eq!(headers.get("cache-tag").unwrap(), "page:home");

    // CSP
    let csp = headers
        .get(header::CONTENT_SECURITY_POLICY)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(csp.contains("default-src 'self'"));
    assert!(csp.contains("frame-ancestors 'none'"));

    // security headers
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(headers.get(header::X_XSS_PROTECTION).unwrap(), "1; mode=block");
    assert_eq!(
        headers.get(header::REFERRER_POLICY).unwrap(),
        "strict-origin-when-cross-origin"
    );
    assert_eq!(
        headers.get("permissions-policy").unwrap(),
        "geolocation=(), microphone=(), camera=()"
    );

    // request id minted when absent
    assert!(headers.get("x-request-id").is_some());

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ACME Studios API OK");
}

#[tokio::test]
async fn api_responses_are_marked_uncacheable() {
    let app = router(support::test_state(support::test_config()));

    let response = app
        .oneshot(support::get_request("/api/auth/me"))
        .await
        .expect("me request");

    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "private, no-cache, no-store, must-revalidate"
    );
    assert_eq!(response.headers().get("cdn-cache-control").unwrap(), "no-store");
    assert!(response.headers().get("cache-tag").is_none());
}

#[tokio::test]
async fn semi_static_pages_get_their_own_cache_tier() {
    let app = router(support::test_state(support::test_config()));

    // the API itself has no /about route; the header pipeline still
    // classifies the path on the way out
    let response = app
        .oneshot(support::get_request("/about"))
        .await
        .expect("about request");

    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=604800, s-maxage=2592000"
    );
    assert_eq!(response.headers().get("cache-tag").unwrap(), "page:about");
}

#[tokio::test]
async fn inbound_request_id_is_echoed_back() {
    let app = router(support::test_state(support::test_config()));

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/")
                .header("x-request-id", "req-abc-123")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("health request");

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-abc-123");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = router(support::test_state(support::test_config()));

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/")
                .header(header::ORIGIN, "https://example.com")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("health request");

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
