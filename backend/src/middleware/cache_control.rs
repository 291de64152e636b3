//! Cache-Control policy keyed on the request path class.
//!
//! Purely a function of the URL; no request state. Values mirror the CDN
//! setup: long-lived static assets, immutable hashed bundles, uncacheable
//! API responses, and two tiers of HTML pages with `Vary` and `Cache-Tag`
//! for selective purging.

use axum::{
    extract::Request,
    http::{
        header::{HeaderName, HeaderValue, CACHE_CONTROL, VARY},
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};

const CDN_CACHE_CONTROL: &str = "cdn-cache-control";
const CACHE_TAG: &str = "cache-tag";

const STATIC_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "avif", "svg", "ico", "woff", "woff2", "ttf", "eot",
];

/// Path classes with distinct caching behavior, matched most-specific
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheClass {
    /// Images, fonts, and other raw static files.
    StaticAsset,
    /// Content-hashed build output under `/assets/`; safe to mark immutable.
    HashedAsset,
    /// Dynamic API responses; never cached anywhere.
    Api,
    /// Rarely-changing marketing pages.
    SemiStaticPage,
    /// Remaining extensionless HTML routes.
    Page,
    /// Anything else is left alone.
    Passthrough,
}

impl CacheClass {
    pub fn classify(path: &str) -> Self {
        if path.starts_with("/images/")
            || path.starts_with("/fonts/")
            || has_static_extension(path)
        {
            return Self::StaticAsset;
        }
        if path.starts_with("/assets/") {
            return Self::HashedAsset;
        }
        if path.starts_with("/api/") {
            return Self::Api;
        }
        if path == "/about" || path == "/services" {
            return Self::SemiStaticPage;
        }
        if !path.contains('.') {
            return Self::Page;
        }
        Self::Passthrough
    }
}

fn has_static_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| STATIC_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

pub async fn cache_policy(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;
    apply_cache_headers(&path, response.headers_mut());
    response
}

pub fn apply_cache_headers(path: &str, headers: &mut HeaderMap) {
    let cdn = HeaderName::from_static(CDN_CACHE_CONTROL);
    match CacheClass::classify(path) {
        CacheClass::StaticAsset => {
            // 1 month browser, 6 months CDN
            headers.insert(
                CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=2592000, s-maxage=15552000"),
            );
            headers.insert(cdn, HeaderValue::from_static("public, max-age=15552000"));
        }
        CacheClass::HashedAsset => {
            headers.insert(
                CACHE_CONTROL,
                HeaderValue::from_static(
                    "public, max-age=2592000, s-maxage=15552000, immutable",
                ),
            );
            headers.insert(
                cdn,
                HeaderValue::from_static("public, max-age=15552000, immutable"),
            );
        }
        CacheClass::Api => {
            headers.insert(
                CACHE_CONTROL,
                HeaderValue::from_static("private, no-cache, no-store, must-revalidate"),
            );
            headers.insert(cdn, HeaderValue::from_static("no-store"));
        }
        CacheClass::SemiStaticPage => {
            // 1 week browser, 1 month CDN
            headers.insert(
                CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=604800, s-maxage=2592000"),
            );
            headers.insert(cdn, HeaderValue::from_static("public, max-age=2592000"));
            headers.insert(VARY, HeaderValue::from_static("Cookie, Accept-Language"));
            insert_cache_tag(headers, &path[1..]);
        }
        CacheClass::Page => {
            // 1 hour browser, 1 week CDN
            headers.insert(
                CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=3600, s-maxage=604800"),
            );
            headers.insert(cdn, HeaderValue::from_static("public, max-age=604800"));
            headers.insert(VARY, HeaderValue::from_static("Cookie, Accept-Language"));
            let page = if path == "/" {
                "home".to_string()
            } else {
                path[1..].replace('/', "-")
            };
            insert_cache_tag(headers, &page);
        }
        CacheClass::Passthrough => {}
    }
}

fn insert_cache_tag(headers: &mut HeaderMap, page: &str) {
    if let Ok(value) = HeaderValue::from_str(&format!("page:{}", page)) {
        headers.insert(HeaderName::from_static(CACHE_TAG), value);
    }
}
