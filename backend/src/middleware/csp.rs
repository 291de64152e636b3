//! Content-Security-Policy header.
//!
//! Same-origin by default; the allowances cover the Turnstile widget
//! (script/connect/frame) and the inline script/style the bundler and the
//! utility-CSS pipeline emit.

use axum::{
    extract::Request,
    http::{header::CONTENT_SECURITY_POLICY, HeaderValue},
    middleware::Next,
    response::Response,
};

const CSP_DIRECTIVES: &[&str] = &[
    "default-src 'self'",
    "script-src 'self' 'unsafe-inline' 'unsafe-eval' https://challenges.cloudflare.com",
    "style-src 'self' 'unsafe-inline'",
    "img-src 'self' data: https: blob:",
    "font-src 'self' data:",
    "connect-src 'self' https://challenges.cloudflare.com",
    "frame-src https://challenges.cloudflare.com",
    "base-uri 'self'",
    "form-action 'self'",
    "frame-ancestors 'none'",
];

pub fn content_security_policy() -> String {
    CSP_DIRECTIVES.join("; ")
}

pub async fn csp(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&content_security_policy()) {
        response
            .headers_mut()
            .insert(CONTENT_SECURITY_POLICY, value);
    }
    response
}
