pub mod auth;
pub mod contact;
pub mod turnstile;

use axum::{extract::State, http::HeaderMap};

use crate::state::AppState;

/// Liveness probe.
pub async fn health(State(state): State<AppState>) -> String {
    format!("{} API OK", state.config.site_name)
}

/// Client IP as forwarded by the edge, if any.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cf-connecting-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(|value| value.trim().to_string())
        })
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_cf_connecting_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.1, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.1, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.1"));
    }

    #[test]
    fn client_ip_is_none_without_headers() {
        assert!(client_ip(&HeaderMap::new()).is_none());
    }
}
