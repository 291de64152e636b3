#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request},
    response::Response,
};
use chrono::Utc;
use tokio::sync::RwLock;

use studio_backend::{
    config::Config,
    error::AppError,
    models::user::{NewUser, User, UserId},
    repositories::user::UserStore,
    services::{
        mailer::ContactMailer,
        session::{MemorySessionStore, SessionStore},
        turnstile::{TurnstileClient, DUMMY_SECRET_KEY, SITEVERIFY_URL},
    },
    state::AppState,
};

/// In-memory stand-in for the Postgres user store, with the same
/// duplicate-email semantics the UNIQUE constraint provides.
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn insert(&self, user: &NewUser) -> Result<UserId, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(AppError::EmailInUse);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        users.push(User {
            id,
            first_name: user.first_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            salt: user.salt.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }
}

/// Baseline config: dummy Turnstile secret (always passes, no network),
/// in-memory stores, and an email API base nothing listens on so a test
/// that forgets to stub the provider fails loudly.
pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused-in-tests".to_string(),
        redis_url: None,
        redis_pool_size: 2,
        redis_connect_timeout: 1,
        jwt_secret: Some("test-secret".to_string()),
        turnstile_secret_key: Some(DUMMY_SECRET_KEY.to_string()),
        turnstile_site_key: None,
        turnstile_verify_url: SITEVERIFY_URL.to_string(),
        resend_api_key: Some("re_test_key".to_string()),
        resend_api_base: "http://127.0.0.1:1".to_string(),
        resend_from: "ACME Studios <no-reply@acme-studios.org>".to_string(),
        resend_reply_to: "hello@acme-studios.org".to_string(),
        site_name: "ACME Studios".to_string(),
        public_base_url: "http://localhost:8787".to_string(),
        port: 8787,
    }
}

pub fn test_state(config: Config) -> AppState {
    test_state_with_sessions(config, Arc::new(MemorySessionStore::new()))
}

pub fn test_state_with_sessions(config: Config, sessions: Arc<dyn SessionStore>) -> AppState {
    AppState::new(
        Arc::new(MemoryUserStore::new()),
        sessions,
        Arc::new(TurnstileClient::from_config(&config)),
        Arc::new(ContactMailer::from_config(&config)),
        config,
    )
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

pub async fn response_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn extract_set_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .find_map(|value| {
            let value = value.to_str().ok()?;
            let token = value.strip_prefix(&prefix)?.split(';').next()?.trim();
            if token.is_empty() {
                None
            } else {
                Some(token.to_string())
            }
        })
}
