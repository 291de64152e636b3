//! Revocable session records keyed by token id.
//!
//! The signed cookie is only a capability reference; the store owns the
//! record. A session is live iff the signature verifies, the token is
//! unexpired, and a store entry for its jti still exists — deleting the
//! entry revokes the session no matter how much token lifetime remains.

use async_trait::async_trait;
use bb8_redis::redis::AsyncCommands;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::db::redis::RedisPool;
use crate::models::user::UserId;
use crate::utils::cookies::{extract_cookie_value, SESSION_COOKIE_NAME};
use crate::utils::jwt;

/// Value stored per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: UserId,
    /// Unix seconds; mirrors the token's own expiry.
    pub exp: i64,
}

/// Resolved identity for an authenticated request.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub jti: String,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a record under its jti with TTL = exp − now, so entries
    /// self-expire in lockstep with the token.
    async fn put(&self, jti: &str, record: &SessionRecord) -> anyhow::Result<()>;

    async fn get(&self, jti: &str) -> anyhow::Result<Option<SessionRecord>>;

    /// Explicit revocation (signout). Idempotent.
    async fn delete(&self, jti: &str) -> anyhow::Result<()>;
}

fn session_key(jti: &str) -> String {
    format!("sess:{}", jti)
}

pub struct RedisSessionStore {
    pool: RedisPool,
}

impl RedisSessionStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, jti: &str, record: &SessionRecord) -> anyhow::Result<()> {
        let span = tracing::debug_span!("redis_session_put", jti);
        let _enter = span.enter();

        let ttl = (record.exp - Utc::now().timestamp()).max(1) as u64;
        let mut conn = self.pool.get().await?;
        let value = serde_json::to_string(record)?;
        let _: () = conn.set_ex(session_key(jti), value, ttl).await?;
        Ok(())
    }

    async fn get(&self, jti: &str) -> anyhow::Result<Option<SessionRecord>> {
        let span = tracing::debug_span!("redis_session_get", jti);
        let _enter = span.enter();

        let mut conn = self.pool.get().await?;
        let raw: Option<String> = conn.get(session_key(jti)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, jti: &str) -> anyhow::Result<()> {
        let span = tracing::debug_span!("redis_session_delete", jti);
        let _enter = span.enter();

        let mut conn = self.pool.get().await?;
        let _: () = conn.del(session_key(jti)).await?;
        Ok(())
    }
}

/// Single-process fallback used when Redis is not configured (dev and the
/// test suite). Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, jti: &str, record: &SessionRecord) -> anyhow::Result<()> {
        self.entries
            .write()
            .await
            .insert(jti.to_string(), record.clone());
        Ok(())
    }

    async fn get(&self, jti: &str) -> anyhow::Result<Option<SessionRecord>> {
        let now = Utc::now().timestamp();
        let mut entries = self.entries.write().await;
        match entries.get(jti) {
            Some(record) if record.exp > now => Ok(Some(record.clone())),
            Some(_) => {
                entries.remove(jti);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, jti: &str) -> anyhow::Result<()> {
        self.entries.write().await.remove(jti);
        Ok(())
    }
}

/// Resolves the request's `sid` cookie to an identity, or `None` for any
/// failure: no cookie, bad signature, expired token, or revoked session.
pub async fn read_session(
    headers: &axum::http::HeaderMap,
    store: &dyn SessionStore,
    secret: Option<&str>,
) -> Option<SessionIdentity> {
    let secret = secret?;
    let cookie_header = headers
        .get(axum::http::header::COOKIE)?
        .to_str()
        .ok()?;
    let token = extract_cookie_value(cookie_header, SESSION_COOKIE_NAME)?;
    let claims = jwt::verify_session(&token, secret).ok()?;
    let record = store.get(&claims.jti).await.ok().flatten()?;
    Some(SessionIdentity {
        user_id: record.user_id,
        jti: claims.jti,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    use crate::utils::jwt::sign_session;

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("sid={}", token)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn memory_store_roundtrip_and_delete() {
        let store = MemorySessionStore::new();
        let record = SessionRecord {
            user_id: 1,
            exp: Utc::now().timestamp() + 60,
        };

        store.put("jti-1", &record).await.unwrap();
        assert_eq!(store.get("jti-1").await.unwrap(), Some(record));

        store.delete("jti-1").await.unwrap();
        assert_eq!(store.get("jti-1").await.unwrap(), None);

        // deleting again is a no-op
        store.delete("jti-1").await.unwrap();
    }

    #[tokio::test]
    async fn memory_store_expires_entries() {
        let store = MemorySessionStore::new();
        let record = SessionRecord {
            user_id: 1,
            exp: Utc::now().timestamp() - 5,
        };
        store.put("stale", &record).await.unwrap();
        assert_eq!(store.get("stale").await.unwrap(), None);
    }

    #[tokio::test]
    async fn read_session_resolves_live_sessions_only() {
        let store = MemorySessionStore::new();
        let issued = sign_session(9, "secret", 60, None).unwrap();
        store
            .put(
                &issued.jti,
                &SessionRecord {
                    user_id: 9,
                    exp: issued.exp,
                },
            )
            .await
            .unwrap();

        let identity = read_session(&cookie_headers(&issued.token), &store, Some("secret"))
            .await
            .expect("live session");
        assert_eq!(identity.user_id, 9);
        assert_eq!(identity.jti, issued.jti);

        // wrong secret: signature check fails
        assert!(
            read_session(&cookie_headers(&issued.token), &store, Some("nope"))
                .await
                .is_none()
        );

        // revocation: a valid signature without a store entry is dead
        store.delete(&issued.jti).await.unwrap();
        assert!(
            read_session(&cookie_headers(&issued.token), &store, Some("secret"))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn read_session_requires_secret_and_cookie() {
        let store = MemorySessionStore::new();
        assert!(read_session(&HeaderMap::new(), &store, Some("secret"))
            .await
            .is_none());

        let issued = sign_session(1, "secret", 60, None).unwrap();
        assert!(read_session(&cookie_headers(&issued.token), &store, None)
            .await
            .is_none());
    }
}
