use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub jti: String, // session id, key into the session store
    pub sub: String, // user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed session token plus the identifiers the store needs.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub jti: String,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(user_id: UserId, ttl_seconds: u64, locale: Option<String>) -> Self {
        let now = Utc::now().timestamp();
        Self {
            jti: Uuid::new_v4().to_string(),
            sub: user_id.to_string(),
            locale,
            iat: now,
            exp: now + ttl_seconds as i64,
        }
    }
}

pub fn sign_session(
    user_id: UserId,
    secret: &str,
    ttl_seconds: u64,
    locale: Option<String>,
) -> anyhow::Result<IssuedSession> {
    let claims = SessionClaims::new(user_id, ttl_seconds, locale);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(IssuedSession {
        token,
        jti: claims.jti,
        exp: claims.exp,
    })
}

/// Verifies signature and expiry. Callers treat any failure uniformly as
/// "no session", so the error carries no caller-visible distinction.
pub fn verify_session(token: &str, secret: &str) -> anyhow::Result<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}
