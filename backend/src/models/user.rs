//! User rows and the request/response payloads of the public API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::validation::rules;

pub type UserId = i64;

/// Database representation of a registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Storage-assigned identifier.
    pub id: UserId,
    pub first_name: String,
    /// Stored lowercase/trimmed; uniqueness is enforced by the database.
    pub email: String,
    /// Base64 PBKDF2-HMAC-SHA256 digest of the password.
    pub password_hash: String,
    /// Base64 random salt the digest was derived with.
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

/// Column values for a user about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
}

/// Signup payload. Fields default to empty so absent and blank inputs take
/// the same `missing_fields` path.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    #[validate(custom(function = "rules::validate_required_trimmed"))]
    pub first_name: String,
    #[validate(custom(function = "rules::validate_required_trimmed"))]
    pub email: String,
    #[validate(custom(function = "rules::validate_required_trimmed"))]
    pub password: String,
    #[validate(custom(function = "rules::validate_required_trimmed"))]
    pub turnstile_token: String,
    pub locale: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SigninRequest {
    #[validate(custom(function = "rules::validate_required_trimmed"))]
    pub email: String,
    #[validate(custom(function = "rules::validate_required_trimmed"))]
    pub password: String,
    #[validate(custom(function = "rules::validate_required_trimmed"))]
    pub turnstile_token: String,
    pub locale: Option<String>,
}

/// Contact-form payload. The Turnstile token is not part of the required
/// set; a blank token simply fails verification.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    #[validate(custom(function = "rules::validate_required_trimmed"))]
    pub first_name: String,
    #[validate(custom(function = "rules::validate_required_trimmed"))]
    pub last_name: String,
    #[validate(custom(function = "rules::validate_contact_email"))]
    pub email: String,
    #[validate(custom(function = "rules::validate_required_trimmed"))]
    pub service: String,
    pub message: Option<String>,
    pub turnstile_token: String,
}

/// Public projection of a user, returned by `/api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicUser {
    pub id: UserId,
    pub first_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            first_name: user.first_name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}
