//! User persistence behind a mockable trait.

use async_trait::async_trait;

use crate::db::connection::DbPool;
use crate::error::AppError;
use crate::models::user::{NewUser, User, UserId};

/// Storage handle injected into the auth routes. Mock with
/// `MockUserStore` in unit tests, or swap in the in-memory implementation
/// the integration suite carries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by normalized (lowercase, trimmed) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Look up a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;

    /// Insert a new user and return the storage-assigned id.
    ///
    /// The `users.email` UNIQUE constraint backstops the caller's
    /// check-then-insert; a concurrent duplicate surfaces as `EmailInUse`.
    async fn insert(&self, user: &NewUser) -> Result<UserId, AppError>;
}

pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, first_name, email, password_hash, salt, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, first_name, email, password_hash, salt, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: &NewUser) -> Result<UserId, AppError> {
        let id = sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (first_name, email, password_hash, salt) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&user.first_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.salt)
        .fetch_one(&*self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => AppError::InsertFailed,
            other => AppError::from(other),
        })?;

        Ok(id)
    }
}
