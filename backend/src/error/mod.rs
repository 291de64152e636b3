use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Wire shape for every error the API returns.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Every fallible step in a request has a named variant here; all of them
/// are terminal for the request and translate to a JSON `{error}` body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("required fields missing or empty")]
    MissingFields,
    #[error("malformed email address")]
    BadEmail,
    #[error("request body is not valid JSON")]
    InvalidJson,
    #[error("malformed request payload")]
    BadRequest,
    #[error("bot verification rejected the request")]
    TurnstileFailed,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email address already registered")]
    EmailInUse,
    #[error("user insert returned no row id")]
    InsertFailed,
    #[error("server misconfigured: {0} not set")]
    ServerMisconfigured(&'static str),
    #[error("email provider API key not set")]
    MissingEmailApiKey,
    #[error("email provider rejected the message")]
    EmailProvider { detail: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match self {
            AppError::MissingFields => (StatusCode::BAD_REQUEST, "missing_fields".into(), None),
            AppError::BadEmail => (StatusCode::BAD_REQUEST, "bad_email".into(), None),
            AppError::InvalidJson => (StatusCode::BAD_REQUEST, "invalid_json".into(), None),
            AppError::BadRequest => (StatusCode::BAD_REQUEST, "bad_request".into(), None),
            AppError::TurnstileFailed => {
                (StatusCode::BAD_REQUEST, "turnstile_failed".into(), None)
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "invalid_creds".into(), None)
            }
            AppError::EmailInUse => (StatusCode::CONFLICT, "email_in_use".into(), None),
            AppError::InsertFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, "insert_failed".into(), None)
            }
            AppError::ServerMisconfigured(what) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("server_misconfig:{}", what),
                None,
            ),
            AppError::MissingEmailApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "missing_resend_api_key".into(),
                None,
            ),
            AppError::EmailProvider { detail } => {
                (StatusCode::BAD_GATEWAY, "resend_failed".into(), Some(detail))
            }
            AppError::Internal(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".into(),
                    None,
                )
            }
        };

        let body = Json(ErrorBody {
            error: code,
            detail,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::EmailInUse,
            _ => AppError::Internal(err.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let codes: Vec<&str> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter().map(|e| e.code.as_ref()))
            .collect();
        if codes.contains(&"missing_fields") {
            return AppError::MissingFields;
        }
        if codes.contains(&"bad_email") {
            return AppError::BadEmail;
        }
        AppError::BadRequest
    }
}
