//! Contact-form relay: validate, gate on Turnstile, render the thank-you
//! notification, and hand it to the email provider.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    handlers::client_ip,
    models::user::ContactRequest,
    services::mailer::ContactSubmission,
    state::AppState,
};

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Json(payload) = payload.map_err(|_| AppError::InvalidJson)?;
    payload.validate()?;

    let ip = client_ip(&headers);
    if !state
        .turnstile
        .verify(&payload.turnstile_token, ip.as_deref())
        .await
    {
        return Err(AppError::TurnstileFailed);
    }

    let submission = ContactSubmission {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        service: payload.service,
        message: payload.message.filter(|message| !message.is_empty()),
        submitted_at: Utc::now(),
    };

    state.mailer.send_thank_you(&submission).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
